use crate::domain::ports::{ChargeOutcome, ChargeRequest, PaymentProcessor};
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

/// Local stand-in for a card gateway, modelled on test-mode card tokens.
///
/// Any payment method containing `declined` is refused; everything else succeeds with a
/// fresh `pi_` reference. An optional latency lets callers exercise timeouts.
#[derive(Debug, Default, Clone)]
pub struct TestCardProcessor {
    latency: Option<Duration>,
}

impl TestCardProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
        }
    }

    fn reference() -> String {
        format!("pi_{}", Uuid::new_v4().simple())
    }
}

#[async_trait]
impl PaymentProcessor for TestCardProcessor {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if request.payment_method.to_lowercase().contains("declined") {
            return Ok(ChargeOutcome::Declined {
                reference: Some(Self::reference()),
                reason: "card_declined".to_string(),
            });
        }

        Ok(ChargeOutcome::Succeeded {
            reference: Self::reference(),
        })
    }
}
