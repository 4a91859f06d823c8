use crate::domain::ports::{Notification, Notifier};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Writes every notification to the log instead of sending mail.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        match notification {
            Notification::OrderPlaced {
                order,
                email,
                total,
                currency,
            } => {
                tracing::info!(%order, %email, %total, %currency, "order confirmation queued");
            }
            Notification::PaymentConfirmed {
                order,
                email,
                reference,
            } => {
                tracing::info!(%order, %email, %reference, "payment receipt queued");
            }
            Notification::OrderShipped {
                order,
                email,
                tracking_number,
            } => {
                tracing::info!(%order, %email, tracking = ?tracking_number, "shipping notice queued");
            }
            Notification::ContactReceived { id, email, subject } => {
                tracing::info!(%id, %email, %subject, "contact notice queued");
            }
        }
        Ok(())
    }
}

/// Keeps notifications in memory so callers can inspect what was sent.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        self.sent.lock().await.push(notification);
        Ok(())
    }
}
