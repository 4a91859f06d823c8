//! Payment confirmation.
//!
//! Sequence: claim the order (`authorizing`), reserve stock for every line in one atomic
//! batch, charge the processor, then settle. A failed charge releases the reservation,
//! so stock is either fully taken for a paid order or not taken at all.

use super::engine::StoreEngine;
use crate::domain::order::{Order, OrderNumber, PaymentStatus};
use crate::domain::ports::{ChargeOutcome, ChargeRequest, Notification};
use crate::error::{Result, StoreError};
use chrono::Utc;

impl StoreEngine {
    /// Confirms payment for a pending order.
    ///
    /// Re-confirming a paid order, or confirming one whose confirmation is already in
    /// flight, fails with `InvalidStatusTransition` and never touches stock.
    pub async fn confirm_payment(&self, number: &OrderNumber, payment_method: &str) -> Result<Order> {
        let payment_method = payment_method.trim();
        if payment_method.is_empty() {
            return Err(StoreError::validation("Payment method is required"));
        }

        let mut order = self.get_order(number).await?;
        let previous = order.begin_authorization(Utc::now())?;
        let mut order = self.orders.update(order).await.map_err(|e| match e {
            StoreError::ConcurrentUpdate(_) => StoreError::InvalidStatusTransition {
                order: number.clone(),
                from: format!("payment {previous}"),
                to: format!("payment {}", PaymentStatus::Authorizing),
            },
            other => other,
        })?;

        let stock_lines = order.stock_lines();
        if let Err(e) = self.catalog.reserve_stock(&stock_lines).await {
            tracing::warn!(order = %number, error = %e, "stock reservation failed");
            order.abort_authorization(previous, Utc::now())?;
            self.orders.update(order).await?;
            return Err(e);
        }

        let request = ChargeRequest {
            order: number.clone(),
            amount: order.total(),
            currency: order.currency(),
            payment_method: payment_method.to_string(),
            customer_email: order.customer.email.clone(),
        };
        let timeout = self.config.payment_timeout;
        let outcome = tokio::time::timeout(timeout, self.payments.charge(request)).await;

        match outcome {
            Ok(Ok(ChargeOutcome::Succeeded { reference })) => {
                order.mark_paid(reference.clone(), Utc::now())?;
                let order = self.orders.update(order).await?;
                tracing::info!(
                    order = %number,
                    total = %order.total(),
                    reference = %reference,
                    "payment confirmed"
                );
                self.notify(Notification::PaymentConfirmed {
                    order: number.clone(),
                    email: order.customer.email.clone(),
                    reference,
                })
                .await;
                Ok(order)
            }
            Ok(Ok(ChargeOutcome::Declined { reference, reason })) => {
                tracing::warn!(order = %number, %reason, "payment declined");
                self.settle_failed_payment(order, reference).await?;
                Err(StoreError::PaymentDeclined {
                    order: number.clone(),
                    reason,
                })
            }
            Ok(Err(e)) => {
                tracing::error!(order = %number, error = %e, "payment processor error");
                self.settle_failed_payment(order, None).await?;
                Err(StoreError::PaymentUnavailable(e.to_string()))
            }
            Err(_) => {
                tracing::error!(order = %number, ?timeout, "payment processor timed out");
                self.settle_failed_payment(order, None).await?;
                Err(StoreError::PaymentUnavailable(format!(
                    "no answer within {} ms",
                    timeout.as_millis()
                )))
            }
        }
    }

    /// Releases the reservation and records the failure so the order can be retried.
    async fn settle_failed_payment(&self, mut order: Order, reference: Option<String>) -> Result<Order> {
        self.catalog.release_stock(&order.stock_lines()).await?;
        order.mark_payment_failed(reference, Utc::now())?;
        self.orders.update(order).await
    }
}
