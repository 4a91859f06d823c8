//! Back-office order management: fulfilment status, cancellation, refunds, listing.

use super::engine::StoreEngine;
use super::page::{Page, paginate};
use crate::domain::order::{Order, OrderNumber, OrderStatus, PaymentStatus};
use crate::domain::ports::Notification;
use crate::error::Result;
use chrono::Utc;
use serde::Deserialize;
use std::cmp::Reverse;

/// An admin's change to an order's fulfilment state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub shipping_carrier: Option<String>,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

impl StatusUpdate {
    pub fn to(status: OrderStatus) -> Self {
        Self {
            status,
            tracking_number: None,
            shipping_carrier: None,
            admin_notes: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl StoreEngine {
    /// Applies a fulfilment update.
    ///
    /// `cancelled` is routed through [`StoreEngine::cancel_order`]; only `shipped` and
    /// `delivered` are accepted otherwise. A shipment notifies the customer.
    pub async fn update_status(&self, number: &OrderNumber, update: StatusUpdate) -> Result<Order> {
        if update.status == OrderStatus::Cancelled {
            return self.cancel_order(number).await;
        }

        let mut order = self.get_order(number).await?;
        let from = order.status();
        order.advance(update.status, Utc::now())?;
        if let Some(tracking) = non_blank(update.tracking_number) {
            order.tracking_number = Some(tracking);
        }
        if let Some(carrier) = non_blank(update.shipping_carrier) {
            order.shipping_carrier = Some(carrier);
        }
        if let Some(notes) = non_blank(update.admin_notes) {
            order.admin_notes = Some(notes);
        }
        let order = self.orders.update(order).await?;

        tracing::info!(order = %number, %from, to = %order.status(), "order status updated");
        if order.status() == OrderStatus::Shipped {
            self.notify(Notification::OrderShipped {
                order: number.clone(),
                email: order.customer.email.clone(),
                tracking_number: order.tracking_number.clone(),
            })
            .await;
        }
        Ok(order)
    }

    /// Cancels a pending or processing order, returning reserved stock to the catalog.
    pub async fn cancel_order(&self, number: &OrderNumber) -> Result<Order> {
        let mut order = self.get_order(number).await?;
        let reserved = order.cancel(Utc::now())?;
        let order = self.orders.update(order).await?;
        if reserved {
            self.catalog.release_stock(&order.stock_lines()).await?;
        }
        tracing::info!(order = %number, restocked = reserved, "order cancelled");
        Ok(order)
    }

    /// Records a refund of a paid order. Stock is released only when the goods never
    /// shipped.
    pub async fn refund_order(&self, number: &OrderNumber) -> Result<Order> {
        let mut order = self.get_order(number).await?;
        let reserved = order.refund(Utc::now())?;
        let order = self.orders.update(order).await?;
        if reserved {
            self.catalog.release_stock(&order.stock_lines()).await?;
        }
        tracing::info!(order = %number, restocked = reserved, "order refunded");
        Ok(order)
    }

    /// Orders matching the filters, newest first.
    pub async fn list_orders(&self, query: &OrderQuery) -> Result<Page<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .get_all()
            .await?
            .into_iter()
            .filter(|order| query.status.is_none_or(|status| order.status() == status))
            .filter(|order| {
                query
                    .payment_status
                    .is_none_or(|status| order.payment_status() == status)
            })
            .collect();
        orders.sort_by_key(|order| (Reverse(order.created_at()), order.number().clone()));
        Ok(paginate(
            orders,
            query.page.unwrap_or(1),
            self.config.page_size(query.limit),
        ))
    }

    /// Every order, oldest first, unpaginated. Used for end-of-run reports.
    pub async fn export_orders(&self) -> Result<Vec<Order>> {
        let mut orders = self.orders.get_all().await?;
        orders.sort_by_key(|order| (order.created_at(), order.number().clone()));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::checkout::{OrderItemRequest, OrderRequest};
    use crate::application::engine::Backends;
    use crate::config::EngineConfig;
    use crate::domain::customer::Customer;
    use crate::domain::money::Money;
    use crate::domain::order::PaymentMethod;
    use crate::domain::product::{Product, ProductId};
    use crate::error::StoreError;
    use crate::infrastructure::notifications::RecordingNotifier;
    use crate::infrastructure::payments::TestCardProcessor;
    use rust_decimal_macros::dec;

    fn engine(notifier: RecordingNotifier) -> StoreEngine {
        StoreEngine::new(
            Backends::in_memory(),
            Box::new(TestCardProcessor::new()),
            Box::new(notifier),
            EngineConfig::default(),
        )
    }

    async fn seed(engine: &StoreEngine, stock: u32) {
        let mut product = Product::new(
            ProductId::new("a").unwrap(),
            "Harbor at dusk",
            Money::from_decimal(dec!(45)).unwrap(),
            Utc::now(),
        );
        product.stock = stock;
        engine.save_product(product).await.unwrap();
    }

    async fn stock(engine: &StoreEngine) -> u32 {
        engine.stock_levels().await.unwrap()[0].stock
    }

    async fn place(engine: &StoreEngine, quantity: u32) -> Order {
        engine
            .place_order(OrderRequest {
                customer: Customer {
                    name: "Ana".to_string(),
                    email: "ana@example.com".to_string(),
                    phone: None,
                    address: None,
                },
                items: vec![OrderItemRequest {
                    product_id: ProductId::new("a").unwrap(),
                    quantity,
                }],
                shipping_cost: None,
                tax: None,
                currency: None,
                payment_method: PaymentMethod::Stripe,
                notes: None,
            })
            .await
            .unwrap()
    }

    async fn paid(engine: &StoreEngine, quantity: u32) -> Order {
        let order = place(engine, quantity).await;
        engine
            .confirm_payment(order.number(), "pm_card_visa")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ship_and_deliver() {
        let notifier = RecordingNotifier::new();
        let engine = engine(notifier.clone());
        seed(&engine, 2).await;
        let order = paid(&engine, 1).await;

        let update = StatusUpdate {
            tracking_number: Some(" 1Z999 ".to_string()),
            shipping_carrier: Some("UPS".to_string()),
            ..StatusUpdate::to(OrderStatus::Shipped)
        };
        let shipped = engine.update_status(order.number(), update).await.unwrap();
        assert_eq!(shipped.status(), OrderStatus::Shipped);
        assert_eq!(shipped.tracking_number.as_deref(), Some("1Z999"));
        assert!(shipped.shipped_at().is_some());

        let delivered = engine
            .update_status(order.number(), StatusUpdate::to(OrderStatus::Delivered))
            .await
            .unwrap();
        assert_eq!(delivered.status(), OrderStatus::Delivered);

        let sent = notifier.sent().await;
        assert!(matches!(
            sent.last(),
            Some(Notification::OrderShipped { tracking_number: Some(t), .. }) if t == "1Z999"
        ));
    }

    #[tokio::test]
    async fn test_update_status_rejects_skips() {
        let engine = engine(RecordingNotifier::new());
        seed(&engine, 2).await;
        let order = place(&engine, 1).await;

        for status in [
            OrderStatus::Shipped,
            OrderStatus::Processing,
            OrderStatus::Refunded,
            OrderStatus::Pending,
        ] {
            let result = engine
                .update_status(order.number(), StatusUpdate::to(status))
                .await;
            assert!(matches!(result, Err(StoreError::InvalidStatusTransition { .. })));
        }
    }

    #[tokio::test]
    async fn test_cancel_pending_leaves_stock_alone() {
        let engine = engine(RecordingNotifier::new());
        seed(&engine, 2).await;
        let order = place(&engine, 2).await;

        let cancelled = engine
            .update_status(order.number(), StatusUpdate::to(OrderStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);
        assert_eq!(stock(&engine).await, 2);

        // A cancelled order cannot be paid
        let result = engine.confirm_payment(order.number(), "pm_card_visa").await;
        assert!(matches!(result, Err(StoreError::InvalidStatusTransition { .. })));
    }

    #[tokio::test]
    async fn test_cancel_processing_releases_stock() {
        let engine = engine(RecordingNotifier::new());
        seed(&engine, 2).await;
        let order = paid(&engine, 2).await;
        assert_eq!(stock(&engine).await, 0);

        engine.cancel_order(order.number()).await.unwrap();
        assert_eq!(stock(&engine).await, 2);

        // Cancelling twice does not restock twice
        assert!(engine.cancel_order(order.number()).await.is_err());
        assert_eq!(stock(&engine).await, 2);
    }

    #[tokio::test]
    async fn test_refund() {
        let engine = engine(RecordingNotifier::new());
        seed(&engine, 3).await;

        let unpaid = place(&engine, 1).await;
        assert!(engine.refund_order(unpaid.number()).await.is_err());

        let processing = paid(&engine, 1).await;
        let refunded = engine.refund_order(processing.number()).await.unwrap();
        assert_eq!(refunded.payment_status(), PaymentStatus::Refunded);
        assert_eq!(refunded.status(), OrderStatus::Refunded);
        assert_eq!(stock(&engine).await, 3);

        let shipped = paid(&engine, 1).await;
        engine
            .update_status(shipped.number(), StatusUpdate::to(OrderStatus::Shipped))
            .await
            .unwrap();
        engine.refund_order(shipped.number()).await.unwrap();
        assert_eq!(stock(&engine).await, 2);
    }

    #[tokio::test]
    async fn test_list_orders_filters() {
        let engine = engine(RecordingNotifier::new());
        seed(&engine, 5).await;
        place(&engine, 1).await;
        paid(&engine, 1).await;
        paid(&engine, 1).await;

        let all = engine.list_orders(&OrderQuery::default()).await.unwrap();
        assert_eq!(all.total, 3);
        assert!(
            all.items
                .windows(2)
                .all(|pair| pair[0].created_at() >= pair[1].created_at())
        );

        let query = OrderQuery {
            payment_status: Some(PaymentStatus::Paid),
            ..OrderQuery::default()
        };
        assert_eq!(engine.list_orders(&query).await.unwrap().total, 2);

        let query = OrderQuery {
            status: Some(OrderStatus::Pending),
            limit: Some(1),
            ..OrderQuery::default()
        };
        let page = engine.list_orders(&query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
    }
}
