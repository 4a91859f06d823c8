use super::customer::Customer;
use super::money::{Currency, Money};
use super::product::{ProductId, StockLine};
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Human-readable order identifier, e.g. `ORD-20261018-3F9A2C1B`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect();
        Self(format!(
            "ORD-{}-{}",
            now.format("%Y%m%d"),
            suffix.to_uppercase()
        ))
    }

    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(StoreError::validation("Order number must not be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Forward moves of the fulfilment lifecycle. `Refunded` is reached only through
    /// [`Order::refund`].
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    /// A confirmation currently holds the order; no other may start.
    Authorizing,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Authorizing => "authorizing",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    Stripe,
    Paypal,
    BankTransfer,
    Other,
}

/// A frozen copy of a product at the moment the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub title: String,
    pub image: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl LineItem {
    pub fn line_total(&self) -> Result<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Monetary parts of a new order besides its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Charges {
    pub shipping_cost: Money,
    pub tax: Money,
    pub currency: Currency,
}

/// A customer order.
///
/// Lines and amounts are private: they are fixed when the order is built and only
/// readable afterwards. Status fields change through the transition methods, which
/// enforce the lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    number: OrderNumber,
    pub customer: Customer,
    lines: Vec<LineItem>,
    subtotal: Money,
    shipping_cost: Money,
    tax: Money,
    total: Money,
    currency: Currency,
    status: OrderStatus,
    payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    payment_reference: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_carrier: Option<String>,
    pub notes: Option<String>,
    pub admin_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    /// Bumped by the store on every successful update.
    pub version: u64,
}

impl Order {
    /// Builds a pending order, computing subtotal and total from the lines.
    pub fn new(
        customer: Customer,
        lines: Vec<LineItem>,
        charges: Charges,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if lines.is_empty() {
            return Err(StoreError::validation("Order must contain at least one item"));
        }
        if let Some(line) = lines.iter().find(|line| line.quantity == 0) {
            return Err(StoreError::validation(format!(
                "Quantity for {} must be at least 1",
                line.product_id
            )));
        }

        let subtotal = Money::sum(
            lines
                .iter()
                .map(LineItem::line_total)
                .collect::<Result<Vec<_>>>()?,
        )?;
        let total = subtotal
            .checked_add(charges.shipping_cost)?
            .checked_add(charges.tax)?;

        Ok(Self {
            number: OrderNumber::generate(now),
            customer,
            lines,
            subtotal,
            shipping_cost: charges.shipping_cost,
            tax: charges.tax,
            total,
            currency: charges.currency,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::default(),
            payment_reference: None,
            tracking_number: None,
            shipping_carrier: None,
            notes: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
            shipped_at: None,
            delivered_at: None,
            version: 0,
        })
    }

    pub fn number(&self) -> &OrderNumber {
        &self.number
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn shipping_cost(&self) -> Money {
        self.shipping_cost
    }

    pub fn tax(&self) -> Money {
        self.tax
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// One stock line per product, quantities summed.
    pub fn stock_lines(&self) -> Vec<StockLine> {
        let mut stock_lines: Vec<StockLine> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            match stock_lines
                .iter_mut()
                .find(|stock_line| stock_line.product_id == line.product_id)
            {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
                None => stock_lines.push(StockLine {
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                }),
            }
        }
        stock_lines
    }

    /// Checks `subtotal == Σ lines` and `total == subtotal + shipping + tax`.
    pub fn is_consistent(&self) -> bool {
        let lines = self
            .lines
            .iter()
            .map(LineItem::line_total)
            .collect::<Result<Vec<_>>>()
            .and_then(Money::sum);
        let total = self
            .subtotal
            .checked_add(self.shipping_cost)
            .and_then(|amount| amount.checked_add(self.tax));
        matches!((lines, total), (Ok(lines), Ok(total)) if lines == self.subtotal && total == self.total)
    }

    fn payment_transition_error(&self, to: PaymentStatus) -> StoreError {
        StoreError::InvalidStatusTransition {
            order: self.number.clone(),
            from: format!("payment {}", self.payment_status),
            to: format!("payment {to}"),
        }
    }

    fn status_transition_error(&self, to: OrderStatus) -> StoreError {
        StoreError::InvalidStatusTransition {
            order: self.number.clone(),
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }

    /// Claims the order for a payment attempt. Returns the payment status to restore if
    /// the attempt is abandoned before reaching the processor.
    pub fn begin_authorization(&mut self, now: DateTime<Utc>) -> Result<PaymentStatus> {
        let previous = self.payment_status;
        if self.status != OrderStatus::Pending
            || !matches!(previous, PaymentStatus::Pending | PaymentStatus::Failed)
        {
            return Err(self.payment_transition_error(PaymentStatus::Authorizing));
        }
        self.payment_status = PaymentStatus::Authorizing;
        self.updated_at = now;
        Ok(previous)
    }

    pub fn abort_authorization(&mut self, previous: PaymentStatus, now: DateTime<Utc>) -> Result<()> {
        if self.payment_status != PaymentStatus::Authorizing {
            return Err(self.payment_transition_error(previous));
        }
        self.payment_status = previous;
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_paid(&mut self, reference: String, now: DateTime<Utc>) -> Result<()> {
        if self.payment_status != PaymentStatus::Authorizing {
            return Err(self.payment_transition_error(PaymentStatus::Paid));
        }
        self.payment_status = PaymentStatus::Paid;
        self.status = OrderStatus::Processing;
        self.payment_reference = Some(reference);
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_payment_failed(&mut self, reference: Option<String>, now: DateTime<Utc>) -> Result<()> {
        if self.payment_status != PaymentStatus::Authorizing {
            return Err(self.payment_transition_error(PaymentStatus::Failed));
        }
        self.payment_status = PaymentStatus::Failed;
        if reference.is_some() {
            self.payment_reference = reference;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Moves the fulfilment status forward by one step (`shipped`, `delivered`).
    ///
    /// `processing` belongs to payment confirmation and `refunded` to [`Order::refund`],
    /// cancellation to [`Order::cancel`].
    pub fn advance(&mut self, next: OrderStatus, now: DateTime<Utc>) -> Result<()> {
        if !matches!(next, OrderStatus::Shipped | OrderStatus::Delivered)
            || !self.status.can_transition_to(next)
        {
            return Err(self.status_transition_error(next));
        }
        self.status = next;
        match next {
            OrderStatus::Shipped => self.shipped_at = Some(now),
            OrderStatus::Delivered => self.delivered_at = Some(now),
            _ => {}
        }
        self.updated_at = now;
        Ok(())
    }

    /// Cancels the order. Returns `true` when stock had been reserved for it and must be
    /// released.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<bool> {
        if self.payment_status == PaymentStatus::Authorizing
            || !self.status.can_transition_to(OrderStatus::Cancelled)
        {
            return Err(self.status_transition_error(OrderStatus::Cancelled));
        }
        let reserved = self.status == OrderStatus::Processing;
        self.status = OrderStatus::Cancelled;
        self.updated_at = now;
        Ok(reserved)
    }

    /// Refunds a paid order from any status. Returns `true` when the goods never left
    /// (status was `processing`) and the reserved stock must be released.
    pub fn refund(&mut self, now: DateTime<Utc>) -> Result<bool> {
        if self.payment_status != PaymentStatus::Paid {
            return Err(self.payment_transition_error(PaymentStatus::Refunded));
        }
        let reserved = self.status == OrderStatus::Processing;
        self.payment_status = PaymentStatus::Refunded;
        self.status = OrderStatus::Refunded;
        self.updated_at = now;
        Ok(reserved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(value: rust_decimal::Decimal) -> Money {
        Money::from_decimal(value).unwrap()
    }

    fn line(id: &str, price: rust_decimal::Decimal, quantity: u32) -> LineItem {
        LineItem {
            product_id: ProductId::new(id).unwrap(),
            title: format!("Piece {id}"),
            image: format!("/uploads/{id}.webp"),
            unit_price: money(price),
            quantity,
        }
    }

    fn customer() -> Customer {
        Customer {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            address: None,
        }
    }

    fn pending_order() -> Order {
        Order::new(
            customer(),
            vec![line("a", dec!(45.00), 2), line("b", dec!(10.00), 1)],
            Charges {
                shipping_cost: money(dec!(10.00)),
                ..Charges::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_order_totals() {
        let order = pending_order();
        assert_eq!(order.subtotal().to_decimal(), dec!(100.00));
        assert_eq!(order.total().to_decimal(), dec!(110.00));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
        assert!(order.is_consistent());
        assert!(order.number().as_str().starts_with("ORD-"));
    }

    #[test]
    fn test_order_requires_lines() {
        let result = Order::new(customer(), vec![], Charges::default(), Utc::now());
        assert!(matches!(result, Err(StoreError::ValidationError(_))));

        let result = Order::new(
            customer(),
            vec![line("a", dec!(1.00), 0)],
            Charges::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(StoreError::ValidationError(_))));
    }

    #[test]
    fn test_order_numbers_are_distinct() {
        let now = Utc::now();
        let first = OrderNumber::generate(now);
        let second = OrderNumber::generate(now);
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), "ORD-20260101-ABCDEF12".len());
    }

    #[test]
    fn test_stock_lines_merge_duplicates() {
        let order = Order::new(
            customer(),
            vec![line("a", dec!(5.00), 1), line("b", dec!(5.00), 2), line("a", dec!(5.00), 3)],
            Charges::default(),
            Utc::now(),
        )
        .unwrap();

        let stock_lines = order.stock_lines();
        assert_eq!(stock_lines.len(), 2);
        assert_eq!(stock_lines[0].product_id.as_str(), "a");
        assert_eq!(stock_lines[0].quantity, 4);
        assert_eq!(stock_lines[1].quantity, 2);
    }

    #[test]
    fn test_payment_lifecycle() {
        let now = Utc::now();
        let mut order = pending_order();

        let previous = order.begin_authorization(now).unwrap();
        assert_eq!(previous, PaymentStatus::Pending);
        assert_eq!(order.payment_status(), PaymentStatus::Authorizing);

        // A second claim while one is in flight is rejected
        assert!(matches!(
            order.begin_authorization(now),
            Err(StoreError::InvalidStatusTransition { .. })
        ));

        order.mark_paid("pi_123".to_string(), now).unwrap();
        assert_eq!(order.payment_status(), PaymentStatus::Paid);
        assert_eq!(order.status(), OrderStatus::Processing);
        assert_eq!(order.payment_reference(), Some("pi_123"));

        // Re-confirming a paid order is an invalid transition
        assert!(order.begin_authorization(now).is_err());
    }

    #[test]
    fn test_failed_payment_can_retry() {
        let now = Utc::now();
        let mut order = pending_order();
        order.begin_authorization(now).unwrap();
        order.mark_payment_failed(Some("pi_declined".to_string()), now).unwrap();
        assert_eq!(order.payment_status(), PaymentStatus::Failed);
        assert_eq!(order.status(), OrderStatus::Pending);

        let previous = order.begin_authorization(now).unwrap();
        assert_eq!(previous, PaymentStatus::Failed);
        order.abort_authorization(previous, now).unwrap();
        assert_eq!(order.payment_status(), PaymentStatus::Failed);
    }

    #[test]
    fn test_no_status_skips() {
        let now = Utc::now();
        let mut order = pending_order();
        assert!(order.advance(OrderStatus::Shipped, now).is_err());
        assert!(order.advance(OrderStatus::Processing, now).is_err());
        assert!(order.advance(OrderStatus::Refunded, now).is_err());

        order.begin_authorization(now).unwrap();
        order.mark_paid("pi_1".to_string(), now).unwrap();
        assert!(order.advance(OrderStatus::Delivered, now).is_err());

        order.advance(OrderStatus::Shipped, now).unwrap();
        assert_eq!(order.shipped_at(), Some(now));
        order.advance(OrderStatus::Delivered, now).unwrap();
        assert_eq!(order.delivered_at(), Some(now));
        assert!(order.cancel(now).is_err());
    }

    #[test]
    fn test_cancel_reports_reservation() {
        let now = Utc::now();
        let mut pending = pending_order();
        assert!(!pending.cancel(now).unwrap());
        assert_eq!(pending.status(), OrderStatus::Cancelled);

        let mut processing = pending_order();
        processing.begin_authorization(now).unwrap();
        processing.mark_paid("pi_2".to_string(), now).unwrap();
        assert!(processing.cancel(now).unwrap());

        let mut authorizing = pending_order();
        authorizing.begin_authorization(now).unwrap();
        assert!(authorizing.cancel(now).is_err());
    }

    #[test]
    fn test_refund_requires_paid() {
        let now = Utc::now();
        let mut order = pending_order();
        assert!(order.refund(now).is_err());

        order.begin_authorization(now).unwrap();
        order.mark_paid("pi_3".to_string(), now).unwrap();
        order.advance(OrderStatus::Shipped, now).unwrap();
        assert!(!order.refund(now).unwrap());
        assert_eq!(order.payment_status(), PaymentStatus::Refunded);
        assert_eq!(order.status(), OrderStatus::Refunded);
        assert!(order.refund(now).is_err());
    }
}
