use super::contact::ContactMessage;
use super::money::{Currency, Money};
use super::order::{Order, OrderNumber};
use super::product::{Product, ProductId, StockLine};
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Product records.
///
/// Stock changes for an order go through [`CatalogStore::reserve_stock`] and
/// [`CatalogStore::release_stock`], which must apply every line or none.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Inserts a new product or replaces an existing one whose stored version still
    /// equals `product.version`. Returns the stored copy with the version bumped. A stale
    /// version yields `ConcurrentUpdate`.
    async fn store(&self, product: Product) -> Result<Product>;
    async fn get(&self, id: &ProductId) -> Result<Option<Product>>;
    async fn get_all(&self) -> Result<Vec<Product>>;

    /// Atomically decrements stock for every line, provided each product exists and has
    /// at least the requested quantity. On any shortfall nothing is changed and
    /// `InsufficientStock` (or `ProductNotFound`) is returned.
    async fn reserve_stock(&self, lines: &[StockLine]) -> Result<()>;

    /// Atomically increments stock for every line. Used to compensate a reservation.
    async fn release_stock(&self, lines: &[StockLine]) -> Result<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Stores a new order. Fails if the number is already taken.
    async fn insert(&self, order: Order) -> Result<()>;
    async fn get(&self, number: &OrderNumber) -> Result<Option<Order>>;
    async fn get_all(&self) -> Result<Vec<Order>>;

    /// Replaces the stored order if its version still equals `order.version`, returning
    /// the stored copy with the version bumped. A stale version yields `ConcurrentUpdate`.
    async fn update(&self, order: Order) -> Result<Order>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn store(&self, message: ContactMessage) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<ContactMessage>>;
    async fn get_all(&self) -> Result<Vec<ContactMessage>>;
    /// Returns whether a message was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub order: OrderNumber,
    pub amount: Money,
    pub currency: Currency,
    pub payment_method: String,
    pub customer_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    Succeeded { reference: String },
    Declined {
        reference: Option<String>,
        reason: String,
    },
}

/// External payment gateway. Idempotency is the caller's concern.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    OrderPlaced {
        order: OrderNumber,
        email: String,
        total: Money,
        currency: Currency,
    },
    PaymentConfirmed {
        order: OrderNumber,
        email: String,
        reference: String,
    },
    OrderShipped {
        order: OrderNumber,
        email: String,
        tracking_number: Option<String>,
    },
    ContactReceived {
        id: Uuid,
        email: String,
        subject: String,
    },
}

/// Fire-and-forget side channel (email, webhooks). Failures never undo the event.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<()>;
}

pub type CatalogStoreBox = Box<dyn CatalogStore>;
pub type OrderStoreBox = Box<dyn OrderStore>;
pub type ContactStoreBox = Box<dyn ContactStore>;
pub type PaymentProcessorBox = Box<dyn PaymentProcessor>;
pub type NotifierBox = Box<dyn Notifier>;
