use crate::domain::order::OrderNumber;
use crate::domain::product::ProductId;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),
    #[error("Product is not available: {0}")]
    ProductInactive(ProductId),
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        requested: u32,
        available: u32,
    },
    #[error("Order not found: {0}")]
    OrderNotFound(OrderNumber),
    #[error("Invalid status transition for order {order}: {from} -> {to}")]
    InvalidStatusTransition {
        order: OrderNumber,
        from: String,
        to: String,
    },
    #[error("Payment declined for order {order}: {reason}")]
    PaymentDeclined { order: OrderNumber, reason: String },
    #[error("Payment processor unavailable: {0}")]
    PaymentUnavailable(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Concurrent update rejected for {0}")]
    ConcurrentUpdate(String),
    #[error("Contact message not found: {0}")]
    ContactNotFound(Uuid),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
