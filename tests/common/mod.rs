#![allow(dead_code)]

use artshop::application::checkout::{OrderItemRequest, OrderRequest};
use artshop::application::engine::{Backends, StoreEngine};
use artshop::config::EngineConfig;
use artshop::domain::customer::Customer;
use artshop::domain::money::Money;
use artshop::domain::order::PaymentMethod;
use artshop::domain::ports::{Notification, Notifier};
use artshop::domain::product::{Product, ProductId};
use artshop::error::StoreError;
use artshop::infrastructure::notifications::RecordingNotifier;
use artshop::infrastructure::payments::TestCardProcessor;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn engine() -> StoreEngine {
    StoreEngine::new(
        Backends::in_memory(),
        Box::new(TestCardProcessor::new()),
        Box::new(RecordingNotifier::new()),
        EngineConfig::default(),
    )
}

/// A notifier whose relay is always down.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: Notification) -> artshop::error::Result<()> {
        Err(StoreError::InternalError(Box::new(Error::other(
            "mail relay down",
        ))))
    }
}

pub fn engine_with_notifier(notifier: impl Notifier + 'static) -> StoreEngine {
    StoreEngine::new(
        Backends::in_memory(),
        Box::new(TestCardProcessor::new()),
        Box::new(notifier),
        EngineConfig::default(),
    )
}

pub fn money(value: Decimal) -> Money {
    Money::from_decimal(value).unwrap()
}

pub fn product(id: &str, price: Decimal, stock: u32) -> Product {
    let mut product = Product::new(ProductId::new(id).unwrap(), format!("Piece {id}"), money(price), Utc::now());
    product.stock = stock;
    product
}

pub fn order_request(items: &[(&str, u32)]) -> OrderRequest {
    OrderRequest {
        customer: Customer {
            name: "Ana Ruiz".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            address: None,
        },
        items: items
            .iter()
            .map(|(id, quantity)| OrderItemRequest {
                product_id: ProductId::new(*id).unwrap(),
                quantity: *quantity,
            })
            .collect(),
        shipping_cost: None,
        tax: None,
        currency: None,
        payment_method: PaymentMethod::Stripe,
        notes: None,
    }
}

pub async fn stock_of(engine: &StoreEngine, id: &str) -> u32 {
    engine
        .stock_levels()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.id.as_str() == id)
        .map(|p| p.stock)
        .unwrap()
}

/// Writes a catalog CSV with `rows` products, each with `stock` units at 10.00.
pub fn generate_catalog_csv(path: &Path, rows: usize, stock: u32) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["id", "title", "price", "stock"])?;
    for i in 1..=rows {
        wtr.write_record([
            format!("piece-{i}"),
            format!("Piece {i}"),
            "10.00".to_string(),
            stock.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
