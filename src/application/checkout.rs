//! Order assembly: turns a cart into a priced, immutable order snapshot.

use super::catalog::Lookup;
use crate::domain::customer::Customer;
use crate::domain::money::{Currency, Money};
use crate::domain::order::{Charges, LineItem, Order, PaymentMethod};
use crate::domain::product::{ProductId, StockLine};
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A submitted cart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderRequest {
    pub customer: Customer,
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub shipping_cost: Option<Money>,
    #[serde(default)]
    pub tax: Option<Money>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderRequest {
    /// Checks everything that needs no catalog access and returns the normalized
    /// customer.
    pub fn validate(&self) -> Result<Customer> {
        let customer = self.customer.clone().normalized()?;
        if self.items.is_empty() {
            return Err(StoreError::validation("Order must contain at least one item"));
        }
        for item in &self.items {
            if item.product_id.as_str().trim().is_empty() {
                return Err(StoreError::validation("Product id must not be empty"));
            }
            if item.quantity == 0 {
                return Err(StoreError::validation(format!(
                    "Quantity for {} must be at least 1",
                    item.product_id
                )));
            }
        }
        Ok(customer)
    }

    pub fn stock_lines(&self) -> Vec<StockLine> {
        self.items
            .iter()
            .map(|item| StockLine {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            })
            .collect()
    }
}

/// Prices every looked-up line at `now` and builds the pending order.
///
/// The first missing, unavailable or under-stocked product aborts the whole assembly.
pub fn assemble(
    request: OrderRequest,
    customer: Customer,
    lookups: Vec<Lookup>,
    now: DateTime<Utc>,
) -> Result<Order> {
    let mut currency = request.currency;
    let mut lines = Vec::with_capacity(lookups.len());

    for lookup in lookups {
        let (product, quantity) = match lookup {
            Lookup::Found { product, quantity } => (product, quantity),
            Lookup::NotFound(id) => return Err(StoreError::ProductNotFound(id)),
            Lookup::Inactive(id) => return Err(StoreError::ProductInactive(id)),
        };

        if product.stock < quantity {
            return Err(StoreError::InsufficientStock {
                product: product.id,
                requested: quantity,
                available: product.stock,
            });
        }

        match currency {
            Some(expected) if expected != product.currency => {
                return Err(StoreError::validation(format!(
                    "{} is priced in {}, order is in {}",
                    product.id, product.currency, expected
                )));
            }
            Some(_) => {}
            None => currency = Some(product.currency),
        }

        lines.push(LineItem {
            unit_price: product.effective_price(now),
            product_id: product.id,
            title: product.title,
            image: product.main_image,
            quantity,
        });
    }

    let charges = Charges {
        shipping_cost: request.shipping_cost.unwrap_or(Money::ZERO),
        tax: request.tax.unwrap_or(Money::ZERO),
        currency: currency.unwrap_or_default(),
    };

    let mut order = Order::new(customer, lines, charges, now)?;
    order.payment_method = request.payment_method;
    order.notes = request
        .notes
        .map(|notes| notes.trim().to_string())
        .filter(|notes| !notes.is_empty());
    Ok(order)
}
