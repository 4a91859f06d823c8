use super::money::{Currency, Money};
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(StoreError::validation("Product id must not be empty"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Original,
    Print,
    Digital,
    Commission,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Physical,
    Digital,
    Service,
}

/// Quantity of one product to reserve or release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A catalog entry.
///
/// `is_unique` marks one-of-a-kind originals: once their stock reaches zero they are
/// flagged as sold and drop out of catalog listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub currency: Currency,
    pub main_image: String,
    pub category: Category,
    pub kind: ProductKind,
    pub stock: u32,
    pub is_unique: bool,
    pub featured: bool,
    pub on_sale: bool,
    pub sale_price: Option<Money>,
    pub sale_end_date: Option<DateTime<Utc>>,
    pub sort_order: i32,
    pub is_active: bool,
    pub sold: bool,
    pub sold_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the store on every write, including stock reservations.
    #[serde(default)]
    pub version: u64,
}

impl Product {
    /// Creates an active, non-unique product with a single unit in stock.
    pub fn new(id: ProductId, title: impl Into<String>, price: Money, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            price,
            currency: Currency::default(),
            main_image: String::new(),
            category: Category::Original,
            kind: ProductKind::Physical,
            stock: 1,
            is_unique: false,
            featured: false,
            on_sale: false,
            sale_price: None,
            sale_end_date: None,
            sort_order: 0,
            is_active: true,
            sold: false,
            sold_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// The price a buyer pays at `now`.
    ///
    /// The sale price applies only while the sale is flagged, priced and its end date is
    /// still in the future.
    pub fn effective_price(&self, now: DateTime<Utc>) -> Money {
        match (self.on_sale, self.sale_price, self.sale_end_date) {
            (true, Some(sale_price), Some(end)) if end > now => sale_price,
            _ => self.price,
        }
    }

    /// Whether the product shows up in catalog listings and can be ordered.
    pub fn is_available(&self) -> bool {
        self.is_active && !self.sold
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(StoreError::validation(format!(
                "Product {} must have a title",
                self.id
            )));
        }
        if self.on_sale {
            match self.sale_price {
                None => {
                    return Err(StoreError::validation(format!(
                        "Product {} is on sale without a sale price",
                        self.id
                    )));
                }
                Some(sale_price) if sale_price > self.price => {
                    return Err(StoreError::validation(format!(
                        "Product {} sale price exceeds its list price",
                        self.id
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Removes `quantity` units from stock, marking unique pieces as sold at zero.
    pub fn take_stock(&mut self, quantity: u32, now: DateTime<Utc>) -> Result<()> {
        if self.stock < quantity {
            return Err(StoreError::InsufficientStock {
                product: self.id.clone(),
                requested: quantity,
                available: self.stock,
            });
        }
        self.stock -= quantity;
        self.updated_at = now;
        self.refresh_sold(now);
        Ok(())
    }

    /// Puts `quantity` units back, clearing the sold mark.
    pub fn restock(&mut self, quantity: u32, now: DateTime<Utc>) {
        self.stock = self.stock.saturating_add(quantity);
        self.updated_at = now;
        self.refresh_sold(now);
    }

    pub fn refresh_sold(&mut self, now: DateTime<Utc>) {
        if self.is_unique && self.stock == 0 {
            if !self.sold {
                self.sold = true;
                self.sold_at = Some(now);
            }
        } else if self.sold && self.stock > 0 {
            self.sold = false;
            self.sold_at = None;
        }
    }
}
