//! Catalog lookup and listing.
//!
//! Lookup is read-only and runs before any price is computed, so an order is always
//! priced from the catalog as it stands when the order is placed.

use super::page::{Page, paginate};
use crate::domain::money::Money;
use crate::domain::ports::CatalogStore;
use crate::domain::product::{Category, Product, ProductId, ProductKind, StockLine};
use crate::error::{Result, StoreError};
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// Result of resolving one requested product.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found { product: Product, quantity: u32 },
    NotFound(ProductId),
    /// Exists but is deactivated or already sold.
    Inactive(ProductId),
}

/// Folds repeated product ids into one request each, keeping first-appearance order.
pub fn merge_requests(requests: impl IntoIterator<Item = StockLine>) -> Result<Vec<StockLine>> {
    let mut merged: Vec<StockLine> = Vec::new();
    for request in requests {
        match merged
            .iter_mut()
            .find(|line| line.product_id == request.product_id)
        {
            Some(line) => {
                line.quantity = line.quantity.checked_add(request.quantity).ok_or_else(|| {
                    StoreError::validation(format!("Quantity overflow for {}", request.product_id))
                })?;
            }
            None => merged.push(request),
        }
    }
    Ok(merged)
}

/// Resolves each requested product against the current catalog.
pub async fn lookup(catalog: &dyn CatalogStore, requests: &[StockLine]) -> Result<Vec<Lookup>> {
    let mut lookups = Vec::with_capacity(requests.len());
    for request in requests {
        let lookup = match catalog.get(&request.product_id).await? {
            None => Lookup::NotFound(request.product_id.clone()),
            Some(product) if !product.is_available() => Lookup::Inactive(product.id),
            Some(product) => Lookup::Found {
                product,
                quantity: request.quantity,
            },
        };
        lookups.push(lookup);
    }
    Ok(lookups)
}

/// Storefront listing filters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub category: Option<Category>,
    pub kind: Option<ProductKind>,
    pub featured_only: bool,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl CatalogQuery {
    fn matches(&self, product: &Product) -> bool {
        product.is_available()
            && self.category.is_none_or(|category| product.category == category)
            && self.kind.is_none_or(|kind| product.kind == kind)
            && (!self.featured_only || product.featured)
            && self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
    }
}

/// Filters and orders the catalog: featured first, then by sort order, newest first.
pub fn list(products: Vec<Product>, query: &CatalogQuery, limit: usize) -> Page<Product> {
    let mut matching: Vec<Product> = products
        .into_iter()
        .filter(|product| query.matches(product))
        .collect();
    matching.sort_by_key(|product| {
        (
            Reverse(product.featured),
            product.sort_order,
            Reverse(product.created_at),
            product.id.clone(),
        )
    });
    paginate(matching, query.page.unwrap_or(1), limit)
}

/// Distinct categories among active products.
pub fn categories(products: &[Product]) -> Vec<Category> {
    products
        .iter()
        .filter(|product| product.is_active)
        .map(|product| product.category)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
