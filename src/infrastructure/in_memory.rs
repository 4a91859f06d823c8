use crate::domain::contact::ContactMessage;
use crate::domain::order::{Order, OrderNumber};
use crate::domain::ports::{CatalogStore, ContactStore, OrderStore};
use crate::domain::product::{Product, ProductId, StockLine};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Applies `apply` to copies of every product named in `lines`.
///
/// Returns the staged copies only if every line succeeded, so callers can write them
/// back in one step.
pub(crate) fn stage_stock_change<F>(
    lines: &[StockLine],
    mut lookup: impl FnMut(&ProductId) -> Result<Option<Product>>,
    mut apply: F,
) -> Result<HashMap<ProductId, Product>>
where
    F: FnMut(&mut Product, u32) -> Result<()>,
{
    let mut staged: HashMap<ProductId, Product> = HashMap::new();
    for line in lines {
        if !staged.contains_key(&line.product_id) {
            let product = lookup(&line.product_id)?
                .ok_or_else(|| StoreError::ProductNotFound(line.product_id.clone()))?;
            staged.insert(line.product_id.clone(), product);
        }
        if let Some(product) = staged.get_mut(&line.product_id) {
            apply(product, line.quantity)?;
        }
    }
    Ok(staged)
}

fn commit_staged(products: &mut HashMap<ProductId, Product>, staged: HashMap<ProductId, Product>) {
    for (id, mut product) in staged {
        product.version += 1;
        products.insert(id, product);
    }
}

/// A thread-safe in-memory catalog.
///
/// A single `RwLock` guards the whole map, so a stock reservation holds the write lock
/// for the full check-and-apply and can never interleave with another one.
#[derive(Default, Clone)]
pub struct InMemoryCatalogStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryCatalogStore {
    /// Creates a new, empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn store(&self, mut product: Product) -> Result<Product> {
        let mut products = self.products.write().await;
        if let Some(stored) = products.get(&product.id)
            && stored.version != product.version
        {
            return Err(StoreError::ConcurrentUpdate(product.id.to_string()));
        }
        product.version += 1;
        products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products.values().cloned().collect())
    }

    async fn reserve_stock(&self, lines: &[StockLine]) -> Result<()> {
        let now = Utc::now();
        let mut products = self.products.write().await;
        let staged = stage_stock_change(
            lines,
            |id| Ok(products.get(id).cloned()),
            |product, quantity| product.take_stock(quantity, now),
        )?;
        commit_staged(&mut products, staged);
        Ok(())
    }

    async fn release_stock(&self, lines: &[StockLine]) -> Result<()> {
        let now = Utc::now();
        let mut products = self.products.write().await;
        let staged = stage_stock_change(
            lines,
            |id| Ok(products.get(id).cloned()),
            |product, quantity| {
                product.restock(quantity, now);
                Ok(())
            },
        )?;
        commit_staged(&mut products, staged);
        Ok(())
    }
}

/// A thread-safe in-memory order book with version-checked updates.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderNumber, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(order.number()) {
            return Err(StoreError::ConcurrentUpdate(order.number().to_string()));
        }
        orders.insert(order.number().clone(), order);
        Ok(())
    }

    async fn get(&self, number: &OrderNumber) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(number).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.values().cloned().collect())
    }

    async fn update(&self, mut order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get(order.number())
            .ok_or_else(|| StoreError::OrderNotFound(order.number().clone()))?;
        if stored.version != order.version {
            return Err(StoreError::ConcurrentUpdate(order.number().to_string()));
        }
        order.version += 1;
        orders.insert(order.number().clone(), order.clone());
        Ok(order)
    }
}

/// A thread-safe in-memory contact inbox.
#[derive(Default, Clone)]
pub struct InMemoryContactStore {
    messages: Arc<RwLock<HashMap<Uuid, ContactMessage>>>,
}

impl InMemoryContactStore {
    /// Creates a new, empty inbox.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn store(&self, message: ContactMessage) -> Result<()> {
        let mut messages = self.messages.write().await;
        messages.insert(message.id, message);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ContactMessage>> {
        let messages = self.messages.read().await;
        Ok(messages.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<ContactMessage>> {
        let messages = self.messages.read().await;
        Ok(messages.values().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut messages = self.messages.write().await;
        Ok(messages.remove(&id).is_some())
    }
}
