use super::catalog::{self, CatalogQuery};
use super::checkout::{self, OrderRequest};
use super::page::Page;
use crate::config::EngineConfig;
use crate::domain::order::{Order, OrderNumber};
use crate::domain::ports::{
    CatalogStoreBox, ContactStoreBox, Notification, NotifierBox, OrderStoreBox,
    PaymentProcessorBox,
};
use crate::domain::product::{Category, Product, ProductId};
use crate::error::{Result, StoreError};
use crate::infrastructure::in_memory::{
    InMemoryCatalogStore, InMemoryContactStore, InMemoryOrderStore,
};
use chrono::Utc;

/// The persistence backends the engine works against.
pub struct Backends {
    pub catalog: CatalogStoreBox,
    pub orders: OrderStoreBox,
    pub contacts: ContactStoreBox,
}

impl Backends {
    pub fn in_memory() -> Self {
        Self {
            catalog: Box::new(InMemoryCatalogStore::new()),
            orders: Box::new(InMemoryOrderStore::new()),
            contacts: Box::new(InMemoryContactStore::new()),
        }
    }
}

/// The main entry point of the store.
///
/// `StoreEngine` owns the storage backends and the external collaborators (payment
/// processor, notifier). Every operation is an independent request; consistency between
/// concurrent requests comes from the stores' atomic reservations and version-checked
/// order updates, not from state held here.
pub struct StoreEngine {
    pub(super) catalog: CatalogStoreBox,
    pub(super) orders: OrderStoreBox,
    pub(super) contacts: ContactStoreBox,
    pub(super) payments: PaymentProcessorBox,
    pub(super) notifier: NotifierBox,
    pub(super) config: EngineConfig,
}

impl StoreEngine {
    /// Creates a new `StoreEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `backends` - Catalog, order and contact stores.
    /// * `payments` - The external payment processor.
    /// * `notifier` - Receives fire-and-forget notifications.
    /// * `config` - Timeouts and listing limits.
    pub fn new(
        backends: Backends,
        payments: PaymentProcessorBox,
        notifier: NotifierBox,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog: backends.catalog,
            orders: backends.orders,
            contacts: backends.contacts,
            payments,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Sends a notification, logging instead of failing when delivery breaks.
    pub(super) async fn notify(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(notification).await {
            tracing::warn!(error = %e, "notification delivery failed");
        }
    }

    /// Adds or replaces a catalog entry.
    ///
    /// A replacement must carry the version of the copy it was edited from. If stock was
    /// reserved or released since that copy was read, the save fails with
    /// `ConcurrentUpdate` and the admin has to re-read the product.
    pub async fn save_product(&self, mut product: Product) -> Result<Product> {
        product.validate()?;
        let now = Utc::now();
        product.updated_at = now;
        product.refresh_sold(now);
        let saved = self.catalog.store(product).await?;
        tracing::debug!(
            product = %saved.id,
            stock = saved.stock,
            version = saved.version,
            "product saved"
        );
        Ok(saved)
    }

    /// Loads an entry from a catalog file, which is authoritative for every field it
    /// lists, stock included.
    pub async fn import_product(&self, mut product: Product) -> Result<Product> {
        if let Some(stored) = self.catalog.get(&product.id).await? {
            product.version = stored.version;
        }
        self.save_product(product).await
    }

    /// Fetches a product for its detail page.
    pub async fn get_product(&self, id: &ProductId) -> Result<Product> {
        match self.catalog.get(id).await? {
            Some(product) if product.is_active => Ok(product),
            Some(_) => Err(StoreError::ProductInactive(id.clone())),
            None => Err(StoreError::ProductNotFound(id.clone())),
        }
    }

    /// Lists orderable products.
    pub async fn list_catalog(&self, query: &CatalogQuery) -> Result<Page<Product>> {
        let products = self.catalog.get_all().await?;
        Ok(catalog::list(
            products,
            query,
            self.config.page_size(query.limit),
        ))
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        let products = self.catalog.get_all().await?;
        Ok(catalog::categories(&products))
    }

    /// Every catalog entry, including inactive and sold ones, ordered by id.
    pub async fn stock_levels(&self) -> Result<Vec<Product>> {
        let mut products = self.catalog.get_all().await?;
        products.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(products)
    }

    /// Turns a cart into a pending order.
    ///
    /// Prices come from the catalog at this moment and are frozen into the order. Stock
    /// is checked but not reserved; reservation happens on payment confirmation. Nothing
    /// is stored unless every line checks out.
    pub async fn place_order(&self, request: OrderRequest) -> Result<Order> {
        let customer = request.validate()?;
        let wanted = catalog::merge_requests(request.stock_lines())?;
        let lookups = catalog::lookup(self.catalog.as_ref(), &wanted).await?;

        let order = checkout::assemble(request, customer, lookups, Utc::now())?;
        self.orders.insert(order.clone()).await?;

        tracing::info!(
            order = %order.number(),
            lines = order.lines().len(),
            total = %order.total(),
            currency = %order.currency(),
            "order placed"
        );
        self.notify(Notification::OrderPlaced {
            order: order.number().clone(),
            email: order.customer.email.clone(),
            total: order.total(),
            currency: order.currency(),
        })
        .await;

        Ok(order)
    }

    pub async fn get_order(&self, number: &OrderNumber) -> Result<Order> {
        self.orders
            .get(number)
            .await?
            .ok_or_else(|| StoreError::OrderNotFound(number.clone()))
    }
}
