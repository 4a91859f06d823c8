use crate::domain::contact::ContactMessage;
use crate::domain::order::{Order, OrderNumber};
use crate::domain::ports::{CatalogStore, ContactStore, OrderStore};
use crate::domain::product::{Product, ProductId, StockLine};
use crate::error::{Result, StoreError};
use crate::infrastructure::in_memory::stage_stock_change;
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for catalog entries, keyed by product id.
pub const CF_PRODUCTS: &str = "products";
/// Column Family for orders, keyed by order number.
pub const CF_ORDERS: &str = "orders";
/// Column Family for contact messages, keyed by UUID bytes.
pub const CF_CONTACTS: &str = "contacts";

/// A persistent store implementation using RocksDB.
///
/// Products, orders and contact messages live in separate Column Families. Stock
/// reservations and version-checked order updates are read-check-write sequences, so
/// they run under a store-wide write lock and commit through a single `WriteBatch`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>` and lock).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_PRODUCTS, CF_ORDERS, CF_CONTACTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            StoreError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_pinned_cf(cf, key)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db.put_cf(cf, key, encode(value)?)?;
        Ok(())
    }

    fn read_all<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(decode(&value)?);
        }
        Ok(values)
    }

    fn commit_products(&self, products: impl IntoIterator<Item = Product>) -> Result<()> {
        let cf = self.cf(CF_PRODUCTS)?;
        let mut batch = WriteBatch::default();
        for mut product in products {
            product.version += 1;
            batch.put_cf(cf, product.id.as_str().as_bytes(), encode(&product)?);
        }
        self.db.write(batch)?;
        Ok(())
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        StoreError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        StoreError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl CatalogStore for RocksDBStore {
    async fn store(&self, mut product: Product) -> Result<Product> {
        let _guard = self.write_lock.lock().await;
        let key = product.id.as_str().as_bytes();
        if let Some(stored) = self.read::<Product>(CF_PRODUCTS, key)?
            && stored.version != product.version
        {
            return Err(StoreError::ConcurrentUpdate(product.id.to_string()));
        }
        product.version += 1;
        self.write(CF_PRODUCTS, key, &product)?;
        Ok(product)
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>> {
        self.read(CF_PRODUCTS, id.as_str().as_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Product>> {
        self.read_all(CF_PRODUCTS)
    }

    async fn reserve_stock(&self, lines: &[StockLine]) -> Result<()> {
        let now = Utc::now();
        let _guard = self.write_lock.lock().await;
        let staged = stage_stock_change(
            lines,
            |id| self.read(CF_PRODUCTS, id.as_str().as_bytes()),
            |product, quantity| product.take_stock(quantity, now),
        )?;
        self.commit_products(staged.into_values())
    }

    async fn release_stock(&self, lines: &[StockLine]) -> Result<()> {
        let now = Utc::now();
        let _guard = self.write_lock.lock().await;
        let staged = stage_stock_change(
            lines,
            |id| self.read(CF_PRODUCTS, id.as_str().as_bytes()),
            |product, quantity| {
                product.restock(quantity, now);
                Ok(())
            },
        )?;
        self.commit_products(staged.into_values())
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let key = order.number().as_str().as_bytes();
        if self.read::<Order>(CF_ORDERS, key)?.is_some() {
            return Err(StoreError::ConcurrentUpdate(order.number().to_string()));
        }
        self.write(CF_ORDERS, key, &order)
    }

    async fn get(&self, number: &OrderNumber) -> Result<Option<Order>> {
        self.read(CF_ORDERS, number.as_str().as_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        self.read_all(CF_ORDERS)
    }

    async fn update(&self, mut order: Order) -> Result<Order> {
        let _guard = self.write_lock.lock().await;
        let key = order.number().as_str().as_bytes().to_vec();
        let stored: Order = self
            .read(CF_ORDERS, &key)?
            .ok_or_else(|| StoreError::OrderNotFound(order.number().clone()))?;
        if stored.version != order.version {
            return Err(StoreError::ConcurrentUpdate(order.number().to_string()));
        }
        order.version += 1;
        self.write(CF_ORDERS, &key, &order)?;
        Ok(order)
    }
}

#[async_trait]
impl ContactStore for RocksDBStore {
    async fn store(&self, message: ContactMessage) -> Result<()> {
        self.write(CF_CONTACTS, message.id.as_bytes(), &message)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ContactMessage>> {
        self.read(CF_CONTACTS, id.as_bytes())
    }

    async fn get_all(&self) -> Result<Vec<ContactMessage>> {
        self.read_all(CF_CONTACTS)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let cf = self.cf(CF_CONTACTS)?;
        let existed = self.db.get_pinned_cf(cf, id.as_bytes())?.is_some();
        if existed {
            self.db.delete_cf(cf, id.as_bytes())?;
        }
        Ok(existed)
    }
}
