use crate::domain::money::{Currency, Money};
use crate::domain::product::{Category, Product, ProductId, ProductKind};
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of a catalog import file. Only `id`, `title` and `price` are required.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    price: Decimal,
    #[serde(default)]
    currency: Option<Currency>,
    #[serde(default)]
    category: Option<Category>,
    #[serde(default)]
    kind: Option<ProductKind>,
    #[serde(default)]
    stock: Option<u32>,
    #[serde(default)]
    is_unique: Option<bool>,
    #[serde(default)]
    featured: Option<bool>,
    #[serde(default)]
    on_sale: Option<bool>,
    #[serde(default)]
    sale_price: Option<Decimal>,
    #[serde(default)]
    sale_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    sort_order: Option<i32>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    main_image: Option<String>,
}

impl CatalogRecord {
    fn into_product(self, now: DateTime<Utc>) -> Result<Product> {
        let mut product = Product::new(
            ProductId::new(self.id)?,
            self.title.trim(),
            Money::from_decimal(self.price)?,
            now,
        );
        product.description = self.description.unwrap_or_default();
        product.currency = self.currency.unwrap_or_default();
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(kind) = self.kind {
            product.kind = kind;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        // Originals are one of a kind unless the row says otherwise
        product.is_unique = self
            .is_unique
            .unwrap_or(product.category == Category::Original);
        product.featured = self.featured.unwrap_or(false);
        product.on_sale = self.on_sale.unwrap_or(false);
        product.sale_price = self.sale_price.map(Money::from_decimal).transpose()?;
        product.sale_end_date = self.sale_end_date;
        product.sort_order = self.sort_order.unwrap_or(0);
        product.is_active = self.active.unwrap_or(true);
        product.main_image = self.main_image.unwrap_or_default();
        product.refresh_sold(now);
        product.validate()?;
        Ok(product)
    }
}

/// Reads catalog entries from a CSV source.
///
/// Whitespace is trimmed and rows may omit trailing optional columns. Each row is
/// validated on its own, so one bad row does not stop the import.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily parses rows into products.
    pub fn products(self) -> impl Iterator<Item = Result<Product>> {
        let now = Utc::now();
        self.reader
            .into_deserialize::<CatalogRecord>()
            .map(move |record| record.map_err(StoreError::from)?.into_product(now))
    }
}
