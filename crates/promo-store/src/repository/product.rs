//! # Product Repository
//!
//! Products keyed by id. Cart assembly reads from here through
//! [`ProductSource`].

use promo_core::error::CoreResult;
use promo_core::ports::ProductSource;
use promo_core::{Product, ProductId};
use tracing::debug;

use super::Table;
use crate::error::StoreResult;

/// Repository for catalog products.
///
/// ## Usage
/// ```rust
/// use promo_core::money::Price;
/// use promo_core::ports::ProductSource;
/// use promo_core::{Product, Stock};
/// use promo_store::InMemoryProductRepository;
///
/// let repo = InMemoryProductRepository::new();
/// let mug = Product::new("Mug", Price::from_units(12), Stock::new(40)).unwrap();
/// repo.insert(mug.clone()).unwrap();
///
/// assert_eq!(repo.product_by_id(mug.id()).unwrap(), Some(mug));
/// ```
#[derive(Debug)]
pub struct InMemoryProductRepository {
    table: Table<ProductId, Product>,
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        InMemoryProductRepository {
            table: Table::new("product"),
        }
    }

    /// Adds a product; fails if the id is already taken.
    pub fn insert(&self, product: Product) -> StoreResult<()> {
        debug!(product_id = %product.id(), name = %product.name(), "Inserting product");
        self.table.insert_new(product.id(), product.clone(), product.id())
    }

    /// Inserts or replaces (price changes, stock updates, deactivation).
    pub fn update(&self, product: Product) -> StoreResult<()> {
        self.table.upsert(product.id(), product)
    }

    /// All products, sorted by name.
    pub fn list(&self) -> StoreResult<Vec<Product>> {
        let mut products = self.table.values()?;
        products.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(products)
    }

    /// Active products in `category` (case-insensitive).
    pub fn list_by_category(&self, category: &str) -> StoreResult<Vec<Product>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|p| p.is_active() && p.is_in_category(category))
            .collect())
    }

    pub fn len(&self) -> StoreResult<usize> {
        self.table.len()
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl ProductSource for InMemoryProductRepository {
    fn product_by_id(&self, id: ProductId) -> CoreResult<Option<Product>> {
        Ok(self.table.get(&id)?)
    }
}
