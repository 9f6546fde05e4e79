//! # Repository Module
//!
//! In-memory implementations of promo-core's ports.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  PromotionEngine / PricingService                                       │
//! │       │                                                                 │
//! │       │  source.active_promotions_ordered_by_priority()                 │
//! │       ▼                                                                 │
//! │  InMemoryPromotionRepository                                            │
//! │  ├── insert / save                                                      │
//! │  ├── promotion_by_id                                                    │
//! │  └── find_by_name                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Table<PromotionId, Promotion>  (RwLock<HashMap>)                       │
//! │                                                                         │
//! │  Many concurrent readers, one writer at a time. Reads clone the         │
//! │  entity out, so no lock is held while a cart is priced.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`InMemoryProductRepository`] - Product lookups
//! - [`InMemoryUserRepository`] - User lookups
//! - [`InMemoryPromotionRepository`] - Promotion source and authoring store

pub mod product;
pub mod promotion;
pub mod user;

pub use product::InMemoryProductRepository;
pub use promotion::InMemoryPromotionRepository;
pub use user::InMemoryUserRepository;

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};

/// A lock-guarded map shared by the repositories.
#[derive(Debug)]
pub(crate) struct Table<K, V> {
    name: &'static str,
    rows: RwLock<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> Table<K, V> {
    pub(crate) fn new(name: &'static str) -> Self {
        Table {
            name,
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<K, V>>> {
        self.rows.read().map_err(|_| StoreError::poisoned(self.name))
    }

    pub(crate) fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<K, V>>> {
        self.rows.write().map_err(|_| StoreError::poisoned(self.name))
    }

    pub(crate) fn get(&self, key: &K) -> StoreResult<Option<V>> {
        Ok(self.read()?.get(key).cloned())
    }

    pub(crate) fn upsert(&self, key: K, value: V) -> StoreResult<()> {
        self.write()?.insert(key, value);
        Ok(())
    }

    /// Inserts only if `key` is new.
    pub(crate) fn insert_new(&self, key: K, value: V, id: impl ToString) -> StoreResult<()> {
        let mut rows = self.write()?;
        if rows.contains_key(&key) {
            return Err(StoreError::Duplicate {
                entity: self.name,
                id: id.to_string(),
            });
        }
        rows.insert(key, value);
        Ok(())
    }

    pub(crate) fn values(&self) -> StoreResult<Vec<V>> {
        Ok(self.read()?.values().cloned().collect())
    }

    pub(crate) fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_insert_new_rejects_duplicates() {
        let table: Table<u32, &str> = Table::new("widget");
        table.insert_new(1, "a", 1).unwrap();

        let err = table.insert_new(1, "b", 1).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { entity: "widget", .. }));
        assert_eq!(table.get(&1).unwrap(), Some("a"));
    }

    #[test]
    fn test_poisoned_lock_surfaces_as_error() {
        let table: Arc<Table<u32, u32>> = Arc::new(Table::new("widget"));
        let writer = Arc::clone(&table);

        let _ = thread::spawn(move || {
            let _guard = writer.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(table.get(&1), Err(StoreError::LockPoisoned { .. })));
    }
}
