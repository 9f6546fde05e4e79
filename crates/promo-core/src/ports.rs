//! # Ports
//!
//! Read-mostly collaborators the core consumes. Adapters live outside this
//! crate (see `promo-store` for the in-memory ones).
//!
//! ```text
//! ┌─────────────────────┐   active_promotions_ordered_by_priority()
//! │  PromotionSource    │   promotion_by_id(id)
//! └──────────┬──────────┘
//!            │ extends
//! ┌──────────▼──────────┐   save(promotion)
//! │ PromotionRepository │   find_by_name(name)
//! └─────────────────────┘
//! ┌─────────────────────┐
//! │  ProductSource      │   product_by_id(id)
//! └─────────────────────┘
//! ┌─────────────────────┐
//! │  UserSource         │   user_by_id(id)
//! └─────────────────────┘
//! ```
//!
//! Lookups return `Ok(None)` for "not found"; `Err` is reserved for the
//! source itself failing.

use std::sync::Arc;

use crate::error::CoreResult;
use crate::product::Product;
use crate::promotion::Promotion;
use crate::types::{ProductId, PromotionId, UserId};
use crate::user::User;

/// Where the engine gets its promotions from.
pub trait PromotionSource: Send + Sync {
    /// Active promotions, lowest priority number first.
    fn active_promotions_ordered_by_priority(&self) -> CoreResult<Vec<Promotion>>;

    fn promotion_by_id(&self, id: PromotionId) -> CoreResult<Option<Promotion>>;
}

/// A writable promotion store.
pub trait PromotionRepository: PromotionSource {
    /// Inserts or replaces by id.
    fn save(&self, promotion: Promotion) -> CoreResult<()>;

    /// Case-insensitive lookup by name.
    fn find_by_name(&self, name: &str) -> CoreResult<Option<Promotion>>;
}

pub trait ProductSource: Send + Sync {
    fn product_by_id(&self, id: ProductId) -> CoreResult<Option<Product>>;
}

pub trait UserSource: Send + Sync {
    fn user_by_id(&self, id: UserId) -> CoreResult<Option<User>>;
}

// =============================================================================
// Blanket impls for shared handles
// =============================================================================

macro_rules! forward_source {
    ($ptr:ty) => {
        impl<T: PromotionSource + ?Sized> PromotionSource for $ptr {
            fn active_promotions_ordered_by_priority(&self) -> CoreResult<Vec<Promotion>> {
                (**self).active_promotions_ordered_by_priority()
            }

            fn promotion_by_id(&self, id: PromotionId) -> CoreResult<Option<Promotion>> {
                (**self).promotion_by_id(id)
            }
        }

        impl<T: PromotionRepository + ?Sized> PromotionRepository for $ptr {
            fn save(&self, promotion: Promotion) -> CoreResult<()> {
                (**self).save(promotion)
            }

            fn find_by_name(&self, name: &str) -> CoreResult<Option<Promotion>> {
                (**self).find_by_name(name)
            }
        }

        impl<T: ProductSource + ?Sized> ProductSource for $ptr {
            fn product_by_id(&self, id: ProductId) -> CoreResult<Option<Product>> {
                (**self).product_by_id(id)
            }
        }

        impl<T: UserSource + ?Sized> UserSource for $ptr {
            fn user_by_id(&self, id: UserId) -> CoreResult<Option<User>> {
                (**self).user_by_id(id)
            }
        }
    };
}

forward_source!(Arc<T>);
forward_source!(&T);
