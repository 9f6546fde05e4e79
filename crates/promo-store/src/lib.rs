//! # promo-store: Storage Adapters for the Pricing Engine
//!
//! In-memory repositories behind promo-core's ports, and a seed catalog.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pricing Data Flow                                │
//! │                                                                         │
//! │  pricer CLI (price / validate / catalog)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   promo-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │  Repositories │    │    Seed      │  │   │
//! │  │   │   (lib.rs)    │    │ (repository/) │    │  (seed.rs)   │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ Arc handles   │◄───│ ProductRepo   │    │ 5 products   │  │   │
//! │  │   │ engine wiring │    │ UserRepo      │    │ 3 users      │  │   │
//! │  │   │               │    │ PromotionRepo │    │ 5 promotions │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │ ports (ProductSource, UserSource, PromotionSource)              │
//! │       ▼                                                                 │
//! │  promo-core engine and services                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use promo_store::{seed, Store};
//! use promo_core::service::{CartLineRequest, PricingRequest};
//!
//! let store = Store::new();
//! seed::seed(&store).unwrap();
//!
//! let service = store.pricing_service(store.promotion_engine());
//! let request = PricingRequest {
//!     user_id: seed::ids::REGULAR_CUSTOMER,
//!     cart_id: None,
//!     items: vec![CartLineRequest::new(seed::ids::BOOK, 1)],
//! };
//! let result = service.price_cart(&request).unwrap();
//! assert!(!result.has_discount());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use repository::{InMemoryProductRepository, InMemoryPromotionRepository, InMemoryUserRepository};

use std::sync::Arc;

use promo_core::service::{PricingService, PromotionCatalog};
use promo_core::PromotionEngine;

/// Engine type wired to the in-memory promotion repository.
pub type StoreEngine = PromotionEngine<Arc<InMemoryPromotionRepository>>;

/// Pricing service wired to the in-memory repositories.
pub type StorePricingService = PricingService<
    Arc<InMemoryProductRepository>,
    Arc<InMemoryUserRepository>,
    Arc<InMemoryPromotionRepository>,
>;

/// Shared handles to all three repositories.
///
/// Cloning is cheap; clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct Store {
    products: Arc<InMemoryProductRepository>,
    users: Arc<InMemoryUserRepository>,
    promotions: Arc<InMemoryPromotionRepository>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &Arc<InMemoryProductRepository> {
        &self.products
    }

    pub fn users(&self) -> &Arc<InMemoryUserRepository> {
        &self.users
    }

    pub fn promotions(&self) -> &Arc<InMemoryPromotionRepository> {
        &self.promotions
    }

    /// A default (stacking, scale 2) engine over the promotion repository.
    pub fn promotion_engine(&self) -> StoreEngine {
        PromotionEngine::new(Arc::clone(&self.promotions))
    }

    pub fn pricing_service(&self, engine: StoreEngine) -> StorePricingService {
        PricingService::new(Arc::clone(&self.products), Arc::clone(&self.users), engine)
    }

    pub fn promotion_catalog(&self) -> PromotionCatalog<Arc<InMemoryPromotionRepository>> {
        PromotionCatalog::new(Arc::clone(&self.promotions))
    }
}
