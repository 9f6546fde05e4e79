//! # Pricer Application
//!
//! Wires configuration into a [`Store`] and a configured engine, then runs
//! the individual commands. Every command returns a serialisable value;
//! printing is left to the CLI layer.
//!
//! ```text
//! PricerConfig ──► PricerApp::new ──► Store (seed + promotions_file)
//!                        │
//!                        ▼
//!                  engine() = PromotionEngine
//!                    .with_calculator(scale)
//!                    .with_conflict_policy(policy)
//!                    .with_max_promotions(max)
//! ```

use std::path::Path;
use std::sync::Arc;

use promo_core::calculator::{DiscountComparison, PromotionPreview, Savings};
use promo_core::ports::{PromotionSource, UserSource};
use promo_core::rules::PromotionConflict;
use promo_core::service::{CartAssembler, CartValidationReport, PricingRequest};
use promo_core::{CoreError, DiscountCalculator, Promotion, PromotionId, PromotionResult};
use promo_store::{seed, Store, StoreEngine};
use serde::Serialize;
use tracing::info;

use crate::config::PricerConfig;
use crate::error::{AppError, AppResult};

/// Preview of a request: what would apply, what wouldn't, and how much each saves.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPreview {
    #[serde(flatten)]
    pub preview: PromotionPreview,
    pub comparison: Vec<DiscountComparison>,
    pub savings: Savings,
}

/// The configured store and engine settings behind every command.
#[derive(Debug, Clone)]
pub struct PricerApp {
    config: PricerConfig,
    store: Store,
}

impl PricerApp {
    /// Builds the store from `config.catalog`.
    pub fn new(config: PricerConfig) -> AppResult<Self> {
        let store = Store::new();

        if config.catalog.seed {
            seed::seed(&store)?;
        }
        if let Some(path) = &config.catalog.promotions_file {
            let contents = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
            let loaded = store.promotions().load_json(&contents)?;
            info!(?path, loaded, "Loaded promotion definitions");
        }

        Ok(Self { config, store })
    }

    pub fn config(&self) -> &PricerConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Engine configured from `[pricing]`.
    pub fn engine(&self) -> StoreEngine {
        let pricing = &self.config.pricing;
        self.store
            .promotion_engine()
            .with_calculator(DiscountCalculator::new(pricing.rounding_scale))
            .with_conflict_policy(pricing.conflict_policy)
            .with_max_promotions(pricing.max_promotions)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Prices `request` with every eligible promotion, or only `promotion`.
    pub fn price(&self, request: &PricingRequest, promotion: Option<PromotionId>) -> AppResult<PromotionResult> {
        let service = self.store.pricing_service(self.engine());
        let result = match promotion {
            Some(id) => service.price_cart_with_promotion(request, id)?,
            None => service.price_cart(request)?,
        };
        Ok(result)
    }

    pub fn validate(&self, request: &PricingRequest) -> AppResult<CartValidationReport> {
        let service = self.store.pricing_service(self.engine());
        Ok(service.validate_cart(request)?)
    }

    /// Every active promotion evaluated against the request, without conflict resolution.
    pub fn preview(&self, request: &PricingRequest) -> AppResult<RequestPreview> {
        let user = self
            .store
            .users()
            .user_by_id(request.user_id)?
            .ok_or_else(|| CoreError::not_found("user", request.user_id))?;
        let cart = CartAssembler::new(Arc::clone(self.store.products())).assemble(
            request.cart_id,
            user.id,
            &request.items,
        )?;
        let promotions = self.store.promotions().active_promotions_ordered_by_priority()?;

        let engine = self.engine();
        let calculator = engine.calculator();
        Ok(RequestPreview {
            preview: calculator.preview_promotion_application(&cart, &promotions, &user),
            comparison: calculator.compare_promotion_discounts(&cart, &promotions, &user),
            savings: calculator.calculate_savings(&cart, &promotions, &user),
        })
    }

    /// All promotions, active or not, in priority order.
    pub fn catalog(&self) -> AppResult<Vec<Promotion>> {
        Ok(self.store.promotions().list()?)
    }

    pub fn conflicts(&self) -> AppResult<Vec<PromotionConflict>> {
        Ok(self.store.promotion_catalog().active_conflicts()?)
    }
}

/// Reads a [`PricingRequest`] from a JSON file.
pub fn read_request(path: &Path) -> AppResult<PricingRequest> {
    let contents = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    Ok(serde_json::from_str(&contents)?)
}
