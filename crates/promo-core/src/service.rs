//! # Use-Case Services
//!
//! Thin orchestration over the ports: turn a request into a cart, price it,
//! validate it, and author promotions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PricingRequest { user_id, items: [{ product_id, quantity }] }          │
//! │         │                                                               │
//! │         ├── UserSource ─────────► User         (NotFound)               │
//! │         ├── CartAssembler ──────► Cart         (NotFound / Invalid*)    │
//! │         └── PromotionEngine ────► PromotionResult                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `price_cart` fails fast on the first problem. `validate_cart` instead
//! walks every line and returns a report of all errors and warnings.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{Cart, CartItem};
use crate::engine::PromotionEngine;
use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Price};
use crate::ports::{ProductSource, PromotionRepository, PromotionSource, UserSource};
use crate::product::Product;
use crate::promotion::{NewPromotion, Promotion};
use crate::result::PromotionResult;
use crate::rules::{PromotionConflict, RuleEngine};
use crate::types::{CartId, ProductId, PromotionId, Quantity, UserId};
use crate::user::User;

/// Remaining stock below which `validate_cart` warns.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

// =============================================================================
// Requests
// =============================================================================

/// One requested cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub product_id: ProductId,
    /// Signed so that non-positive values surface as validation errors.
    pub quantity: i64,
    /// Price captured when the line was first added, if the client kept one.
    #[serde(default)]
    pub unit_price: Option<Price>,
}

impl CartLineRequest {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        CartLineRequest {
            product_id,
            quantity,
            unit_price: None,
        }
    }
}

/// A cart to price, as sent by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub cart_id: Option<CartId>,
    pub items: Vec<CartLineRequest>,
}

// =============================================================================
// Cart Assembler
// =============================================================================

/// Builds carts from request lines using a [`ProductSource`].
#[derive(Debug, Clone)]
pub struct CartAssembler<P> {
    products: P,
}

impl<P: ProductSource> CartAssembler<P> {
    pub fn new(products: P) -> Self {
        CartAssembler { products }
    }

    /// Assembles a cart, stopping at the first bad line.
    ///
    /// ## Errors
    /// - `Validation` for a quantity `<= 0`
    /// - `NotFound` for an unknown product
    /// - `ProductInactive` / `InsufficientStock` from the cart itself
    pub fn assemble(&self, cart_id: Option<CartId>, user_id: UserId, lines: &[CartLineRequest]) -> CoreResult<Cart> {
        let mut cart = Cart::with_id(cart_id.unwrap_or_default(), user_id);
        for line in lines {
            let (product, quantity) = self.resolve_line(line)?;
            cart = add_line(&cart, product, quantity, line.unit_price)?;
        }
        debug!(cart_id = %cart.id(), lines = cart.item_count(), "Assembled cart");
        Ok(cart)
    }

    fn resolve_line(&self, line: &CartLineRequest) -> CoreResult<(Product, Quantity)> {
        let quantity = Quantity::from_signed(line.quantity)?;
        let product = self
            .products
            .product_by_id(line.product_id)?
            .ok_or_else(|| CoreError::not_found("product", line.product_id))?;
        Ok((product, quantity))
    }
}

fn add_line(cart: &Cart, product: Product, quantity: Quantity, captured: Option<Price>) -> CoreResult<Cart> {
    match captured {
        Some(price) => cart.add_line(CartItem::with_unit_price(product, quantity, price)),
        None => cart.add_item(&product, quantity),
    }
}

// =============================================================================
// Pricing Service
// =============================================================================

/// Everything `validate_cart` found, errors and warnings alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Total of the lines that were admitted.
    pub subtotal: Money,
}

/// Prices and validates cart requests.
#[derive(Debug, Clone)]
pub struct PricingService<P, U, S> {
    assembler: CartAssembler<P>,
    users: U,
    engine: PromotionEngine<S>,
}

impl<P, U, S> PricingService<P, U, S>
where
    P: ProductSource,
    U: UserSource,
    S: PromotionSource,
{
    pub fn new(products: P, users: U, engine: PromotionEngine<S>) -> Self {
        PricingService {
            assembler: CartAssembler::new(products),
            users,
            engine,
        }
    }

    pub fn engine(&self) -> &PromotionEngine<S> {
        &self.engine
    }

    fn user(&self, id: UserId) -> CoreResult<User> {
        self.users
            .user_by_id(id)?
            .ok_or_else(|| CoreError::not_found("user", id))
    }

    /// Resolves the user and cart, then applies every eligible promotion.
    pub fn price_cart(&self, request: &PricingRequest) -> CoreResult<PromotionResult> {
        let user = self.user(request.user_id)?;
        let cart = self
            .assembler
            .assemble(request.cart_id, user.id, &request.items)?;
        self.engine.apply_promotions(&cart, &user)
    }

    /// Like [`price_cart`](Self::price_cart) but with exactly one promotion.
    pub fn price_cart_with_promotion(
        &self,
        request: &PricingRequest,
        promotion_id: PromotionId,
    ) -> CoreResult<PromotionResult> {
        let user = self.user(request.user_id)?;
        let cart = self
            .assembler
            .assemble(request.cart_id, user.id, &request.items)?;
        self.engine.apply_specific_promotion(&cart, &user, promotion_id)
    }

    /// Checks every line and collects all problems instead of failing fast.
    ///
    /// Only a failing source is returned as `Err`; business problems end
    /// up in the report.
    pub fn validate_cart(&self, request: &PricingRequest) -> CoreResult<CartValidationReport> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.users.user_by_id(request.user_id)?.is_none() {
            errors.push(CoreError::not_found("user", request.user_id).to_string());
        }

        let mut cart = Cart::with_id(request.cart_id.unwrap_or_default(), request.user_id);
        for line in &request.items {
            let (product, quantity) = match self.assembler.resolve_line(line) {
                Ok(resolved) => resolved,
                Err(err @ CoreError::Source(_)) => return Err(err),
                Err(err) => {
                    errors.push(err.to_string());
                    continue;
                }
            };

            match add_line(&cart, product, quantity, line.unit_price) {
                Ok(next) => cart = next,
                Err(err) => {
                    errors.push(err.to_string());
                    continue;
                }
            }

            if let Some(item) = cart.find_item(line.product_id) {
                line_warnings(item, &mut warnings);
            }
        }

        if request.items.is_empty() {
            warnings.push("cart is empty".to_string());
        }

        Ok(CartValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            subtotal: cart.total_amount(),
        })
    }
}

fn line_warnings(item: &CartItem, warnings: &mut Vec<String>) {
    let product = item.product();
    let remaining = product
        .stock()
        .quantity()
        .saturating_sub(item.quantity().value());
    if remaining < LOW_STOCK_THRESHOLD {
        warnings.push(format!(
            "low stock for '{}': {} left after this order",
            product.name(),
            remaining
        ));
    }
    if item.has_price_drift() {
        warnings.push(format!(
            "price of '{}' changed from {} to {}",
            product.name(),
            item.unit_price(),
            product.price()
        ));
    }
}

// =============================================================================
// Promotion Catalog
// =============================================================================

/// Promotion authoring on top of a [`PromotionRepository`].
#[derive(Debug, Clone)]
pub struct PromotionCatalog<R> {
    repository: R,
}

impl<R: PromotionRepository> PromotionCatalog<R> {
    pub fn new(repository: R) -> Self {
        PromotionCatalog { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Validates and stores a new (inactive) promotion.
    ///
    /// ## Errors
    /// - `Validation` for bad input (see [`Promotion::create`])
    /// - `Conflict` when a promotion with the same name exists
    pub fn create_promotion(&self, input: NewPromotion) -> CoreResult<Promotion> {
        let promotion = Promotion::create(input)?;
        if self.repository.find_by_name(promotion.name())?.is_some() {
            return Err(CoreError::Conflict {
                field: "name",
                value: promotion.name().to_string(),
            });
        }
        self.repository.save(promotion.clone())?;
        info!(promotion_id = %promotion.id(), name = %promotion.name(), "Created promotion");
        Ok(promotion)
    }

    pub fn activate(&self, id: PromotionId) -> CoreResult<Promotion> {
        self.transition(id, Promotion::activate)
    }

    pub fn deactivate(&self, id: PromotionId) -> CoreResult<Promotion> {
        self.transition(id, Promotion::deactivate)
    }

    /// Conflicts among the currently active promotions. Advisory only.
    pub fn active_conflicts(&self) -> CoreResult<Vec<PromotionConflict>> {
        let active = self.repository.active_promotions_ordered_by_priority()?;
        Ok(RuleEngine::new().detect_promotion_conflicts(&active))
    }

    fn transition(&self, id: PromotionId, change: fn(&Promotion) -> Promotion) -> CoreResult<Promotion> {
        let current = self
            .repository
            .promotion_by_id(id)?
            .ok_or_else(|| CoreError::not_found("promotion", id))?;
        let next = change(&current);
        self.repository.save(next.clone())?;
        info!(promotion_id = %id, active = next.is_active(), "Changed promotion state");
        Ok(next)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
