//! # promo-core: Pure Promotion Pricing Logic
//!
//! This crate decides which promotions apply to a shopping cart and what
//! the shopper finally pays. It has zero I/O: promotions, products and
//! users come in through the traits in [`ports`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Promotion Pricing Workspace                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pricer (CLI host)                            │   │
//! │  │    config ──► tracing ──► seed store ──► price request         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ promo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  money    │  │ promotion │  │   rules   │  │  engine   │  │   │
//! │  │   │  types    │  │  period   │  │ calculator│  │  service  │  │   │
//! │  │   │  cart     │  │ conditions│  │  result   │  │  ports    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ports                                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                promo-store (in-memory adapters)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Decimal `Money`, `Price`, `DiscountPercentage`, `Discount`
//! - [`types`] - Ids, `Quantity`, `Stock`, `Email`, `MembershipLevel`
//! - [`product`], [`cart`], [`user`] - Catalog entities
//! - [`promotion`] - Promotion model (period, conditions, benefits)
//! - [`rules`] - Eligibility, conflicts, ranking
//! - [`calculator`] - Stacks discounts into a [`PromotionResult`]
//! - [`engine`] - Orchestrator over a [`PromotionSource`](ports::PromotionSource)
//! - [`service`] - Cart assembly, pricing, validation, promotion authoring
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same cart, user, promotions and instant give the same result
//! 2. **No I/O**: everything external sits behind a port
//! 3. **Decimal Money**: exact arithmetic, rounded half-up once per result
//! 4. **Copy-and-Return**: entities are never mutated in place
//!
//! ## Example Usage
//!
//! ```rust
//! use promo_core::money::{Money, Price};
//! use promo_core::promotion::{NewPromotion, Promotion, PromotionConditions, PromotionPeriod, PromotionType};
//! use promo_core::{Cart, DiscountCalculator, Email, Product, Quantity, Stock, User};
//! use chrono::{Duration, Utc};
//! use rust_decimal::Decimal;
//!
//! let user = User::register(Email::parse("ana@example.com").unwrap());
//! let laptop = Product::new("Laptop", Price::from_units(100_000), Stock::new(3)).unwrap();
//! let cart = Cart::new(user.id).add_item(&laptop, Quantity::one()).unwrap();
//!
//! let ten_percent = Promotion::create(NewPromotion {
//!     name: "Ten percent".into(),
//!     description: None,
//!     promotion_type: PromotionType::PercentageDiscount,
//!     priority: 1,
//!     period: PromotionPeriod::for_days(Utc::now() - Duration::days(1), 7),
//!     conditions: PromotionConditions::none(),
//!     discount_percentage: Some(Decimal::from(10)),
//!     discount_amount: None,
//!     max_discount_amount: None,
//! })
//! .unwrap()
//! .activate();
//!
//! let result = DiscountCalculator::default().calculate_discounts(&cart, &[ten_percent], &user);
//! assert_eq!(result.final_amount, Money::from_units(90_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod cart;
pub mod engine;
pub mod error;
pub mod money;
pub mod ports;
pub mod product;
pub mod promotion;
pub mod result;
pub mod rules;
pub mod service;
pub mod types;
pub mod user;
pub mod validation;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use promo_core::Money` instead of
// `use promo_core::money::Money`

pub use calculator::DiscountCalculator;
pub use cart::{Cart, CartItem};
pub use engine::{ConflictPolicy, PromotionEngine};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::{Discount, DiscountPercentage, Money, Price};
pub use product::Product;
pub use promotion::{Promotion, PromotionType};
pub use result::{AppliedPromotion, PromotionResult};
pub use rules::RuleEngine;
pub use types::*;
pub use user::User;
