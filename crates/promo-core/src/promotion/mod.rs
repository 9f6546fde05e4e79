//! # Promotion Model
//!
//! A promotion is a time-boxed, conditional discount rule.
//!
//! ## Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Promotion                                                              │
//! │  ├── type        PERCENTAGE_DISCOUNT | FIXED_DISCOUNT | BOGO | ...      │
//! │  ├── priority    lower number = higher precedence                       │
//! │  ├── is_active   created inactive, switched on with activate()          │
//! │  ├── period      [start, end]             (period.rs)                   │
//! │  ├── conditions  who/what qualifies       (conditions.rs)               │
//! │  └── benefits    how much comes off       (benefits.rs)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! Promotions are values. `activate`, `deactivate`, `change_priority`,
//! `update_conditions` and `update_benefits` each return a new promotion
//! with a bumped `updated_at`.

mod benefits;
mod conditions;
mod period;

pub use benefits::{compute_discount, PromotionBenefits, Reward};
pub use conditions::{keys as condition_keys, ConditionCheck, PromotionConditions};
pub use period::PromotionPeriod;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::ValidationError;
use crate::money::{Discount, DiscountPercentage, Money};
use crate::types::PromotionId;
use crate::user::User;
use crate::validation::{validate_optional_text, validate_promotion_name, ValidationResult, MAX_DESCRIPTION_LEN};

// =============================================================================
// Promotion Type
// =============================================================================

/// Kind of promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionType {
    PercentageDiscount,
    FixedDiscount,
    BuyOneGetOne,
    FreeShipping,
    Cashback,
}

impl PromotionType {
    /// Only percentage and fixed promotions reduce the payable amount.
    pub const fn affects_amount(&self) -> bool {
        matches!(
            self,
            PromotionType::PercentageDiscount | PromotionType::FixedDiscount
        )
    }

    pub const fn code(&self) -> &'static str {
        match self {
            PromotionType::PercentageDiscount => "PERCENTAGE_DISCOUNT",
            PromotionType::FixedDiscount => "FIXED_DISCOUNT",
            PromotionType::BuyOneGetOne => "BUY_ONE_GET_ONE",
            PromotionType::FreeShipping => "FREE_SHIPPING",
            PromotionType::Cashback => "CASHBACK",
        }
    }
}

impl fmt::Display for PromotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PromotionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "PERCENTAGE_DISCOUNT" | "PERCENTAGE" => Ok(PromotionType::PercentageDiscount),
            "FIXED_DISCOUNT" | "FIXED" => Ok(PromotionType::FixedDiscount),
            "BUY_ONE_GET_ONE" | "BOGO" => Ok(PromotionType::BuyOneGetOne),
            "FREE_SHIPPING" => Ok(PromotionType::FreeShipping),
            "CASHBACK" => Ok(PromotionType::Cashback),
            other => Err(ValidationError::InvalidFormat {
                field: "promotion_type".to_string(),
                reason: format!("unknown type '{}'", other),
            }),
        }
    }
}

// =============================================================================
// New Promotion (creation input)
// =============================================================================

/// Raw input for [`Promotion::create`].
///
/// Discount fields are plain decimals so that the both/neither rule can be
/// reported as a validation error instead of being unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPromotion {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub promotion_type: PromotionType,
    #[serde(default)]
    pub priority: u32,
    pub period: PromotionPeriod,
    #[serde(default)]
    pub conditions: PromotionConditions,
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub max_discount_amount: Option<Decimal>,
}

impl NewPromotion {
    /// Validates the discount fields and builds the benefits value.
    ///
    /// ## Rules
    /// - exactly one of `discount_percentage` / `discount_amount`
    /// - percentage in [0, 100], amounts non-negative
    /// - PERCENTAGE_DISCOUNT needs a percentage, FIXED_DISCOUNT an amount
    pub fn benefits(&self) -> ValidationResult<PromotionBenefits> {
        let benefits = match (self.discount_percentage, self.discount_amount) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::Inconsistent(
                    "only one of discount percentage or discount amount may be set".to_string(),
                ))
            }
            (None, None) => {
                return Err(ValidationError::Inconsistent(
                    "either discount percentage or discount amount is required".to_string(),
                ))
            }
            (Some(pct), None) => PromotionBenefits::percentage(DiscountPercentage::new(pct)?),
            (None, Some(amount)) => PromotionBenefits::fixed(Money::new(amount)?),
        };

        let benefits = match self.max_discount_amount {
            Some(cap) => benefits.with_max_discount(Money::new(cap)?),
            None => benefits,
        };

        ensure_reward_matches_type(self.promotion_type, &benefits)?;
        Ok(benefits)
    }
}

fn ensure_reward_matches_type(
    promotion_type: PromotionType,
    benefits: &PromotionBenefits,
) -> ValidationResult<()> {
    let mismatch = match (promotion_type, benefits.reward) {
        (_, None) => true,
        (PromotionType::PercentageDiscount, Some(Reward::Fixed(_))) => true,
        (PromotionType::FixedDiscount, Some(Reward::Percentage(_))) => true,
        _ => false,
    };
    if mismatch {
        return Err(ValidationError::Inconsistent(format!(
            "{} promotions need a matching discount value",
            promotion_type
        )));
    }
    Ok(())
}

// =============================================================================
// Promotion
// =============================================================================

/// A promotion definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    id: PromotionId,
    name: String,
    description: Option<String>,
    promotion_type: PromotionType,
    priority: u32,
    is_active: bool,
    period: PromotionPeriod,
    conditions: PromotionConditions,
    benefits: PromotionBenefits,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Promotion {
    /// Validates `input` and creates an inactive promotion.
    ///
    /// ## Errors
    /// `Validation` for a blank/over-long name or description, or when the
    /// discount fields break the rules in [`NewPromotion::benefits`].
    pub fn create(input: NewPromotion) -> ValidationResult<Promotion> {
        Self::create_with_id(PromotionId::new(), input)
    }

    pub fn create_with_id(id: PromotionId, input: NewPromotion) -> ValidationResult<Promotion> {
        validate_promotion_name(&input.name)?;
        validate_optional_text("description", input.description.as_deref(), MAX_DESCRIPTION_LEN)?;
        let benefits = input.benefits()?;

        let now = Utc::now();
        Ok(Promotion {
            id,
            name: input.name.trim().to_string(),
            description: input.description,
            promotion_type: input.promotion_type,
            priority: input.priority,
            is_active: false,
            period: input.period,
            conditions: input.conditions,
            benefits,
            created_at: now,
            updated_at: now,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> PromotionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn promotion_type(&self) -> PromotionType {
        self.promotion_type
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn period(&self) -> &PromotionPeriod {
        &self.period
    }

    pub fn conditions(&self) -> &PromotionConditions {
        &self.conditions
    }

    pub fn benefits(&self) -> &PromotionBenefits {
        &self.benefits
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    /// Active, within its period at `now`, and conditions satisfied.
    pub fn is_applicable_at(&self, cart: &Cart, user: &User, now: DateTime<Utc>) -> bool {
        self.is_active && self.period.is_valid_at(now) && self.conditions.is_satisfied_by(cart, user)
    }

    pub fn is_applicable(&self, cart: &Cart, user: &User) -> bool {
        self.is_applicable_at(cart, user, Utc::now())
    }

    /// The discount this promotion grants `cart` at `now`.
    ///
    /// Zero when not applicable or when the type does not change the
    /// payable amount (BOGO, free shipping, cashback).
    pub fn calculate_discount_at(&self, cart: &Cart, user: &User, now: DateTime<Utc>) -> Discount {
        if !self.is_applicable_at(cart, user, now) || !self.promotion_type.affects_amount() {
            return Discount::zero();
        }
        self.benefits.compute_discount(cart.total_amount())
    }

    pub fn calculate_discount(&self, cart: &Cart, user: &User) -> Discount {
        self.calculate_discount_at(cart, user, Utc::now())
    }

    // -------------------------------------------------------------------------
    // Copy-and-return transitions
    // -------------------------------------------------------------------------

    pub fn activate(&self) -> Promotion {
        self.touched(|p| p.is_active = true)
    }

    pub fn deactivate(&self) -> Promotion {
        self.touched(|p| p.is_active = false)
    }

    pub fn change_priority(&self, priority: u32) -> Promotion {
        self.touched(|p| p.priority = priority)
    }

    pub fn update_conditions(&self, conditions: PromotionConditions) -> Promotion {
        self.touched(|p| p.conditions = conditions)
    }

    pub fn update_period(&self, period: PromotionPeriod) -> Promotion {
        self.touched(|p| p.period = period)
    }

    /// Replaces the benefits; they must still suit the promotion type.
    pub fn update_benefits(&self, benefits: PromotionBenefits) -> ValidationResult<Promotion> {
        ensure_reward_matches_type(self.promotion_type, &benefits)?;
        Ok(self.touched(|p| p.benefits = benefits))
    }

    fn touched(&self, change: impl FnOnce(&mut Promotion)) -> Promotion {
        let mut next = self.clone();
        change(&mut next);
        next.updated_at = Utc::now();
        next
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
