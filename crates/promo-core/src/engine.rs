//! # Promotion Engine
//!
//! The externally-callable entry point. It pulls promotions from a
//! [`PromotionSource`], filters them with the [`RuleEngine`] and hands the
//! survivors to the [`DiscountCalculator`].
//!
//! ## Pipeline
//! ```text
//! ┌───────────────┐    ┌───────────────┐    ┌───────────────┐    ┌───────────────┐
//! │ PromotionSrc  │───►│  RuleEngine   │───►│ ConflictPolicy│───►│  Calculator   │
//! │ active, by    │    │ evaluate_rules│    │ Stack: as-is  │    │ stack + round │
//! │ priority      │    │ .is_eligible  │    │ Exclusive:    │    │               │
//! │               │    │               │    │ drop clashes  │    │               │
//! └───────────────┘    └───────────────┘    └───────────────┘    └───────┬───────┘
//!                                                                        ▼
//!                                                                 PromotionResult
//! ```
//!
//! The engine holds no mutable state. Share it across threads behind an
//! `Arc` as long as the source is `Send + Sync` (every [`PromotionSource`]
//! is).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::calculator::DiscountCalculator;
use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ports::PromotionSource;
use crate::promotion::Promotion;
use crate::result::PromotionResult;
use crate::rules::{conflict_reasons, RuleEngine};
use crate::types::PromotionId;
use crate::user::User;

// =============================================================================
// Conflict Policy
// =============================================================================

/// What to do with eligible promotions that conflict with each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Every eligible promotion applies.
    #[default]
    Stack,
    /// Walking in priority order, a promotion is dropped if it conflicts
    /// with one already kept.
    Exclusive,
}

impl ConflictPolicy {
    /// Applies the policy to promotions already sorted by priority.
    pub fn resolve(&self, promotions: Vec<Promotion>) -> Vec<Promotion> {
        match self {
            ConflictPolicy::Stack => promotions,
            ConflictPolicy::Exclusive => {
                let mut kept: Vec<Promotion> = Vec::with_capacity(promotions.len());
                for candidate in promotions {
                    if kept.iter().all(|k| conflict_reasons(k, &candidate).is_empty()) {
                        kept.push(candidate);
                    }
                }
                kept
            }
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::Stack => write!(f, "stack"),
            ConflictPolicy::Exclusive => write!(f, "exclusive"),
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stack" | "stacking" => Ok(ConflictPolicy::Stack),
            "exclusive" => Ok(ConflictPolicy::Exclusive),
            other => Err(ValidationError::InvalidFormat {
                field: "conflict_policy".to_string(),
                reason: format!("expected 'stack' or 'exclusive', got '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Orchestrates promotion lookup, eligibility and calculation.
#[derive(Debug, Clone)]
pub struct PromotionEngine<S> {
    source: S,
    rules: RuleEngine,
    calculator: DiscountCalculator,
    conflict_policy: ConflictPolicy,
    max_promotions: Option<usize>,
}

impl<S: PromotionSource> PromotionEngine<S> {
    /// An engine that stacks every eligible promotion and rounds to two places.
    pub fn new(source: S) -> Self {
        PromotionEngine {
            source,
            rules: RuleEngine::new(),
            calculator: DiscountCalculator::default(),
            conflict_policy: ConflictPolicy::Stack,
            max_promotions: None,
        }
    }

    pub fn with_calculator(mut self, calculator: DiscountCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Caps how many promotions a single cart can receive.
    pub fn with_max_promotions(mut self, max: Option<usize>) -> Self {
        self.max_promotions = max;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn calculator(&self) -> &DiscountCalculator {
        &self.calculator
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }

    /// Prices `cart` with every eligible active promotion.
    ///
    /// ## Errors
    /// Only failures of the promotion source propagate; an empty or fully
    /// ineligible catalog yields an undiscounted result.
    #[instrument(skip_all, fields(cart_id = %cart.id(), user_id = %user.id))]
    pub fn apply_promotions_at(&self, cart: &Cart, user: &User, now: DateTime<Utc>) -> CoreResult<PromotionResult> {
        let active = self.source.active_promotions_ordered_by_priority()?;
        let candidates = active.len();

        let eligible: Vec<Promotion> = active
            .into_iter()
            .filter(|p| self.rules.evaluate_rules_at(p, cart, user, now).is_eligible)
            .collect();

        let mut selected = self.conflict_policy.resolve(eligible);
        if let Some(max) = self.max_promotions {
            selected.truncate(max);
        }

        let result = self.calculator.calculate_discounts_at(cart, &selected, user, now);

        info!(
            candidates,
            applied = result.applied_count(),
            subtotal = %result.subtotal,
            total_discount = %result.total_discount,
            final_amount = %result.final_amount,
            "Priced cart"
        );
        Ok(result)
    }

    pub fn apply_promotions(&self, cart: &Cart, user: &User) -> CoreResult<PromotionResult> {
        self.apply_promotions_at(cart, user, Utc::now())
    }

    /// Prices `cart` with exactly one promotion.
    ///
    /// ## Errors
    /// - `NotFound` when the id is unknown
    /// - `PromotionIneligible` (an InvalidState kind) listing the failed rules
    #[instrument(skip_all, fields(cart_id = %cart.id(), user_id = %user.id, %promotion_id))]
    pub fn apply_specific_promotion_at(
        &self,
        cart: &Cart,
        user: &User,
        promotion_id: PromotionId,
        now: DateTime<Utc>,
    ) -> CoreResult<PromotionResult> {
        let promotion = self
            .source
            .promotion_by_id(promotion_id)?
            .ok_or_else(|| CoreError::not_found("promotion", promotion_id))?;

        let evaluation = self.rules.evaluate_rules_at(&promotion, cart, user, now);
        if !evaluation.is_eligible {
            warn!(
                promotion = %promotion.name(),
                failed = ?evaluation.failed_rules,
                "Requested promotion rejected"
            );
            return Err(CoreError::PromotionIneligible {
                promotion: promotion.name().to_string(),
                failed_rules: evaluation.failed_rules,
            });
        }

        Ok(self
            .calculator
            .calculate_discounts_at(cart, std::slice::from_ref(&promotion), user, now))
    }

    pub fn apply_specific_promotion(
        &self,
        cart: &Cart,
        user: &User,
        promotion_id: PromotionId,
    ) -> CoreResult<PromotionResult> {
        self.apply_specific_promotion_at(cart, user, promotion_id, Utc::now())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
