//! # Rule Engine
//!
//! Decides whether one promotion is eligible for one cart/user pair, and
//! explains the decision.
//!
//! ## The Four Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  evaluate_rules(promotion, cart, user)                                  │
//! │                                                                         │
//! │   (a) promotion is active                      ─┐                       │
//! │   (b) period contains `now`                     │  each produces one    │
//! │   (c) conditions satisfied by cart/user         │  pass or fail message │
//! │   (d) membership tier ≥ target tier (if any)   ─┘                       │
//! │                                                                         │
//! │   is_eligible = failed_rules.is_empty()                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is read-only. Methods ending in `_at` take the
//! evaluation instant explicitly; the others use the wall clock.
//!
//! Conflict detection is advisory. The engine only consults it when the
//! exclusive [`ConflictPolicy`](crate::engine::ConflictPolicy) is chosen.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::debug;

use crate::cart::Cart;
use crate::promotion::Promotion;
use crate::types::PromotionId;
use crate::user::User;

/// Weight of the discount ratio in the efficiency score.
const DISCOUNT_WEIGHT: f64 = 0.7;
/// Weight of the priority component in the efficiency score.
const PRIORITY_WEIGHT: f64 = 0.3;

// =============================================================================
// Evaluation Results
// =============================================================================

/// Outcome of [`RuleEngine::evaluate_rules`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEvaluation {
    pub is_eligible: bool,
    pub passed_rules: Vec<String>,
    pub failed_rules: Vec<String>,
}

impl RuleEvaluation {
    fn record(&mut self, passed: bool, pass_msg: String, fail_msg: String) {
        if passed {
            self.passed_rules.push(pass_msg);
        } else {
            self.failed_rules.push(fail_msg);
        }
    }
}

/// Why two promotions were flagged as conflicting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictReason {
    SameType,
    OverlappingPeriod,
    SamePriority,
}

/// A pair of promotions that would compete if both applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionConflict {
    pub first: PromotionId,
    pub second: PromotionId,
    pub reasons: Vec<ConflictReason>,
}

/// Reasons `a` and `b` conflict; empty when they don't.
pub fn conflict_reasons(a: &Promotion, b: &Promotion) -> Vec<ConflictReason> {
    let mut reasons = Vec::new();
    if a.promotion_type() == b.promotion_type() {
        reasons.push(ConflictReason::SameType);
    }
    if a.period().overlaps(b.period()) {
        reasons.push(ConflictReason::OverlappingPeriod);
    }
    if a.priority() == b.priority() {
        reasons.push(ConflictReason::SamePriority);
    }
    reasons
}

// =============================================================================
// Rule Engine
// =============================================================================

/// Stateless eligibility evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        RuleEngine
    }

    /// Runs the four rules at `now` and records a message for each.
    pub fn evaluate_rules_at(
        &self,
        promotion: &Promotion,
        cart: &Cart,
        user: &User,
        now: DateTime<Utc>,
    ) -> RuleEvaluation {
        let mut eval = RuleEvaluation {
            is_eligible: false,
            passed_rules: Vec::with_capacity(4),
            failed_rules: Vec::new(),
        };

        eval.record(
            promotion.is_active(),
            "promotion is active".to_string(),
            "promotion is inactive".to_string(),
        );

        let period = promotion.period();
        eval.record(
            period.is_valid_at(now),
            "promotion period is valid".to_string(),
            format!(
                "promotion period {} .. {} does not include {}",
                period.start().to_rfc3339(),
                period.end().to_rfc3339(),
                now.to_rfc3339()
            ),
        );

        let unmet: Vec<&'static str> = promotion
            .conditions()
            .checks(cart, user)
            .into_iter()
            .filter(|check| !check.satisfied)
            .map(|check| check.key)
            .collect();
        eval.record(
            unmet.is_empty(),
            "promotion conditions are satisfied".to_string(),
            format!("promotion conditions not satisfied: {}", unmet.join(", ")),
        );

        match promotion.conditions().target_user_level {
            Some(required) => eval.record(
                user.is_eligible_for(required),
                format!("membership level {} meets {}", user.membership_level, required),
                format!("membership level {} is below {}", user.membership_level, required),
            ),
            None => eval.passed_rules.push("no membership level required".to_string()),
        }

        eval.is_eligible = eval.failed_rules.is_empty();

        debug!(
            promotion = %promotion.name(),
            eligible = eval.is_eligible,
            failed = eval.failed_rules.len(),
            "Evaluated promotion rules"
        );
        eval
    }

    pub fn evaluate_rules(&self, promotion: &Promotion, cart: &Cart, user: &User) -> RuleEvaluation {
        self.evaluate_rules_at(promotion, cart, user, Utc::now())
    }

    /// Same predicate as [`evaluate_rules_at`](Self::evaluate_rules_at), without the trace.
    pub fn is_eligible_at(&self, promotion: &Promotion, cart: &Cart, user: &User, now: DateTime<Utc>) -> bool {
        promotion.is_applicable_at(cart, user, now)
            && promotion
                .conditions()
                .target_user_level
                .map_or(true, |level| user.is_eligible_for(level))
    }

    pub fn is_eligible_for_promotion(&self, promotion: &Promotion, cart: &Cart, user: &User) -> bool {
        self.is_eligible_at(promotion, cart, user, Utc::now())
    }

    /// Eligible promotions, in input order.
    pub fn filter_eligible_at(
        &self,
        promotions: &[Promotion],
        cart: &Cart,
        user: &User,
        now: DateTime<Utc>,
    ) -> Vec<Promotion> {
        promotions
            .iter()
            .filter(|p| self.is_eligible_at(p, cart, user, now))
            .cloned()
            .collect()
    }

    pub fn filter_eligible_promotions(&self, promotions: &[Promotion], cart: &Cart, user: &User) -> Vec<Promotion> {
        self.filter_eligible_at(promotions, cart, user, Utc::now())
    }

    /// Per-condition breakdown for diagnostics.
    ///
    /// Always contains `isActive` and `isPeriodValid`, plus one entry per
    /// condition the promotion declares.
    pub fn evaluate_individual_conditions_at(
        &self,
        promotion: &Promotion,
        cart: &Cart,
        user: &User,
        now: DateTime<Utc>,
    ) -> BTreeMap<String, bool> {
        let mut results = BTreeMap::new();
        results.insert("isActive".to_string(), promotion.is_active());
        results.insert("isPeriodValid".to_string(), promotion.period().is_valid_at(now));
        for check in promotion.conditions().checks(cart, user) {
            results.insert(check.key.to_string(), check.satisfied);
        }
        results
    }

    pub fn evaluate_individual_conditions(
        &self,
        promotion: &Promotion,
        cart: &Cart,
        user: &User,
    ) -> BTreeMap<String, bool> {
        self.evaluate_individual_conditions_at(promotion, cart, user, Utc::now())
    }

    /// Pairwise scan for promotions of the same type, overlapping periods,
    /// or equal priority.
    pub fn detect_promotion_conflicts(&self, promotions: &[Promotion]) -> Vec<PromotionConflict> {
        let mut conflicts = Vec::new();
        for (i, a) in promotions.iter().enumerate() {
            for b in &promotions[i + 1..] {
                let reasons = conflict_reasons(a, b);
                if !reasons.is_empty() {
                    conflicts.push(PromotionConflict {
                        first: a.id(),
                        second: b.id(),
                        reasons,
                    });
                }
            }
        }
        conflicts
    }

    /// Stable sort, lowest priority number first.
    pub fn sort_by_priority(&self, promotions: &[Promotion]) -> Vec<Promotion> {
        let mut sorted = promotions.to_vec();
        sorted.sort_by_key(Promotion::priority);
        sorted
    }

    /// Stable sort, largest discount for this cart first.
    pub fn sort_by_discount_amount_at(
        &self,
        promotions: &[Promotion],
        cart: &Cart,
        user: &User,
        now: DateTime<Utc>,
    ) -> Vec<Promotion> {
        let mut sorted = promotions.to_vec();
        sorted.sort_by_cached_key(|p| Reverse(p.calculate_discount_at(cart, user, now).amount()));
        sorted
    }

    pub fn sort_by_discount_amount(&self, promotions: &[Promotion], cart: &Cart, user: &User) -> Vec<Promotion> {
        self.sort_by_discount_amount_at(promotions, cart, user, Utc::now())
    }

    /// Ranking score in `[0.0, 1.0]`; zero when ineligible.
    ///
    /// ```text
    /// score = 0.7 × (discount / cart_total) + 0.3 × (1 − priority / 100)
    /// ```
    pub fn evaluate_efficiency_at(
        &self,
        promotion: &Promotion,
        cart: &Cart,
        user: &User,
        now: DateTime<Utc>,
    ) -> f64 {
        if !self.is_eligible_at(promotion, cart, user, now) {
            return 0.0;
        }

        let total = cart.total_amount();
        let ratio = if total.is_zero() {
            0.0
        } else {
            let discount = promotion.calculate_discount_at(cart, user, now).amount();
            (discount.amount() / total.amount()).to_f64().unwrap_or(0.0)
        };
        let priority_score = 1.0 - f64::from(promotion.priority()) / 100.0;

        (DISCOUNT_WEIGHT * ratio + PRIORITY_WEIGHT * priority_score).clamp(0.0, 1.0)
    }

    pub fn evaluate_promotion_efficiency(&self, promotion: &Promotion, cart: &Cart, user: &User) -> f64 {
        self.evaluate_efficiency_at(promotion, cart, user, Utc::now())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
