//! # Discount Calculator
//!
//! Turns an already-filtered, already-ordered list of promotions into money.
//!
//! ## Stacking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for promotion in promotions (order as given):                          │
//! │      d = promotion.calculate_discount(cart, user)    (exact decimal)    │
//! │      if d.is_applied(): total += d, record AppliedPromotion             │
//! │                                                                         │
//! │  subtotal       = round(cart.total_amount)                              │
//! │  total_discount = round(total)                                          │
//! │  final_amount   = max(0, subtotal − total_discount)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every applicable promotion contributes; there is no "best one wins" and
//! no "stop after first match". Rounding is half-up to `scale` places and
//! only happens when the result is built.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::cart::Cart;
use crate::money::{Discount, Money, ROUNDING};
use crate::promotion::Promotion;
use crate::result::{PromotionResult, ResultBuilder};
use crate::rules::RuleEngine;
use crate::types::PromotionId;
use crate::user::User;

/// Decimal places amounts are rounded to by default.
pub const DEFAULT_SCALE: u32 = 2;

// =============================================================================
// Derived Views
// =============================================================================

/// One row of [`DiscountCalculator::compare_promotion_discounts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountComparison {
    pub promotion_id: PromotionId,
    pub promotion_name: String,
    pub discount_amount: Money,
}

/// What applying a set of promotions would do, without committing to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionPreview {
    pub result: PromotionResult,
    pub eligible: Vec<String>,
    pub ineligible: Vec<String>,
}

/// Money saved against the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Savings {
    pub amount: Money,
    /// Share of the subtotal, in percent, rounded to two places.
    pub percentage: Decimal,
}

// =============================================================================
// Calculator
// =============================================================================

/// Sums promotion discounts for a cart.
#[derive(Debug, Clone, Copy)]
pub struct DiscountCalculator {
    scale: u32,
    rules: RuleEngine,
}

impl Default for DiscountCalculator {
    fn default() -> Self {
        DiscountCalculator::new(DEFAULT_SCALE)
    }
}

impl DiscountCalculator {
    /// A calculator rounding to `scale` decimal places.
    pub fn new(scale: u32) -> Self {
        DiscountCalculator {
            scale,
            rules: RuleEngine::new(),
        }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Stacks the discounts of `promotions` in the order given.
    ///
    /// The caller is responsible for ordering (normally by priority) and
    /// for filtering; promotions that are not applicable contribute zero.
    pub fn calculate_discounts_at(
        &self,
        cart: &Cart,
        promotions: &[Promotion],
        user: &User,
        now: DateTime<Utc>,
    ) -> PromotionResult {
        let mut builder = ResultBuilder::new(cart.total_amount());

        for promotion in promotions {
            let discount = promotion.calculate_discount_at(cart, user, now);
            if discount.is_applied() {
                debug!(
                    promotion = %promotion.name(),
                    discount = %discount.amount(),
                    "Applied promotion"
                );
            }
            builder.add(promotion, discount);
        }

        builder.build(self.scale)
    }

    pub fn calculate_discounts(&self, cart: &Cart, promotions: &[Promotion], user: &User) -> PromotionResult {
        self.calculate_discounts_at(cart, promotions, user, Utc::now())
    }

    /// The discount one promotion grants, rounded.
    pub fn calculate_single_promotion_discount(&self, cart: &Cart, promotion: &Promotion, user: &User) -> Discount {
        promotion.calculate_discount(cart, user).rounded(self.scale)
    }

    /// Each promotion's individual discount, largest first.
    pub fn compare_promotion_discounts(
        &self,
        cart: &Cart,
        promotions: &[Promotion],
        user: &User,
    ) -> Vec<DiscountComparison> {
        let mut rows: Vec<DiscountComparison> = promotions
            .iter()
            .map(|p| DiscountComparison {
                promotion_id: p.id(),
                promotion_name: p.name().to_string(),
                discount_amount: self.calculate_single_promotion_discount(cart, p, user).amount(),
            })
            .collect();
        rows.sort_by(|a, b| b.discount_amount.cmp(&a.discount_amount));
        rows
    }

    /// Eligible promotions, highest precedence first, at most `max_promotions` of them.
    pub fn find_optimal_promotion_combination(
        &self,
        cart: &Cart,
        promotions: &[Promotion],
        user: &User,
        max_promotions: usize,
    ) -> PromotionResult {
        let now = Utc::now();
        let eligible = self.rules.filter_eligible_at(promotions, cart, user, now);
        let mut chosen = self.rules.sort_by_priority(&eligible);
        chosen.truncate(max_promotions);
        self.calculate_discounts_at(cart, &chosen, user, now)
    }

    /// Result plus the names of eligible and ineligible promotions.
    pub fn preview_promotion_application(
        &self,
        cart: &Cart,
        promotions: &[Promotion],
        user: &User,
    ) -> PromotionPreview {
        let now = Utc::now();
        let (eligible, ineligible): (Vec<&Promotion>, Vec<&Promotion>) = promotions
            .iter()
            .partition(|p| self.rules.is_eligible_at(p, cart, user, now));

        PromotionPreview {
            result: self.calculate_discounts_at(cart, promotions, user, now),
            eligible: eligible.iter().map(|p| p.name().to_string()).collect(),
            ineligible: ineligible.iter().map(|p| p.name().to_string()).collect(),
        }
    }

    pub fn calculate_final_amount(&self, cart: &Cart, promotions: &[Promotion], user: &User) -> Money {
        self.calculate_discounts(cart, promotions, user).final_amount
    }

    /// How much `promotions` save on `cart`, absolute and relative.
    pub fn calculate_savings(&self, cart: &Cart, promotions: &[Promotion], user: &User) -> Savings {
        let result = self.calculate_discounts(cart, promotions, user);
        let amount = result
            .subtotal
            .checked_sub(result.final_amount)
            .unwrap_or_else(Money::zero);

        let percentage = if result.subtotal.is_zero() {
            Decimal::ZERO
        } else {
            (amount.amount() / result.subtotal.amount() * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, ROUNDING)
        };

        Savings { amount, percentage }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promotion::PromotionConditions;
    use crate::testing::{amount_off, cart_totalling, percent_off, shopper};

    fn units(n: u64) -> Money {
        Money::from_units(n)
    }

    #[test]
    fn test_stacks_all_applicable_discounts() {
        let user = shopper();
        let cart = cart_totalling(100_000, &user);
        let promotions = vec![percent_off("Ten", 10, 1), amount_off("Five", 5_000, 2)];

        let result = DiscountCalculator::default().calculate_discounts(&cart, &promotions, &user);
        assert_eq!(result.total_discount, units(15_000));
        assert_eq!(result.final_amount, units(85_000));
        assert_eq!(result.applied_count(), 2);
        assert_eq!(result.applied_promotions[0].promotion_name, "Ten");
    }

    #[test]
    fn test_final_amount_never_negative() {
        let user = shopper();
        let cart = cart_totalling(15_000, &user);
        let promotions = vec![amount_off("A", 10_000, 1), amount_off("B", 10_000, 2)];

        let result = DiscountCalculator::default().calculate_discounts(&cart, &promotions, &user);
        assert_eq!(result.total_discount, units(20_000));
        assert_eq!(result.final_amount, Money::zero());
    }

    #[test]
    fn test_inactive_promotion_never_applied() {
        let user = shopper();
        let cart = cart_totalling(100_000, &user);
        let promotions = vec![percent_off("Off", 50, 1).deactivate()];

        let result = DiscountCalculator::default().calculate_discounts(&cart, &promotions, &user);
        assert!(result.applied_promotions.is_empty());
        assert_eq!(result.final_amount, units(100_000));
    }

    #[test]
    fn test_idempotent() {
        let user = shopper();
        let cart = cart_totalling(99_999, &user);
        let promotions = vec![percent_off("A", 13, 1), percent_off("B", 7, 2)];
        let calc = DiscountCalculator::default();

        assert_eq!(
            calc.calculate_discounts(&cart, &promotions, &user),
            calc.calculate_discounts(&cart, &promotions, &user)
        );
    }

    #[test]
    fn test_half_up_rounding_at_scale() {
        let user = shopper();
        // 12.5% of 99.99 = 12.49875 → 12.50
        let product = crate::product::Product::new(
            "Pen",
            crate::money::Price::new(Decimal::new(9_999, 2)).unwrap(),
            crate::types::Stock::new(5),
        )
        .unwrap();
        let cart = Cart::new(user.id)
            .add_item(&product, crate::types::Quantity::one())
            .unwrap();
        let promotion = percent_off("Eighth", 12, 1)
            .update_benefits(crate::promotion::PromotionBenefits::percentage(
                crate::money::DiscountPercentage::new(Decimal::new(125, 1)).unwrap(),
            ))
            .unwrap();

        let result = DiscountCalculator::new(2).calculate_discounts(&cart, &[promotion.clone()], &user);
        assert_eq!(result.total_discount, Money::new(Decimal::new(1_250, 2)).unwrap());
        assert_eq!(result.final_amount, Money::new(Decimal::new(8_749, 2)).unwrap());

        let whole = DiscountCalculator::new(0).calculate_discounts(&cart, &[promotion], &user);
        assert_eq!(whole.total_discount, units(12));
        assert_eq!(whole.subtotal, units(100));
    }

    #[test]
    fn test_discount_rounding_to_zero_is_not_listed() {
        let user = shopper();
        let sticker = crate::product::Product::new(
            "Sticker",
            crate::money::Price::new(Decimal::new(40, 2)).unwrap(),
            crate::types::Stock::new(5),
        )
        .unwrap();
        let cart = Cart::new(user.id)
            .add_item(&sticker, crate::types::Quantity::one())
            .unwrap();

        // 1% of 0.40 = 0.004 → 0.00
        let result = DiscountCalculator::new(2).calculate_discounts(&cart, &[percent_off("One", 1, 1)], &user);
        assert!(result.applied_promotions.is_empty());
        assert_eq!(result.total_discount, Money::zero());
        assert_eq!(result.final_amount.to_string(), "0.40");
    }

    #[test]
    fn test_compare_sorted_descending() {
        let user = shopper();
        let cart = cart_totalling(100_000, &user);
        let promotions = vec![amount_off("Small", 100, 1), percent_off("Big", 20, 2)];

        let rows = DiscountCalculator::default().compare_promotion_discounts(&cart, &promotions, &user);
        assert_eq!(rows[0].promotion_name, "Big");
        assert_eq!(rows[0].discount_amount, units(20_000));
        assert_eq!(rows[1].discount_amount, units(100));
    }

    #[test]
    fn test_optimal_combination_takes_highest_precedence() {
        let user = shopper();
        let cart = cart_totalling(100_000, &user);
        let promotions = vec![
            percent_off("Third", 30, 3),
            percent_off("First", 10, 1),
            percent_off("Second", 20, 2),
            percent_off("Off", 50, 0).deactivate(),
        ];

        let result = DiscountCalculator::default().find_optimal_promotion_combination(&cart, &promotions, &user, 2);
        let names: Vec<_> = result
            .applied_promotions
            .iter()
            .map(|a| a.promotion_name.as_str())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(result.total_discount, units(30_000));
    }

    #[test]
    fn test_preview_lists_eligibility() {
        let user = shopper();
        let cart = cart_totalling(30_000, &user);
        let gated = percent_off("Gated", 10, 1)
            .update_conditions(PromotionConditions::none().with_min_cart_amount(units(50_000)));
        let promotions = vec![gated, amount_off("Open", 1_000, 2)];

        let preview = DiscountCalculator::default().preview_promotion_application(&cart, &promotions, &user);
        assert_eq!(preview.eligible, vec!["Open"]);
        assert_eq!(preview.ineligible, vec!["Gated"]);
        assert_eq!(preview.result.final_amount, units(29_000));
    }

    #[test]
    fn test_savings() {
        let user = shopper();
        let cart = cart_totalling(100_000, &user);
        let promotions = vec![percent_off("Quarter", 25, 1)];
        let calc = DiscountCalculator::default();

        let savings = calc.calculate_savings(&cart, &promotions, &user);
        assert_eq!(savings.amount, units(25_000));
        assert_eq!(savings.percentage, Decimal::from(25));
        assert_eq!(calc.calculate_final_amount(&cart, &promotions, &user), units(75_000));

        let empty = Cart::new(user.id);
        assert_eq!(calc.calculate_savings(&empty, &promotions, &user).percentage, Decimal::ZERO);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Shape {
            Percent(i64),
            Fixed(u64),
        }

        fn shape() -> impl Strategy<Value = Shape> {
            prop_oneof![
                (0i64..=100).prop_map(Shape::Percent),
                (0u64..500_000).prop_map(Shape::Fixed),
            ]
        }

        fn build(shapes: &[Shape]) -> Vec<Promotion> {
            shapes
                .iter()
                .enumerate()
                .map(|(i, s)| match s {
                    Shape::Percent(p) => percent_off(&format!("P{}", i), *p, i as u32),
                    Shape::Fixed(a) => amount_off(&format!("F{}", i), *a, i as u32),
                })
                .collect()
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: the payable amount is never negative and never above the subtotal.
            #[test]
            fn final_amount_is_bounded(total in 0u64..1_000_000, shapes in prop::collection::vec(shape(), 0..6)) {
                let user = shopper();
                let cart = if total == 0 { Cart::new(user.id) } else { cart_totalling(total, &user) };
                let result = DiscountCalculator::default().calculate_discounts(&cart, &build(&shapes), &user);

                prop_assert!(result.final_amount >= Money::zero());
                prop_assert!(result.final_amount <= result.subtotal);
            }

            /// Property: adding one more promotion never raises the payable amount.
            #[test]
            fn extra_promotion_never_increases_final(
                total in 1u64..1_000_000,
                shapes in prop::collection::vec(shape(), 0..5),
                extra in shape(),
            ) {
                let user = shopper();
                let cart = cart_totalling(total, &user);
                let calc = DiscountCalculator::default();

                let base = build(&shapes);
                let mut more = shapes.clone();
                more.push(extra);

                let before = calc.calculate_discounts(&cart, &base, &user);
                let after = calc.calculate_discounts(&cart, &build(&more), &user);
                prop_assert!(after.final_amount <= before.final_amount);
            }

            /// Property: identical inputs give identical results.
            #[test]
            fn calculation_is_idempotent(total in 1u64..1_000_000, shapes in prop::collection::vec(shape(), 0..5)) {
                let user = shopper();
                let cart = cart_totalling(total, &user);
                let promotions = build(&shapes);
                let calc = DiscountCalculator::default();

                prop_assert_eq!(
                    calc.calculate_discounts(&cart, &promotions, &user),
                    calc.calculate_discounts(&cart, &promotions, &user)
                );
            }
        }
    }
}
