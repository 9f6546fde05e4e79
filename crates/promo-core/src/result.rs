//! # Pricing Result
//!
//! The value client applications render:
//!
//! ```text
//! {
//!   "subtotal": "100000.00",
//!   "totalDiscount": "15000.00",
//!   "finalAmount": "85000.00",
//!   "appliedPromotions": [
//!     { "promotionId": "…", "promotionName": "Spring Sale", "discountAmount": "10000.00" },
//!     { "promotionId": "…", "promotionName": "Welcome",     "discountAmount": "5000.00" }
//!   ]
//! }
//! ```
//!
//! Amounts are serialised as decimal strings so no precision is lost in
//! JavaScript clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Discount, Money};
use crate::promotion::Promotion;
use crate::types::PromotionId;

/// One promotion that contributed a non-zero discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedPromotion {
    #[ts(as = "String")]
    pub promotion_id: PromotionId,
    pub promotion_name: String,
    #[ts(as = "String")]
    pub discount_amount: Money,
}

/// Outcome of pricing a cart.
///
/// ## Invariants
/// - `final_amount = max(0, subtotal − total_discount)`
/// - every entry in `applied_promotions` has a positive discount
/// - all amounts are rounded half-up to the same scale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PromotionResult {
    #[ts(as = "String")]
    pub subtotal: Money,
    #[ts(as = "String")]
    pub total_discount: Money,
    #[ts(as = "String")]
    pub final_amount: Money,
    pub applied_promotions: Vec<AppliedPromotion>,
}

impl PromotionResult {
    /// Result for a cart no promotion touched.
    pub fn undiscounted(subtotal: Money, scale: u32) -> Self {
        ResultBuilder::new(subtotal).build(scale)
    }

    pub fn has_discount(&self) -> bool {
        self.total_discount.is_positive()
    }

    pub fn applied_count(&self) -> usize {
        self.applied_promotions.len()
    }
}

/// Accumulates unrounded discounts and materialises a [`PromotionResult`].
///
/// Rounding happens once, in [`ResultBuilder::build`]: the total discount
/// is the rounded sum of the exact discounts, never a sum of rounded parts.
/// An entry whose own amount rounds to zero is dropped from the list but
/// still counts towards the total.
#[derive(Debug, Clone)]
pub(crate) struct ResultBuilder {
    subtotal: Money,
    total: Discount,
    applied: Vec<(PromotionId, String, Money)>,
}

impl ResultBuilder {
    pub(crate) fn new(subtotal: Money) -> Self {
        ResultBuilder {
            subtotal,
            total: Discount::zero(),
            applied: Vec::new(),
        }
    }

    /// Adds `discount` from `promotion`; zero discounts are not recorded.
    pub(crate) fn add(&mut self, promotion: &Promotion, discount: Discount) {
        if !discount.is_applied() {
            return;
        }
        self.total = self.total.combine(discount);
        self.applied
            .push((promotion.id(), promotion.name().to_string(), discount.amount()));
    }

    pub(crate) fn build(self, scale: u32) -> PromotionResult {
        let subtotal = self.subtotal.round_to(scale);
        let total_discount = self.total.rounded(scale).amount();
        let final_amount = subtotal
            .checked_sub(total_discount)
            .unwrap_or_else(Money::zero);

        PromotionResult {
            subtotal,
            total_discount,
            final_amount,
            applied_promotions: self
                .applied
                .into_iter()
                .map(|(promotion_id, promotion_name, amount)| AppliedPromotion {
                    promotion_id,
                    promotion_name,
                    discount_amount: amount.round_to(scale),
                })
                .filter(|entry| entry.discount_amount.is_positive())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::DiscountPercentage;
    use crate::testing::percent_off;
    use rust_decimal::Decimal;

    #[test]
    fn test_camel_case_shape() {
        let result = PromotionResult::undiscounted(Money::from_units(100), 2);
        let json = serde_json::to_value(&result).unwrap();

        assert!(json.get("totalDiscount").is_some());
        assert!(json.get("finalAmount").is_some());
        assert!(json["appliedPromotions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_total_is_rounded_once() {
        let promotion = percent_off("P", 10, 1);
        let third = Money::new(Decimal::new(3_333, 3)).unwrap(); // 3.333

        let mut builder = ResultBuilder::new(Money::from_units(100));
        builder.add(&promotion, Discount::of(third));
        builder.add(&promotion, Discount::of(third));
        builder.add(&promotion, Discount::of(third));
        let result = builder.build(2);

        // 9.999 → 10.00, whereas 3 × 3.33 would give 9.99
        assert_eq!(result.total_discount, Money::new(Decimal::new(1000, 2)).unwrap());
        assert_eq!(result.applied_promotions[0].discount_amount, Money::new(Decimal::new(333, 2)).unwrap());
        assert_eq!(result.final_amount, Money::from_units(90));
    }

    #[test]
    fn test_entries_rounding_to_zero_are_dropped() {
        let one_percent = percent_off("One percent", 1, 1);
        let subtotal = Money::new(Decimal::new(40, 2)).unwrap(); // 0.40

        let mut builder = ResultBuilder::new(subtotal);
        let discount = DiscountPercentage::new(Decimal::ONE).unwrap().apply_to(subtotal);
        builder.add(&one_percent, Discount::of(discount));
        let result = builder.build(2);

        // 0.004 rounds to 0.00
        assert_eq!(result.applied_count(), 0);
        assert!(!result.has_discount());
        assert_eq!(result.final_amount, subtotal);
    }

    #[test]
    fn test_small_entries_still_count_towards_total() {
        let promotion = percent_off("P", 10, 1);
        let tiny = Money::new(Decimal::new(4, 3)).unwrap(); // 0.004

        let mut builder = ResultBuilder::new(Money::from_units(1));
        builder.add(&promotion, Discount::of(tiny));
        builder.add(&promotion, Discount::of(tiny));
        let result = builder.build(2);

        // 0.008 → 0.01 in total, each 0.004 entry → 0.00 and is hidden
        assert_eq!(result.total_discount, Money::new(Decimal::new(1, 2)).unwrap());
        assert_eq!(result.applied_count(), 0);
    }

    #[test]
    fn test_amounts_share_the_result_scale() {
        let promotion = percent_off("Welcome", 15, 1);
        let mut builder = ResultBuilder::new(Money::from_units(100_000));
        builder.add(&promotion, Discount::of(Money::from_units(15_000)));

        let json = serde_json::to_value(builder.build(2)).unwrap();
        assert_eq!(json["subtotal"], "100000.00");
        assert_eq!(json["totalDiscount"], "15000.00");
        assert_eq!(json["finalAmount"], "85000.00");
        assert_eq!(json["appliedPromotions"][0]["discountAmount"], "15000.00");
    }

    #[test]
    fn test_zero_discount_not_recorded() {
        let promotion = percent_off("P", 10, 1);
        let mut builder = ResultBuilder::new(Money::from_units(100));
        builder.add(&promotion, Discount::zero());

        let result = builder.build(2);
        assert_eq!(result.applied_count(), 0);
        assert!(!result.has_discount());
    }
}
