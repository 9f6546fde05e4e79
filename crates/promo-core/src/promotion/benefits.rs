//! Reward shape of a promotion.
//!
//! ## Discount Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  compute_discount(benefits, cart_total)                                 │
//! │                                                                         │
//! │  Reward::Percentage(p) ──► cart_total × p / 100                         │
//! │  Reward::Fixed(a)      ──► min(a, cart_total)                           │
//! │  no reward             ──► Discount::zero()                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  max_discount_amount?  ──► min(discount, cap)                           │
//! │                                                                         │
//! │  Result is unrounded; rounding happens once in the calculator.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::{Discount, DiscountPercentage, Money};

/// How much a promotion takes off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Reward {
    /// Percentage of the cart total.
    Percentage(DiscountPercentage),
    /// Fixed amount off, never more than the cart total.
    Fixed(Money),
}

/// The reward plus an optional cap.
///
/// The "exactly one of percentage / fixed" rule is enforced when a
/// promotion is created, not here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionBenefits {
    pub reward: Option<Reward>,
    pub max_discount_amount: Option<Money>,
}

impl PromotionBenefits {
    pub fn percentage(percentage: DiscountPercentage) -> Self {
        PromotionBenefits {
            reward: Some(Reward::Percentage(percentage)),
            max_discount_amount: None,
        }
    }

    pub fn fixed(amount: Money) -> Self {
        PromotionBenefits {
            reward: Some(Reward::Fixed(amount)),
            max_discount_amount: None,
        }
    }

    pub fn with_max_discount(mut self, cap: Money) -> Self {
        self.max_discount_amount = Some(cap);
        self
    }

    pub fn discount_percentage(&self) -> Option<DiscountPercentage> {
        match self.reward {
            Some(Reward::Percentage(p)) => Some(p),
            _ => None,
        }
    }

    pub fn discount_amount(&self) -> Option<Money> {
        match self.reward {
            Some(Reward::Fixed(a)) => Some(a),
            _ => None,
        }
    }

    /// See [`compute_discount`].
    pub fn compute_discount(&self, cart_total: Money) -> Discount {
        compute_discount(self, cart_total)
    }
}

/// Turns a benefit into a discount against `cart_total`.
pub fn compute_discount(benefits: &PromotionBenefits, cart_total: Money) -> Discount {
    let raw = match benefits.reward {
        Some(Reward::Percentage(pct)) => Discount::of(pct.apply_to(cart_total)),
        Some(Reward::Fixed(amount)) => Discount::of(amount.min(cart_total)),
        None => return Discount::zero(),
    };

    match benefits.max_discount_amount {
        Some(cap) => raw.capped_at(cap),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn pct(value: i64) -> DiscountPercentage {
        DiscountPercentage::new(Decimal::from(value)).unwrap()
    }

    #[test]
    fn test_percentage_discount() {
        let d = PromotionBenefits::percentage(pct(10)).compute_discount(Money::from_units(100_000));
        assert_eq!(d.amount(), Money::from_units(10_000));
        assert!(d.is_applied());
    }

    #[test]
    fn test_percentage_discount_with_cap() {
        let benefits = PromotionBenefits::percentage(pct(10)).with_max_discount(Money::from_units(5_000));
        let d = benefits.compute_discount(Money::from_units(100_000));
        assert_eq!(d.amount(), Money::from_units(5_000));
    }

    #[test]
    fn test_fixed_discount_clamped_to_total() {
        let d = PromotionBenefits::fixed(Money::from_units(20_000)).compute_discount(Money::from_units(15_000));
        assert_eq!(d.amount(), Money::from_units(15_000));
    }

    #[test]
    fn test_no_reward_is_zero() {
        let d = PromotionBenefits::default().compute_discount(Money::from_units(100));
        assert_eq!(d, Discount::zero());
    }

    #[test]
    fn test_zero_cart_yields_unapplied_discount() {
        let d = PromotionBenefits::fixed(Money::from_units(5_000)).compute_discount(Money::zero());
        assert!(!d.is_applied());
    }

    #[test]
    fn test_accessors() {
        let b = PromotionBenefits::fixed(Money::from_units(1));
        assert_eq!(b.discount_amount(), Some(Money::from_units(1)));
        assert_eq!(b.discount_percentage(), None);
    }
}
