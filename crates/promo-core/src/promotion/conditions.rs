//! Eligibility conditions a cart/user pair must satisfy.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::money::Money;
use crate::types::{MembershipLevel, Quantity};
use crate::user::User;

/// Condition names used in diagnostics maps.
pub mod keys {
    pub const TARGET_CATEGORY: &str = "targetCategory";
    pub const MIN_CART_AMOUNT: &str = "minCartAmount";
    pub const MIN_QUANTITY: &str = "minQuantity";
    pub const TARGET_USER_LEVEL: &str = "targetUserLevel";
    pub const NEW_CUSTOMER_ONLY: &str = "newCustomerOnly";
}

/// A conjunction of optional predicates. Absent conditions always hold.
///
/// ```text
/// satisfied = category? ∧ min_amount? ∧ min_quantity? ∧ user_level? ∧ new_customer?
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromotionConditions {
    /// At least one cart line must belong to this category.
    pub target_category: Option<String>,
    /// Cart total must be at least this amount.
    pub min_cart_amount: Option<Money>,
    /// Cart must hold at least this many units.
    pub min_quantity: Option<Quantity>,
    /// User tier must be at least this level.
    pub target_user_level: Option<MembershipLevel>,
    /// Only first-time customers qualify.
    pub new_customer_only: bool,
}

/// Outcome of one present condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionCheck {
    pub key: &'static str,
    pub satisfied: bool,
    pub detail: String,
}

impl PromotionConditions {
    /// No conditions: every cart qualifies.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_target_category(mut self, category: &str) -> Self {
        self.target_category = Some(category.trim().to_string());
        self
    }

    pub fn with_min_cart_amount(mut self, amount: Money) -> Self {
        self.min_cart_amount = Some(amount);
        self
    }

    pub fn with_min_quantity(mut self, quantity: Quantity) -> Self {
        self.min_quantity = Some(quantity);
        self
    }

    pub fn with_target_user_level(mut self, level: MembershipLevel) -> Self {
        self.target_user_level = Some(level);
        self
    }

    pub fn new_customers_only(mut self) -> Self {
        self.new_customer_only = true;
        self
    }

    pub fn is_unconditional(&self) -> bool {
        *self == Self::default()
    }

    /// True when every present condition holds.
    pub fn is_satisfied_by(&self, cart: &Cart, user: &User) -> bool {
        self.checks(cart, user).iter().all(|check| check.satisfied)
    }

    /// Evaluates each present condition separately.
    pub fn checks(&self, cart: &Cart, user: &User) -> Vec<ConditionCheck> {
        let mut checks = Vec::new();

        if let Some(category) = &self.target_category {
            checks.push(ConditionCheck {
                key: keys::TARGET_CATEGORY,
                satisfied: cart.contains_category(category),
                detail: format!("cart contains category '{}'", category),
            });
        }

        if let Some(min) = self.min_cart_amount {
            let total = cart.total_amount();
            checks.push(ConditionCheck {
                key: keys::MIN_CART_AMOUNT,
                satisfied: total >= min,
                detail: format!("cart total {} >= {}", total, min),
            });
        }

        if let Some(min) = self.min_quantity {
            let total = cart.total_quantity();
            checks.push(ConditionCheck {
                key: keys::MIN_QUANTITY,
                satisfied: total >= u64::from(min.value()),
                detail: format!("cart quantity {} >= {}", total, min),
            });
        }

        if let Some(level) = self.target_user_level {
            checks.push(ConditionCheck {
                key: keys::TARGET_USER_LEVEL,
                satisfied: user.is_eligible_for(level),
                detail: format!("membership {} >= {}", user.membership_level, level),
            });
        }

        if self.new_customer_only {
            checks.push(ConditionCheck {
                key: keys::NEW_CUSTOMER_ONLY,
                satisfied: user.is_new_customer,
                detail: "user is a new customer".to_string(),
            });
        }

        checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Price;
    use crate::product::Product;
    use crate::types::{Email, Stock};

    fn cart_with(price: u64, qty: u32, category: &str, user: &User) -> Cart {
        let product = Product::new("Item", Price::from_units(price), Stock::new(100))
            .unwrap()
            .with_category(category);
        Cart::new(user.id)
            .add_item(&product, Quantity::new(qty).unwrap())
            .unwrap()
    }

    fn user() -> User {
        User::register(Email::parse("shopper@example.com").unwrap())
    }

    #[test]
    fn test_absent_conditions_are_vacuously_true() {
        let user = user();
        let cart = Cart::new(user.id);
        assert!(PromotionConditions::none().is_satisfied_by(&cart, &user));
        assert!(PromotionConditions::none().is_unconditional());
    }

    #[test]
    fn test_min_cart_amount() {
        let user = user();
        let cart = cart_with(30_000, 1, "Books", &user);
        let conditions = PromotionConditions::none().with_min_cart_amount(Money::from_units(50_000));
        assert!(!conditions.is_satisfied_by(&cart, &user));

        let cart = cart_with(25_000, 2, "Books", &user);
        assert!(conditions.is_satisfied_by(&cart, &user));
    }

    #[test]
    fn test_conjunction() {
        let user = user();
        let cart = cart_with(10_000, 3, "Books", &user);

        let conditions = PromotionConditions::none()
            .with_target_category("books")
            .with_min_quantity(Quantity::new(3).unwrap())
            .new_customers_only();
        assert!(conditions.is_satisfied_by(&cart, &user));

        let returning = user.mark_as_existing_customer();
        assert!(!conditions.is_satisfied_by(&cart, &returning));

        let wrong_category = conditions.clone().with_target_category("Electronics");
        assert!(!wrong_category.is_satisfied_by(&cart, &user));
    }

    #[test]
    fn test_user_level_condition() {
        let user = user();
        let cart = cart_with(10_000, 1, "Books", &user);
        let conditions = PromotionConditions::none().with_target_user_level(MembershipLevel::Vip);

        assert!(!conditions.is_satisfied_by(&cart, &user));
        let vip = user.upgrade_membership(MembershipLevel::Premium);
        assert!(conditions.is_satisfied_by(&cart, &vip));
    }

    #[test]
    fn test_checks_only_report_present_conditions() {
        let user = user();
        let cart = cart_with(10_000, 1, "Books", &user);
        let checks = PromotionConditions::none()
            .with_min_cart_amount(Money::from_units(1))
            .checks(&cart, &user);

        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].key, keys::MIN_CART_AMOUNT);
        assert!(checks[0].satisfied);
    }
}
