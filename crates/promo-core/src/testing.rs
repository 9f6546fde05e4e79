//! Shared builders for unit tests.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::cart::Cart;
use crate::money::Price;
use crate::product::Product;
use crate::promotion::{NewPromotion, Promotion, PromotionConditions, PromotionPeriod, PromotionType};
use crate::types::{Email, Quantity, Stock};
use crate::user::User;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn shopper() -> User {
    User::register(Email::parse("shopper@example.com").unwrap())
}

/// A single-line cart whose total is `total` units.
pub fn cart_totalling(total: u64, user: &User) -> Cart {
    let product = Product::new("Widget", Price::from_units(total), Stock::new(100))
        .unwrap()
        .with_category("Gadgets");
    Cart::new(user.id).add_item(&product, Quantity::one()).unwrap()
}

fn draft(name: &str, promotion_type: PromotionType, priority: u32) -> NewPromotion {
    NewPromotion {
        name: name.to_string(),
        description: None,
        promotion_type,
        priority,
        period: PromotionPeriod::for_days(Utc::now() - Duration::days(1), 30),
        conditions: PromotionConditions::none(),
        discount_percentage: None,
        discount_amount: None,
        max_discount_amount: None,
    }
}

/// An active percentage promotion.
pub fn percent_off(name: &str, pct: i64, priority: u32) -> Promotion {
    let mut new = draft(name, PromotionType::PercentageDiscount, priority);
    new.discount_percentage = Some(Decimal::from(pct));
    Promotion::create(new).unwrap().activate()
}

/// An active fixed-amount promotion.
pub fn amount_off(name: &str, amount: u64, priority: u32) -> Promotion {
    let mut new = draft(name, PromotionType::FixedDiscount, priority);
    new.discount_amount = Some(Decimal::from(amount));
    Promotion::create(new).unwrap().activate()
}
