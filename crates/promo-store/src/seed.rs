//! # Seed Catalog
//!
//! A small, deterministic catalog for demos and end-to-end tests.
//!
//! ## What Gets Seeded
//! ```text
//! Products                         Users                   Promotions (active)
//! ───────────────────────────────  ──────────────────────  ─────────────────────────────────
//! Laptop Pro 14    100,000  Elec.  new@example.com   NEW   1 Welcome 10%      new customers
//! Wireless Mouse    15,000  Elec.  regular@…     REGULAR   2 Electronics -5,000  cat+min 50,000
//! Rust in Action    30,000  Books  vip@example.com   VIP   3 VIP 15% (cap 20,000)  VIP+
//! Coffee Beans 1kg  20,000  Groc.                          4 Free shipping     min 30,000
//! Retro Console     50,000  (inactive)                     5 Book bundle 20%   Books, 3+ units
//! ```
//!
//! Ids are fixed (see [`ids`]) so request files can reference them.
//! Promotion periods are relative to the moment of seeding.

use chrono::{DateTime, Duration, Utc};
use promo_core::money::Price;
use promo_core::promotion::{NewPromotion, PromotionConditions, PromotionPeriod, PromotionType};
use promo_core::{Email, MembershipLevel, Money, Product, Promotion, PromotionId, Quantity, Stock, User};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::StoreResult;
use crate::Store;

/// Stable identifiers of seeded entities.
pub mod ids {
    use promo_core::{ProductId, PromotionId, UserId};
    use uuid::Uuid;

    pub const LAPTOP: ProductId = ProductId::from_uuid(Uuid::from_u128(0x1001));
    pub const MOUSE: ProductId = ProductId::from_uuid(Uuid::from_u128(0x1002));
    pub const BOOK: ProductId = ProductId::from_uuid(Uuid::from_u128(0x1003));
    pub const COFFEE: ProductId = ProductId::from_uuid(Uuid::from_u128(0x1004));
    pub const RETIRED_CONSOLE: ProductId = ProductId::from_uuid(Uuid::from_u128(0x1005));

    pub const NEW_CUSTOMER: UserId = UserId::from_uuid(Uuid::from_u128(0x2001));
    pub const REGULAR_CUSTOMER: UserId = UserId::from_uuid(Uuid::from_u128(0x2002));
    pub const VIP_CUSTOMER: UserId = UserId::from_uuid(Uuid::from_u128(0x2003));

    pub const WELCOME: PromotionId = PromotionId::from_uuid(Uuid::from_u128(0x3001));
    pub const ELECTRONICS: PromotionId = PromotionId::from_uuid(Uuid::from_u128(0x3002));
    pub const VIP: PromotionId = PromotionId::from_uuid(Uuid::from_u128(0x3003));
    pub const FREE_SHIPPING: PromotionId = PromotionId::from_uuid(Uuid::from_u128(0x3004));
    pub const BOOK_BUNDLE: PromotionId = PromotionId::from_uuid(Uuid::from_u128(0x3005));
}

/// Counts of what [`seed`] inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub users: usize,
    pub promotions: usize,
}

/// Fills `store` with the demo catalog, using `now` as the reference instant.
pub fn seed_at(store: &Store, now: DateTime<Utc>) -> StoreResult<SeedSummary> {
    let products = products()?;
    let users = users()?;
    let promotions = promotions(now)?;

    let summary = SeedSummary {
        products: products.len(),
        users: users.len(),
        promotions: promotions.len(),
    };

    for product in products {
        store.products().insert(product)?;
    }
    for user in users {
        store.users().insert(user)?;
    }
    for promotion in promotions {
        store.promotions().insert(promotion)?;
    }

    info!(
        products = summary.products,
        users = summary.users,
        promotions = summary.promotions,
        "Seeded catalog"
    );
    Ok(summary)
}

pub fn seed(store: &Store) -> StoreResult<SeedSummary> {
    seed_at(store, Utc::now())
}

// =============================================================================
// Data
// =============================================================================

fn products() -> StoreResult<Vec<Product>> {
    Ok(vec![
        Product::with_id(ids::LAPTOP, "Laptop Pro 14", Price::from_units(100_000), Stock::new(10))?
            .with_category("Electronics")
            .with_brand("Northwind"),
        Product::with_id(ids::MOUSE, "Wireless Mouse", Price::from_units(15_000), Stock::new(50))?
            .with_category("Electronics")
            .with_brand("Northwind"),
        Product::with_id(ids::BOOK, "Rust in Action", Price::from_units(30_000), Stock::new(25))?
            .with_category("Books")
            .with_description("Systems programming, hands-on")?,
        Product::with_id(ids::COFFEE, "Coffee Beans 1kg", Price::from_units(20_000), Stock::new(3))?
            .with_category("Grocery"),
        Product::with_id(ids::RETIRED_CONSOLE, "Retro Console", Price::from_units(50_000), Stock::new(2))?
            .with_category("Electronics")
            .deactivate(),
    ])
}

fn users() -> StoreResult<Vec<User>> {
    let newcomer = User {
        id: ids::NEW_CUSTOMER,
        ..User::register(Email::parse("new@example.com")?)
    };
    Ok(vec![
        newcomer,
        User::existing(
            ids::REGULAR_CUSTOMER,
            Email::parse("regular@example.com")?,
            MembershipLevel::Regular,
        ),
        User::existing(
            ids::VIP_CUSTOMER,
            Email::parse("vip@example.com")?,
            MembershipLevel::Vip,
        ),
    ])
}

fn draft(name: &str, promotion_type: PromotionType, priority: u32, period: PromotionPeriod) -> NewPromotion {
    NewPromotion {
        name: name.to_string(),
        description: None,
        promotion_type,
        priority,
        period,
        conditions: PromotionConditions::none(),
        discount_percentage: None,
        discount_amount: None,
        max_discount_amount: None,
    }
}

fn create(id: PromotionId, draft: NewPromotion) -> StoreResult<Promotion> {
    Ok(Promotion::create_with_id(id, draft)?.activate())
}

fn promotions(now: DateTime<Utc>) -> StoreResult<Vec<Promotion>> {
    let period = PromotionPeriod::for_days(now - Duration::days(30), 365);

    let mut welcome = draft("Welcome 10%", PromotionType::PercentageDiscount, 1, period);
    welcome.discount_percentage = Some(Decimal::from(10));
    welcome.conditions = PromotionConditions::none().new_customers_only();

    let mut electronics = draft("Electronics 5,000 off", PromotionType::FixedDiscount, 2, period);
    electronics.discount_amount = Some(Decimal::from(5_000));
    electronics.conditions = PromotionConditions::none()
        .with_target_category("Electronics")
        .with_min_cart_amount(Money::from_units(50_000));

    let mut vip = draft("VIP 15%", PromotionType::PercentageDiscount, 3, period);
    vip.discount_percentage = Some(Decimal::from(15));
    vip.max_discount_amount = Some(Decimal::from(20_000));
    vip.conditions = PromotionConditions::none().with_target_user_level(MembershipLevel::Vip);

    let mut shipping = draft("Free shipping", PromotionType::FreeShipping, 4, period);
    shipping.discount_amount = Some(Decimal::from(3_000));
    shipping.conditions = PromotionConditions::none().with_min_cart_amount(Money::from_units(30_000));

    let mut bundle = draft("Book bundle 20%", PromotionType::PercentageDiscount, 5, period);
    bundle.discount_percentage = Some(Decimal::from(20));
    bundle.description = Some("Three or more books".to_string());
    bundle.conditions = PromotionConditions::none()
        .with_target_category("Books")
        .with_min_quantity(Quantity::new(3)?);

    Ok(vec![
        create(ids::WELCOME, welcome)?,
        create(ids::ELECTRONICS, electronics)?,
        create(ids::VIP, vip)?,
        create(ids::FREE_SHIPPING, shipping)?,
        create(ids::BOOK_BUNDLE, bundle)?,
    ])
}
