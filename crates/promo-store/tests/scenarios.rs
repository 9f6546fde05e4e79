//! End-to-end pricing scenarios through the store, services and engine.

use chrono::{Duration, Utc};
use promo_core::money::Price;
use promo_core::promotion::{NewPromotion, PromotionConditions, PromotionPeriod, PromotionType};
use promo_core::service::{CartLineRequest, PricingRequest};
use promo_core::{ConflictPolicy, CoreError, Email, ErrorKind, Money, Product, PromotionId, Stock, User};
use promo_store::seed::{self, ids};
use promo_store::Store;
use rust_decimal::Decimal;

// =============================================================================
// Helpers
// =============================================================================

struct Shop {
    store: Store,
    user: User,
}

/// A store with one shopper and one product priced at `price`.
fn shop_with_product(price: u64) -> (Shop, Product) {
    let store = Store::new();
    let user = User::existing(
        promo_core::UserId::new(),
        Email::parse("scenario@example.com").unwrap(),
        promo_core::MembershipLevel::Regular,
    );
    store.users().insert(user.clone()).unwrap();

    let product = Product::new("Item", Price::from_units(price), Stock::new(10)).unwrap();
    store.products().insert(product.clone()).unwrap();
    (Shop { store, user }, product)
}

fn draft(name: &str, promotion_type: PromotionType) -> NewPromotion {
    NewPromotion {
        name: name.to_string(),
        description: None,
        promotion_type,
        priority: 1,
        period: PromotionPeriod::for_days(Utc::now() - Duration::days(1), 30),
        conditions: PromotionConditions::none(),
        discount_percentage: None,
        discount_amount: None,
        max_discount_amount: None,
    }
}

fn add_active(shop: &Shop, new: NewPromotion) -> PromotionId {
    let catalog = shop.store.promotion_catalog();
    let created = catalog.create_promotion(new).unwrap();
    catalog.activate(created.id()).unwrap();
    created.id()
}

fn one_of(shop: &Shop, product: &Product) -> PricingRequest {
    PricingRequest {
        user_id: shop.user.id,
        cart_id: None,
        items: vec![CartLineRequest::new(product.id(), 1)],
    }
}

fn units(n: u64) -> Money {
    Money::from_units(n)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_a_percentage_without_cap() {
    let (shop, product) = shop_with_product(100_000);
    let mut ten = draft("Ten percent", PromotionType::PercentageDiscount);
    ten.discount_percentage = Some(Decimal::from(10));
    add_active(&shop, ten);

    let service = shop.store.pricing_service(shop.store.promotion_engine());
    let result = service.price_cart(&one_of(&shop, &product)).unwrap();

    assert_eq!(result.subtotal, units(100_000));
    assert_eq!(result.total_discount, units(10_000));
    assert_eq!(result.final_amount, units(90_000));
}

#[test]
fn scenario_b_percentage_with_cap() {
    let (shop, product) = shop_with_product(100_000);
    let mut capped = draft("Ten percent capped", PromotionType::PercentageDiscount);
    capped.discount_percentage = Some(Decimal::from(10));
    capped.max_discount_amount = Some(Decimal::from(5_000));
    add_active(&shop, capped);

    let service = shop.store.pricing_service(shop.store.promotion_engine());
    let result = service.price_cart(&one_of(&shop, &product)).unwrap();

    assert_eq!(result.total_discount, units(5_000));
    assert_eq!(result.final_amount, units(95_000));
}

#[test]
fn scenario_c_minimum_not_met() {
    let (shop, product) = shop_with_product(30_000);
    let mut gated = draft("Big basket", PromotionType::PercentageDiscount);
    gated.discount_percentage = Some(Decimal::from(10));
    gated.conditions = PromotionConditions::none().with_min_cart_amount(units(50_000));
    add_active(&shop, gated);

    let service = shop.store.pricing_service(shop.store.promotion_engine());
    let result = service.price_cart(&one_of(&shop, &product)).unwrap();

    assert!(result.applied_promotions.is_empty());
    assert_eq!(result.total_discount, Money::zero());
    assert_eq!(result.final_amount, units(30_000));
}

#[test]
fn scenario_d_stacking() {
    let (shop, product) = shop_with_product(100_000);
    let mut ten = draft("Ten percent", PromotionType::PercentageDiscount);
    ten.discount_percentage = Some(Decimal::from(10));
    let mut five_k = draft("Five thousand off", PromotionType::FixedDiscount);
    five_k.discount_amount = Some(Decimal::from(5_000));
    five_k.priority = 2;
    add_active(&shop, ten);
    add_active(&shop, five_k);

    let service = shop.store.pricing_service(shop.store.promotion_engine());
    let result = service.price_cart(&one_of(&shop, &product)).unwrap();

    assert_eq!(result.applied_promotions.len(), 2);
    assert_eq!(result.total_discount, units(15_000));
    assert_eq!(result.final_amount, units(85_000));
}

#[test]
fn scenario_d_exclusive_policy_keeps_highest_precedence() {
    let (shop, product) = shop_with_product(100_000);
    let mut ten = draft("Ten percent", PromotionType::PercentageDiscount);
    ten.discount_percentage = Some(Decimal::from(10));
    let mut five_k = draft("Five thousand off", PromotionType::FixedDiscount);
    five_k.discount_amount = Some(Decimal::from(5_000));
    five_k.priority = 2;
    add_active(&shop, ten);
    add_active(&shop, five_k);

    let engine = shop
        .store
        .promotion_engine()
        .with_conflict_policy(ConflictPolicy::Exclusive);
    let result = shop
        .store
        .pricing_service(engine)
        .price_cart(&one_of(&shop, &product))
        .unwrap();

    assert_eq!(result.applied_promotions.len(), 1);
    assert_eq!(result.applied_promotions[0].promotion_name, "Ten percent");
    assert_eq!(result.final_amount, units(90_000));
}

#[test]
fn scenario_e_fixed_discount_clamped() {
    let (shop, product) = shop_with_product(15_000);
    let mut big = draft("Twenty thousand off", PromotionType::FixedDiscount);
    big.discount_amount = Some(Decimal::from(20_000));
    add_active(&shop, big);

    let service = shop.store.pricing_service(shop.store.promotion_engine());
    let result = service.price_cart(&one_of(&shop, &product)).unwrap();

    assert_eq!(result.total_discount, units(15_000));
    assert_eq!(result.final_amount, Money::zero());
}

#[test]
fn inactive_promotion_never_applied() {
    let (shop, product) = shop_with_product(100_000);
    let mut half = draft("Half off", PromotionType::PercentageDiscount);
    half.discount_percentage = Some(Decimal::from(50));
    let id = shop.store.promotion_catalog().create_promotion(half).unwrap().id();

    let service = shop.store.pricing_service(shop.store.promotion_engine());
    let result = service.price_cart(&one_of(&shop, &product)).unwrap();
    assert!(result.applied_promotions.is_empty());

    let err = service
        .price_cart_with_promotion(&one_of(&shop, &product), id)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

// =============================================================================
// Seed catalog walk-throughs
// =============================================================================

fn seeded() -> Store {
    let store = Store::new();
    seed::seed(&store).unwrap();
    store
}

#[test]
fn new_customer_gets_welcome_and_electronics() {
    let store = seeded();
    let service = store.pricing_service(store.promotion_engine());
    let request = PricingRequest {
        user_id: ids::NEW_CUSTOMER,
        cart_id: None,
        items: vec![
            CartLineRequest::new(ids::LAPTOP, 1),
            CartLineRequest::new(ids::MOUSE, 2),
        ],
    };

    // 130,000 subtotal: 10% welcome + 5,000 electronics; free shipping adds nothing
    let result = service.price_cart(&request).unwrap();
    assert_eq!(result.subtotal, units(130_000));
    assert_eq!(result.total_discount, units(18_000));
    assert_eq!(result.final_amount, units(112_000));
    let ids: Vec<_> = result.applied_promotions.iter().map(|a| a.promotion_id).collect();
    assert_eq!(ids, vec![ids::WELCOME, ids::ELECTRONICS]);
}

#[test]
fn vip_discount_is_capped() {
    let store = seeded();
    let service = store.pricing_service(store.promotion_engine());
    let request = PricingRequest {
        user_id: ids::VIP_CUSTOMER,
        cart_id: None,
        items: vec![CartLineRequest::new(ids::LAPTOP, 2)],
    };

    // 15% of 200,000 = 30,000, capped at 20,000; plus 5,000 electronics
    let result = service.price_cart(&request).unwrap();
    assert_eq!(result.total_discount, units(25_000));
    assert_eq!(result.final_amount, units(175_000));
}

#[test]
fn book_bundle_requires_three_books() {
    let store = seeded();
    let service = store.pricing_service(store.promotion_engine());
    let mut request = PricingRequest {
        user_id: ids::REGULAR_CUSTOMER,
        cart_id: None,
        items: vec![CartLineRequest::new(ids::BOOK, 2)],
    };
    assert!(!service.price_cart(&request).unwrap().has_discount());

    request.items = vec![CartLineRequest::new(ids::BOOK, 3)];
    let result = service.price_cart(&request).unwrap();
    assert_eq!(result.total_discount, units(18_000));
    assert_eq!(result.applied_promotions[0].promotion_id, ids::BOOK_BUNDLE);
}

#[test]
fn retired_and_unknown_products_fail() {
    let store = seeded();
    let service = store.pricing_service(store.promotion_engine());

    let retired = PricingRequest {
        user_id: ids::REGULAR_CUSTOMER,
        cart_id: None,
        items: vec![CartLineRequest::new(ids::RETIRED_CONSOLE, 1)],
    };
    assert!(matches!(
        service.price_cart(&retired).unwrap_err(),
        CoreError::ProductInactive { .. }
    ));

    let unknown = PricingRequest {
        user_id: ids::REGULAR_CUSTOMER,
        cart_id: None,
        items: vec![CartLineRequest::new(promo_core::ProductId::new(), 1)],
    };
    assert_eq!(service.price_cart(&unknown).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn validate_flags_low_coffee_stock() {
    let store = seeded();
    let service = store.pricing_service(store.promotion_engine());
    let request = PricingRequest {
        user_id: ids::REGULAR_CUSTOMER,
        cart_id: None,
        items: vec![CartLineRequest::new(ids::COFFEE, 2)],
    };

    let report = service.validate_cart(&request).unwrap();
    assert!(report.is_valid);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("Coffee Beans 1kg"));
    assert_eq!(report.subtotal, units(40_000));
}

#[test]
fn duplicate_promotion_name_conflicts() {
    let store = seeded();
    let mut again = draft("welcome 10%", PromotionType::PercentageDiscount);
    again.discount_percentage = Some(Decimal::from(10));

    let err = store.promotion_catalog().create_promotion(again).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn loaded_definitions_cannot_reuse_names() {
    let store = seeded();
    let json = r#"[
        { "name": "Welcome 10%", "promotionType": "PERCENTAGE_DISCOUNT",
          "period": { "start": "2020-01-01T00:00:00Z", "end": "2999-01-01T00:00:00Z" },
          "discountPercentage": "10" },
        { "name": "Twin", "promotionType": "FIXED_DISCOUNT",
          "period": { "start": "2020-01-01T00:00:00Z", "end": "2999-01-01T00:00:00Z" },
          "discountAmount": "100" },
        { "name": "twin", "promotionType": "FIXED_DISCOUNT",
          "period": { "start": "2020-01-01T00:00:00Z", "end": "2999-01-01T00:00:00Z" },
          "discountAmount": "200" }
    ]"#;

    let err = CoreError::from(store.promotions().load_json(json).unwrap_err());
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(store.promotions().list().unwrap().len(), 5);
}
