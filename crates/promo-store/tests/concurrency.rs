//! Shared pricing under concurrent load.
//!
//! One service instance is shared across tasks while the catalog is being
//! edited; every result must still satisfy the pricing bounds.

use std::sync::Arc;

use promo_core::ports::PromotionRepository;
use promo_core::service::{CartLineRequest, PricingRequest};
use promo_core::Money;
use promo_store::seed::{self, ids};
use promo_store::Store;

fn laptop_and_mice(user: promo_core::UserId) -> PricingRequest {
    PricingRequest {
        user_id: user,
        cart_id: None,
        items: vec![
            CartLineRequest::new(ids::LAPTOP, 1),
            CartLineRequest::new(ids::MOUSE, 2),
        ],
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pricing_is_deterministic() {
    let store = Store::new();
    seed::seed(&store).unwrap();
    let service = Arc::new(store.pricing_service(store.promotion_engine()));

    let mut handles = Vec::new();
    for i in 0..32 {
        let service = Arc::clone(&service);
        let user = if i % 2 == 0 { ids::NEW_CUSTOMER } else { ids::VIP_CUSTOMER };
        handles.push(tokio::spawn(async move {
            (user, service.price_cart(&laptop_and_mice(user)).unwrap())
        }));
    }

    for handle in handles {
        let (user, result) = handle.await.unwrap();
        let expected = if user == ids::NEW_CUSTOMER {
            // 10% welcome + 5,000 electronics
            Money::from_units(18_000)
        } else {
            // 15% VIP (19,500, under the cap) + 5,000 electronics
            Money::from_units(24_500)
        };
        assert_eq!(result.total_discount, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pricing_while_catalog_changes() {
    let store = Store::new();
    seed::seed(&store).unwrap();
    let service = Arc::new(store.pricing_service(store.promotion_engine()));
    let subtotal = Money::from_units(130_000);

    let writer = {
        let promotions = Arc::clone(store.promotions());
        tokio::spawn(async move {
            for round in 0..50 {
                let welcome = promotions.find_by_name("Welcome 10%").unwrap().unwrap();
                let next = if round % 2 == 0 { welcome.deactivate() } else { welcome.activate() };
                promotions.save(next).unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let readers: Vec<_> = (0..16)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                for _ in 0..20 {
                    let result = service.price_cart(&laptop_and_mice(ids::NEW_CUSTOMER)).unwrap();
                    assert_eq!(result.subtotal, subtotal);
                    assert!(result.final_amount <= result.subtotal);
                    // either with or without the welcome discount, never partial
                    assert!(
                        result.total_discount == Money::from_units(18_000)
                            || result.total_discount == Money::from_units(5_000)
                    );
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}
