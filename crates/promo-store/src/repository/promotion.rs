//! # Promotion Repository
//!
//! Backs both the engine (as a [`PromotionSource`]) and authoring (as a
//! [`PromotionRepository`]).
//!
//! ## Ordering
//! `active_promotions_ordered_by_priority` sorts by priority number, then
//! by creation time, so equal-priority promotions come out in a stable
//! order regardless of `HashMap` iteration.

use std::collections::HashSet;

use promo_core::error::{CoreError, CoreResult};
use promo_core::ports::{PromotionRepository, PromotionSource};
use promo_core::promotion::NewPromotion;
use promo_core::{Promotion, PromotionId};
use tracing::debug;

use super::Table;
use crate::error::{StoreError, StoreResult};

/// Repository for promotion definitions.
#[derive(Debug)]
pub struct InMemoryPromotionRepository {
    table: Table<PromotionId, Promotion>,
}

impl Default for InMemoryPromotionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPromotionRepository {
    pub fn new() -> Self {
        InMemoryPromotionRepository {
            table: Table::new("promotion"),
        }
    }

    /// Adds a promotion; fails if the id is already taken.
    pub fn insert(&self, promotion: Promotion) -> StoreResult<()> {
        self.table
            .insert_new(promotion.id(), promotion.clone(), promotion.id())
    }

    /// Parses a JSON array of promotion definitions and stores them active.
    ///
    /// Returns how many were loaded. Nothing is stored if any entry fails
    /// validation or reuses a name (case-insensitively) already in the
    /// store or earlier in the same array.
    pub fn load_json(&self, json: &str) -> StoreResult<usize> {
        let drafts: Vec<NewPromotion> = serde_json::from_str(json)?;
        let promotions = drafts
            .into_iter()
            .map(|draft| Promotion::create(draft).map(|p| p.activate()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = self.table.write()?;
        let mut names: HashSet<String> = rows.values().map(|p| name_key(p.name())).collect();
        for promotion in &promotions {
            if rows.contains_key(&promotion.id()) {
                return Err(StoreError::Duplicate {
                    entity: "promotion",
                    id: promotion.id().to_string(),
                });
            }
            if !names.insert(name_key(promotion.name())) {
                return Err(CoreError::Conflict {
                    field: "name",
                    value: promotion.name().to_string(),
                }
                .into());
            }
        }

        let count = promotions.len();
        rows.extend(promotions.into_iter().map(|p| (p.id(), p)));
        debug!(count, "Loaded promotion definitions");
        Ok(count)
    }

    /// Every promotion, active or not, in priority order.
    pub fn list(&self) -> StoreResult<Vec<Promotion>> {
        let mut promotions = self.table.values()?;
        sort_by_precedence(&mut promotions);
        Ok(promotions)
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn sort_by_precedence(promotions: &mut [Promotion]) {
    promotions.sort_by(|a, b| {
        a.priority()
            .cmp(&b.priority())
            .then_with(|| a.created_at().cmp(&b.created_at()))
            .then_with(|| a.id().cmp(&b.id()))
    });
}

impl PromotionSource for InMemoryPromotionRepository {
    fn active_promotions_ordered_by_priority(&self) -> CoreResult<Vec<Promotion>> {
        let mut active: Vec<Promotion> = self
            .table
            .read()?
            .values()
            .filter(|p| p.is_active())
            .cloned()
            .collect();
        sort_by_precedence(&mut active);
        Ok(active)
    }

    fn promotion_by_id(&self, id: PromotionId) -> CoreResult<Option<Promotion>> {
        Ok(self.table.get(&id)?)
    }
}

impl PromotionRepository for InMemoryPromotionRepository {
    fn save(&self, promotion: Promotion) -> CoreResult<()> {
        Ok(self.table.upsert(promotion.id(), promotion)?)
    }

    fn find_by_name(&self, name: &str) -> CoreResult<Option<Promotion>> {
        let key = name_key(name);
        Ok(self
            .table
            .read()?
            .values()
            .find(|p| name_key(p.name()) == key)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_core::ErrorKind;

    const DEFINITIONS: &str = r#"[
        {
            "name": "Late",
            "promotionType": "FIXED_DISCOUNT",
            "priority": 5,
            "period": { "start": "2020-01-01T00:00:00Z", "end": "2999-01-01T00:00:00Z" },
            "discountAmount": "500"
        },
        {
            "name": "Early",
            "promotionType": "PERCENTAGE_DISCOUNT",
            "priority": 1,
            "period": { "start": "2020-01-01T00:00:00Z", "end": "2999-01-01T00:00:00Z" },
            "conditions": { "minCartAmount": "1000" },
            "discountPercentage": "10"
        }
    ]"#;

    #[test]
    fn test_load_json_and_order() {
        let repo = InMemoryPromotionRepository::new();
        assert_eq!(repo.load_json(DEFINITIONS).unwrap(), 2);

        let active = repo.active_promotions_ordered_by_priority().unwrap();
        let names: Vec<_> = active.iter().map(Promotion::name).collect();
        assert_eq!(names, vec!["Early", "Late"]);
    }

    #[test]
    fn test_inactive_excluded_from_source() {
        let repo = InMemoryPromotionRepository::new();
        repo.load_json(DEFINITIONS).unwrap();
        let early = repo.find_by_name("early").unwrap().unwrap();
        repo.save(early.deactivate()).unwrap();

        let active = repo.active_promotions_ordered_by_priority().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(repo.list().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_definition_stores_nothing() {
        let json = r#"[
            { "name": "Ok", "promotionType": "FIXED_DISCOUNT",
              "period": { "start": "2020-01-01T00:00:00Z", "end": "2021-01-01T00:00:00Z" },
              "discountAmount": "5" },
            { "name": "Both", "promotionType": "FIXED_DISCOUNT",
              "period": { "start": "2020-01-01T00:00:00Z", "end": "2021-01-01T00:00:00Z" },
              "discountAmount": "5", "discountPercentage": "5" }
        ]"#;
        let repo = InMemoryPromotionRepository::new();

        assert!(matches!(repo.load_json(json), Err(StoreError::Invalid(_))));
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_names_store_nothing() {
        let repo = InMemoryPromotionRepository::new();
        repo.load_json(DEFINITIONS).unwrap();

        // "twin" repeats "Twin" within the same file
        let twins = r#"[
            { "name": "Twin", "promotionType": "FIXED_DISCOUNT",
              "period": { "start": "2020-01-01T00:00:00Z", "end": "2999-01-01T00:00:00Z" },
              "discountAmount": "5" },
            { "name": "twin", "promotionType": "FIXED_DISCOUNT",
              "period": { "start": "2020-01-01T00:00:00Z", "end": "2999-01-01T00:00:00Z" },
              "discountAmount": "7" }
        ]"#;
        let err = repo.load_json(twins).unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::Conflict { field: "name", .. })));
        assert_eq!(CoreError::from(err).kind(), ErrorKind::Conflict);
        assert_eq!(repo.list().unwrap().len(), 2);
        assert!(repo.find_by_name("twin").unwrap().is_none());

        // "EARLY" clashes with a stored promotion
        let clash = r#"[
            { "name": "Fresh", "promotionType": "FIXED_DISCOUNT",
              "period": { "start": "2020-01-01T00:00:00Z", "end": "2999-01-01T00:00:00Z" },
              "discountAmount": "5" },
            { "name": " EARLY ", "promotionType": "FIXED_DISCOUNT",
              "period": { "start": "2020-01-01T00:00:00Z", "end": "2999-01-01T00:00:00Z" },
              "discountAmount": "5" }
        ]"#;
        assert!(matches!(
            repo.load_json(clash),
            Err(StoreError::Core(CoreError::Conflict { .. }))
        ));
        assert_eq!(repo.list().unwrap().len(), 2);
        assert!(repo.find_by_name("Fresh").unwrap().is_none());
    }

    #[test]
    fn test_malformed_json() {
        let repo = InMemoryPromotionRepository::new();
        assert!(matches!(repo.load_json("{"), Err(StoreError::Parse(_))));
    }
}
