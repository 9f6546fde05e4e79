//! # User Repository

use promo_core::error::CoreResult;
use promo_core::ports::UserSource;
use promo_core::{Email, User, UserId};

use super::Table;
use crate::error::StoreResult;

/// Repository for shoppers.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    table: Table<UserId, User>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        InMemoryUserRepository {
            table: Table::new("user"),
        }
    }

    pub fn insert(&self, user: User) -> StoreResult<()> {
        self.table.insert_new(user.id, user.clone(), user.id)
    }

    /// Inserts or replaces (tier upgrades, first order placed).
    pub fn update(&self, user: User) -> StoreResult<()> {
        self.table.upsert(user.id, user)
    }

    pub fn find_by_email(&self, email: &Email) -> StoreResult<Option<User>> {
        Ok(self.table.read()?.values().find(|u| &u.email == email).cloned())
    }

    /// All users, sorted by email.
    pub fn list(&self) -> StoreResult<Vec<User>> {
        let mut users = self.table.values()?;
        users.sort_by(|a, b| a.email.as_str().cmp(b.email.as_str()));
        Ok(users)
    }
}

impl UserSource for InMemoryUserRepository {
    fn user_by_id(&self, id: UserId) -> CoreResult<Option<User>> {
        Ok(self.table.get(&id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_core::MembershipLevel;

    #[test]
    fn test_lookup_by_id_and_email() {
        let repo = InMemoryUserRepository::new();
        let email = Email::parse("Lee@Example.com").unwrap();
        let user = User::register(email.clone());
        repo.insert(user.clone()).unwrap();

        assert_eq!(repo.user_by_id(user.id).unwrap(), Some(user.clone()));
        assert_eq!(
            repo.find_by_email(&Email::parse("lee@example.com").unwrap()).unwrap(),
            Some(user)
        );
        assert_eq!(repo.user_by_id(UserId::new()).unwrap(), None);
    }

    #[test]
    fn test_update_membership() {
        let repo = InMemoryUserRepository::new();
        let user = User::register(Email::parse("kim@example.com").unwrap());
        repo.insert(user.clone()).unwrap();
        repo.update(user.upgrade_membership(MembershipLevel::Vip)).unwrap();

        let stored = repo.user_by_id(user.id).unwrap().unwrap();
        assert_eq!(stored.membership_level, MembershipLevel::Vip);
    }
}
