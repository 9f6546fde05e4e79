//! # User
//!
//! The shopper a cart is priced for. Only the membership tier and the
//! new-customer flag matter to promotion rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, MembershipLevel, UserId};

/// A registered shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub membership_level: MembershipLevel,
    /// True until the user completes a first order.
    pub is_new_customer: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Registers a new customer at the `New` tier.
    pub fn register(email: Email) -> Self {
        User {
            id: UserId::new(),
            email,
            membership_level: MembershipLevel::New,
            is_new_customer: true,
            created_at: Utc::now(),
        }
    }

    /// An existing (returning) customer at `level`.
    pub fn existing(id: UserId, email: Email, level: MembershipLevel) -> Self {
        User {
            id,
            email,
            membership_level: level,
            is_new_customer: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_eligible_for(&self, required: MembershipLevel) -> bool {
        self.membership_level.is_eligible_for(required)
    }

    pub fn upgrade_membership(&self, level: MembershipLevel) -> User {
        User {
            membership_level: level,
            ..self.clone()
        }
    }

    pub fn mark_as_existing_customer(&self) -> User {
        User {
            is_new_customer: false,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_defaults() {
        let user = User::register(Email::parse("jane@example.com").unwrap());
        assert_eq!(user.membership_level, MembershipLevel::New);
        assert!(user.is_new_customer);
    }

    #[test]
    fn test_transitions_return_new_user() {
        let user = User::register(Email::parse("jane@example.com").unwrap());
        let vip = user.upgrade_membership(MembershipLevel::Vip).mark_as_existing_customer();

        assert_eq!(user.membership_level, MembershipLevel::New);
        assert!(vip.is_eligible_for(MembershipLevel::Regular));
        assert!(!vip.is_new_customer);
        assert_eq!(vip.id, user.id);
    }
}
