//! # Domain Types
//!
//! Small self-validating value types shared by the catalog and promotion
//! models.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Value Types                                     │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Identifiers   │   │    Quantity     │   │     Stock       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  ProductId      │   │  u32, > 0       │   │  u32, >= 0      │       │
//! │  │  CartId         │   │  add / subtract │   │  has_enough     │       │
//! │  │  UserId         │   └─────────────────┘   │  reduce/increase│       │
//! │  │  PromotionId    │                          └─────────────────┘       │
//! │  └─────────────────┘   ┌─────────────────┐   ┌─────────────────┐       │
//! │                        │     Email       │   │ MembershipLevel │       │
//! │                        │  ─────────────  │   │  ─────────────  │       │
//! │                        │  local@dom.tld  │   │  NEW=1 .. 4     │       │
//! │                        │  <= 254 chars   │   │  PREMIUM        │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every type here is immutable: operations return a new value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::validate_email;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random (v4) identifier.
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                $name(uuid)
            }

            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map($name)
                    .map_err(|_| ValidationError::InvalidFormat {
                        field: stringify!($name).to_string(),
                        reason: "must be a valid UUID".to_string(),
                    })
            }
        }
    };
}

entity_id!(
    /// Identifies a catalog product.
    ProductId
);
entity_id!(
    /// Identifies a shopping cart.
    CartId
);
entity_id!(
    /// Identifies a user.
    UserId
);
entity_id!(
    /// Identifies a promotion.
    PromotionId
);

// =============================================================================
// Quantity
// =============================================================================

/// A strictly positive item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Creates a quantity, rejecting zero.
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        Ok(Quantity(value))
    }

    /// Creates a quantity from a signed request value.
    ///
    /// Request payloads carry signed integers; anything `<= 0` is rejected.
    pub fn from_signed(value: i64) -> Result<Self, ValidationError> {
        if value <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        let value = u32::try_from(value).map_err(|_| ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: "1".to_string(),
            max: u32::MAX.to_string(),
        })?;
        Ok(Quantity(value))
    }

    /// A quantity of one.
    pub const fn one() -> Self {
        Quantity(1)
    }

    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Sums two quantities.
    pub fn add(&self, other: Quantity) -> Result<Quantity, ValidationError> {
        self.0
            .checked_add(other.0)
            .map(Quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: "1".to_string(),
                max: u32::MAX.to_string(),
            })
    }

    /// Subtracts `other`; the result must still be positive.
    pub fn subtract(&self, other: Quantity) -> Result<Quantity, ValidationError> {
        match self.0.checked_sub(other.0) {
            Some(rest) if rest > 0 => Ok(Quantity(rest)),
            _ => Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }),
        }
    }
}

impl TryFrom<u32> for Quantity {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Inventory on hand. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stock(u32);

impl Stock {
    pub const fn new(quantity: u32) -> Self {
        Stock(quantity)
    }

    pub const fn empty() -> Self {
        Stock(0)
    }

    #[inline]
    pub const fn quantity(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when at least `requested` units are on hand.
    #[inline]
    pub fn has_enough(&self, requested: Quantity) -> bool {
        self.0 >= requested.value()
    }

    /// Removes `requested` units.
    ///
    /// ## Errors
    /// `InsufficientStock` (InvalidState) when fewer than `requested` units
    /// are on hand. `product` only labels the error.
    pub fn reduce(&self, requested: Quantity, product: &str) -> CoreResult<Stock> {
        if !self.has_enough(requested) {
            return Err(CoreError::InsufficientStock {
                product: product.to_string(),
                available: self.0,
                requested: requested.value(),
            });
        }
        Ok(Stock(self.0 - requested.value()))
    }

    /// Adds `amount` units.
    pub fn increase(&self, amount: Quantity) -> Result<Stock, ValidationError> {
        self.0
            .checked_add(amount.value())
            .map(Stock)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: "0".to_string(),
                max: u32::MAX.to_string(),
            })
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Email
// =============================================================================

/// A normalised (trimmed, lower-cased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalised = raw.trim().to_lowercase();
        validate_email(&normalised)?;
        Ok(Email(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after `@`.
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or_default()
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Membership Level
// =============================================================================

/// Customer tier. Ordered by [`MembershipLevel::priority`].
///
/// | Level   | Priority |
/// |---------|----------|
/// | New     | 1        |
/// | Regular | 2        |
/// | Vip     | 3        |
/// | Premium | 4        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipLevel {
    #[default]
    New,
    Regular,
    Vip,
    Premium,
}

impl MembershipLevel {
    pub const ALL: [MembershipLevel; 4] = [
        MembershipLevel::New,
        MembershipLevel::Regular,
        MembershipLevel::Vip,
        MembershipLevel::Premium,
    ];

    pub const fn priority(&self) -> u8 {
        match self {
            MembershipLevel::New => 1,
            MembershipLevel::Regular => 2,
            MembershipLevel::Vip => 3,
            MembershipLevel::Premium => 4,
        }
    }

    pub fn from_priority(priority: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.priority() == priority)
    }

    /// True when this tier meets or exceeds `required`.
    #[inline]
    pub const fn is_eligible_for(&self, required: MembershipLevel) -> bool {
        self.priority() >= required.priority()
    }

    /// The next tier up, if any.
    pub fn next(&self) -> Option<Self> {
        Self::from_priority(self.priority() + 1)
    }
}

impl fmt::Display for MembershipLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            MembershipLevel::New => "NEW",
            MembershipLevel::Regular => "REGULAR",
            MembershipLevel::Vip => "VIP",
            MembershipLevel::Premium => "PREMIUM",
        };
        f.write_str(code)
    }
}

impl FromStr for MembershipLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(MembershipLevel::New),
            "regular" => Ok(MembershipLevel::Regular),
            "vip" => Ok(MembershipLevel::Vip),
            "premium" => Ok(MembershipLevel::Premium),
            other => Err(ValidationError::InvalidFormat {
                field: "membership_level".to_string(),
                reason: format!("unknown level '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
