//! # Money Module
//!
//! Provides the monetary value types used by every pricing computation:
//! [`Money`], [`Price`], [`DiscountPercentage`] and [`Discount`].
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Stacked percentage discounts multiply the damage:                      │
//! │    99,900 × 12.5% + 99,900 × 7.5% → drifts by fractions of a unit      │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    Exact base-10 arithmetic, rounded half-up exactly once when a        │
//! │    PromotionResult is produced                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Range
//! A `Money` holds an amount in `[0, Money::MAX]`. Every constructor
//! validates, and arithmetic that could leave the range is explicit:
//! [`Money::checked_add`], [`Money::checked_sub`] and [`Money::times`]
//! report the failure instead of wrapping or panicking, so the *caller*
//! decides how to clamp or reject.
//!
//! ## Usage
//! ```rust
//! use promo_core::money::Money;
//!
//! let subtotal = Money::from_units(100_000);
//! let discount = Money::from_units(120_000);
//!
//! // Clamp at the call site, never inside Money
//! let payable = subtotal.checked_sub(discount).unwrap_or_else(Money::zero);
//! assert!(payable.is_zero());
//! ```

use std::fmt;
use std::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::Quantity;

/// Rounding strategy applied whenever an amount is materialised.
///
/// Half-up (away from zero): 0.5 → 1, 1.5 → 2, 2.5 → 3.
pub const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

// =============================================================================
// Money
// =============================================================================

/// A non-negative decimal monetary amount.
///
/// ## Where Money Is Used
/// ```text
/// Product.price ──► CartItem.unit_price ──► CartItem.total_price
///                                               │
///                                               ▼
///                     Cart.total_amount ──► Discount ──► PromotionResult
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Largest representable amount: `u64::MAX` whole units.
    pub const MAX: Money = Money(Decimal::from_parts(u32::MAX, u32::MAX, 0, false, 0));

    /// Creates a Money value, rejecting negative amounts and amounts above [`Money::MAX`].
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// assert!(Money::new(Decimal::new(1099, 2)).is_ok());
    /// assert!(Money::new(Decimal::new(-1, 0)).is_err());
    /// assert!(Money::new(Decimal::MAX).is_err());
    /// ```
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        Self::checked("amount", amount)
    }

    fn checked(field: &str, amount: Decimal) -> Result<Self, ValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::negative(field));
        }
        if amount > Money::MAX.0 {
            return Err(too_large(field));
        }
        Ok(Money(amount))
    }

    /// Creates a Money value from whole currency units.
    ///
    /// Infallible: an unsigned input can never be negative.
    #[inline]
    pub fn from_units(units: u64) -> Self {
        Money(Decimal::from(units))
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        !self.0.is_zero()
    }

    /// Adds `other`, returning `None` if the sum exceeds [`Money::MAX`].
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0
            .checked_add(other.0)
            .filter(|sum| *sum <= Money::MAX.0)
            .map(Money)
    }

    /// Adds `other`, stopping at [`Money::MAX`].
    pub fn saturating_add(&self, other: Money) -> Money {
        self.checked_add(other).unwrap_or(Money::MAX)
    }

    /// Subtracts `other`, returning `None` if the result would be negative.
    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        if other.0 > self.0 {
            None
        } else {
            Some(Money(self.0 - other.0))
        }
    }

    /// Subtracts `other`, failing if the result would be negative.
    pub fn subtract(&self, other: Money) -> Result<Money, ValidationError> {
        self.checked_sub(other)
            .ok_or_else(|| ValidationError::negative("amount"))
    }

    /// Multiplies by a non-negative scalar.
    pub fn multiply(&self, factor: Decimal) -> Result<Money, ValidationError> {
        if factor.is_sign_negative() && !factor.is_zero() {
            return Err(ValidationError::negative("factor"));
        }
        let product = self.0.checked_mul(factor).ok_or_else(|| too_large("amount"))?;
        Self::checked("amount", product)
    }

    /// Multiplies by a quantity (line total calculation).
    ///
    /// ## Errors
    /// `OutOfRange` when the line total exceeds [`Money::MAX`].
    pub fn times(&self, quantity: Quantity) -> Result<Money, ValidationError> {
        let total = self
            .0
            .checked_mul(Decimal::from(quantity.value()))
            .ok_or_else(|| too_large("line_total"))?;
        Self::checked("line_total", total)
    }

    /// Returns `percentage`% of this amount, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::{DiscountPercentage, Money};
    /// use rust_decimal::Decimal;
    ///
    /// let total = Money::from_units(100_000);
    /// let ten = DiscountPercentage::new(Decimal::from(10)).unwrap();
    /// assert_eq!(total.percentage_of(ten), Money::from_units(10_000));
    /// ```
    pub fn percentage_of(&self, percentage: DiscountPercentage) -> Money {
        match self.0.checked_mul(percentage.value()) {
            Some(scaled) => Money(scaled / ONE_HUNDRED),
            None => Money(self.0 / ONE_HUNDRED * percentage.value()),
        }
    }

    /// Rounds to `scale` decimal places using half-up rounding.
    ///
    /// The result always carries exactly `scale` places (`100000` at scale 2
    /// displays as `100000.00`) unless the padded value would not fit.
    pub fn round_to(&self, scale: u32) -> Money {
        let mut rounded = self.0.round_dp_with_strategy(scale, ROUNDING);
        rounded.rescale(scale);
        Money(rounded)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

fn too_large(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: "0".to_string(),
        max: Money::MAX.to_string(),
    }
}

// =============================================================================
// Price
// =============================================================================

/// The selling price of a product.
///
/// Same arithmetic as [`Money`], but a distinct type so a product price
/// cannot be passed where a cart total or discount is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Money);

impl Price {
    /// Creates a price, rejecting negative amounts and amounts above [`Money::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        Money::checked("price", amount).map(Price)
    }

    /// Creates a price from whole currency units.
    #[inline]
    pub fn from_units(units: u64) -> Self {
        Price(Money::from_units(units))
    }

    /// Returns the price as plain money.
    #[inline]
    pub const fn money(&self) -> Money {
        self.0
    }

    /// Line total for `quantity` units at this price.
    #[inline]
    pub fn times(&self, quantity: Quantity) -> Result<Money, ValidationError> {
        self.0.times(quantity)
    }
}

impl From<Money> for Price {
    fn from(money: Money) -> Self {
        Price(money)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Discount Percentage
// =============================================================================

/// A percentage in the closed range [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DiscountPercentage(Decimal);

impl DiscountPercentage {
    /// Creates a percentage, rejecting values outside [0, 100].
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value < Decimal::ZERO || value > ONE_HUNDRED {
            return Err(ValidationError::OutOfRange {
                field: "discount_percentage".to_string(),
                min: "0".to_string(),
                max: "100".to_string(),
            });
        }
        Ok(DiscountPercentage(value))
    }

    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Discount amount this percentage yields on `amount`, unrounded.
    #[inline]
    pub fn apply_to(&self, amount: Money) -> Money {
        amount.percentage_of(*self)
    }
}

impl TryFrom<Decimal> for DiscountPercentage {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        DiscountPercentage::new(value)
    }
}

impl From<DiscountPercentage> for Decimal {
    fn from(pct: DiscountPercentage) -> Self {
        pct.0
    }
}

impl fmt::Display for DiscountPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A discount amount, tagged with whether anything was actually applied.
///
/// `Discount::zero()` means "no discount". Discounts from several
/// promotions are additive ([`Discount::combine`]); rounding is deferred
/// until the final result is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Discount {
    amount: Money,
    applied: bool,
}

impl Discount {
    /// The "no discount" value.
    #[inline]
    pub const fn zero() -> Self {
        Discount {
            amount: Money::zero(),
            applied: false,
        }
    }

    /// A discount of `amount`; applied iff the amount is positive.
    pub fn of(amount: Money) -> Self {
        Discount {
            amount,
            applied: amount.is_positive(),
        }
    }

    #[inline]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    #[inline]
    pub const fn is_applied(&self) -> bool {
        self.applied
    }

    /// Sums two discounts, saturating at [`Money::MAX`].
    pub fn combine(self, other: Discount) -> Discount {
        Discount {
            amount: self.amount.saturating_add(other.amount),
            applied: self.applied || other.applied,
        }
    }

    /// Limits the discount to at most `cap`.
    pub fn capped_at(self, cap: Money) -> Discount {
        if self.amount > cap {
            Discount::of(cap)
        } else {
            self
        }
    }

    /// Rounds the amount half-up to `scale` places.
    pub fn rounded(self, scale: u32) -> Discount {
        Discount::of(self.amount.round_to(scale))
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::zero()
    }
}

impl Add for Discount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.combine(other)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
