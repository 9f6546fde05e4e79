//! # Error Types
//!
//! Domain-specific error types for promo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  promo-core errors (this file)                                          │
//! │  ├── CoreError        - Domain errors (not found, state, conflict)      │
//! │  └── ValidationError  - Value-object / input invariant failures         │
//! │                                                                         │
//! │  pricer errors (app)                                                    │
//! │  └── AppError         - Config, I/O, and wrapped CoreError              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → exit status            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Kinds
//! Every [`CoreError`] maps onto one [`ErrorKind`] so callers (HTTP layers,
//! CLIs) can translate failures without matching every variant:
//!
//! | Kind              | Variants                                                   |
//! |-------------------|------------------------------------------------------------|
//! | `NotFound`        | `NotFound`, `NotInCart`                                    |
//! | `InvalidArgument` | `Validation`                                               |
//! | `InvalidState`    | `InvalidState`, `InsufficientStock`, `ProductInactive`, `PromotionIneligible` |
//! | `Conflict`        | `Conflict`                                                 |
//! | `Unavailable`     | `Source`                                                   |

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are all detected locally and synchronously; nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    ///
    /// ## When This Occurs
    /// - Product, user, cart, or promotion id unknown to its source
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The product is not a line of the cart being changed.
    #[error("Product {product_id} is not in cart {cart_id}")]
    NotInCart { cart_id: String, product_id: String },

    /// Input or value-object invariant violation (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Generic state violation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Insufficient stock to satisfy the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Keyboard", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: u32,
        requested: u32,
    },

    /// Attempt to put an inactive product in a cart.
    #[error("Product {product} is not active")]
    ProductInactive { product: String },

    /// The rule engine rejected a promotion that was explicitly requested.
    #[error("Promotion {promotion} is not applicable: {}", .failed_rules.join("; "))]
    PromotionIneligible {
        promotion: String,
        failed_rules: Vec<String>,
    },

    /// Unique constraint violation (e.g. duplicate promotion name).
    #[error("Duplicate {field}: '{value}' already exists")]
    Conflict { field: &'static str, value: String },

    /// An external source (repository adapter) failed.
    #[error("Source unavailable: {0}")]
    Source(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } | CoreError::NotInCart { .. } => ErrorKind::NotFound,
            CoreError::Validation(_) => ErrorKind::InvalidArgument,
            CoreError::InvalidState(_)
            | CoreError::InsufficientStock { .. }
            | CoreError::ProductInactive { .. }
            | CoreError::PromotionIneligible { .. } => ErrorKind::InvalidState,
            CoreError::Conflict { .. } => ErrorKind::Conflict,
            CoreError::Source(_) => ErrorKind::Unavailable,
        }
    }
}

/// Coarse error categories exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InvalidState,
    Conflict,
    Unavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by value-object constructors and creation-time checks. These
/// always surface as [`ErrorKind::InvalidArgument`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g. malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields are inconsistent with each other.
    #[error("{0}")]
    Inconsistent(String),
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn negative(field: &str) -> Self {
        ValidationError::Negative {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
