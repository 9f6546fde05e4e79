//! # Store Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Poisoned lock / bad seed JSON                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CoreError::Source ← What the engine sees through a port                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (pricer) ← Printed, non-zero exit                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use promo_core::{CoreError, ValidationError};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A writer panicked while holding the lock.
    ///
    /// ## When This Occurs
    /// - A thread panicked inside `save` or `insert`
    /// - Every later access to that repository reports this
    #[error("{repository} repository lock poisoned")]
    LockPoisoned { repository: &'static str },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a second product or user with the same id
    #[error("Duplicate {entity}: '{id}' already exists")]
    Duplicate { entity: &'static str, id: String },

    /// Promotion definitions could not be parsed.
    #[error("Invalid promotion definitions: {0}")]
    Parse(#[from] serde_json::Error),

    /// A seed or loaded entity violated a domain rule.
    #[error("Invalid seed data: {0}")]
    Invalid(#[from] ValidationError),

    /// A domain operation failed while loading.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    pub(crate) fn poisoned(repository: &'static str) -> Self {
        StoreError::LockPoisoned { repository }
    }
}

/// The engine only distinguishes "source failed" from domain errors.
impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(inner) => inner,
            StoreError::Invalid(inner) => CoreError::Validation(inner),
            other => CoreError::Source(other.to_string()),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
