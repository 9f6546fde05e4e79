//! # Validation Module
//!
//! Input validation utilities shared by the value types and entities.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (HTTP handler, CLI)                                   │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Request shape                                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Value-object constructors                                    │
//! │  ├── Money >= 0, Quantity > 0, Percentage in [0,100]                   │
//! │  └── THIS MODULE: text and format rules                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Use cases                                                    │
//! │  ├── Duplicate promotion names (Conflict)                              │
//! │  └── Cart validation reports                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use promo_core::validation::{validate_product_name, validate_email};
//!
//! assert!(validate_product_name("Mechanical Keyboard").is_ok());
//! assert!(validate_email("jane@example.com").is_ok());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum product name length.
pub const MAX_PRODUCT_NAME_LEN: usize = 100;

/// Maximum product description length.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum promotion name length.
pub const MAX_PROMOTION_NAME_LEN: usize = 100;

/// Maximum email length (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that `value` is non-blank and at most `max` characters.
///
/// Length is counted in characters, not bytes, so multi-byte names
/// (e.g. Korean product names) are measured the way users see them.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }

    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an optional free-text field: may be absent, but never too long.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be blank
/// - At most 100 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_PRODUCT_NAME_LEN)
}

/// Validates a promotion name.
pub fn validate_promotion_name(name: &str) -> ValidationResult<()> {
    validate_required_text("promotion name", name, MAX_PROMOTION_NAME_LEN)
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be blank, at most 254 characters
/// - Exactly one `@`, non-empty local part
/// - Domain has at least one dot, no empty labels, labels are
///   alphanumeric or `-`
///
/// This is a shape check, not full RFC 5322 parsing.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.trim().is_empty() {
        return Err(ValidationError::required("email"));
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must contain exactly one '@' after a local part"));
    }

    if local.chars().any(char::is_whitespace) {
        return Err(invalid("local part must not contain whitespace"));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid("domain must contain a dot"));
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    if !labels_ok {
        return Err(invalid("domain labels must be alphanumeric"));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Mechanical Keyboard").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(100)).is_ok());
        assert!(validate_product_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        // 100 Hangul syllables are 300 bytes but still a valid name
        assert!(validate_product_name(&"가".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_optional_text() {
        assert!(validate_optional_text("description", None, 500).is_ok());
        assert!(validate_optional_text("description", Some("short"), 500).is_ok());
        assert!(validate_optional_text("description", Some(&"x".repeat(501)), 500).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.co.kr").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("jane").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("jane@example").is_err());
        assert!(validate_email("jane@@example.com").is_err());
        assert!(validate_email("jane@exa mple.com").is_err());
        assert!(validate_email("jane@.com").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(250))).is_err());
    }
}
