//! # Pricer Error Types
//!
//! Everything the command-line host can fail with.
//!
//! ```text
//! ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────────┐
//! │  Configuration   │  │  Input / Output  │  │  Pricing                 │
//! │                  │  │                  │  │                          │
//! │  InvalidConfig   │  │  Io              │  │  Core (CoreError)        │
//! │  ConfigLoadFailed│  │  Json            │  │  Store (StoreError)      │
//! │  ConfigSaveFailed│  │  Logging         │  │                          │
//! └──────────────────┘  └──────────────────┘  └──────────────────────────┘
//! ```

use promo_core::CoreError;
use promo_store::StoreError;
use thiserror::Error;

/// Result type alias for the pricer app.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid pricer configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Input / Output Errors
    // =========================================================================
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    // =========================================================================
    // Pricing Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::ConfigSaveFailed(err.to_string())
    }
}

impl AppError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidConfig(_) | AppError::ConfigLoadFailed(_) | AppError::ConfigSaveFailed(_)
        )
    }

    /// Process exit code for this error.
    ///
    /// `2` for bad input or configuration, `1` for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Core(err) if err.kind() == promo_core::ErrorKind::Unavailable => 1,
            AppError::Core(_) | AppError::Json(_) => 2,
            _ if self.is_config_error() => 2,
            _ => 1,
        }
    }
}
