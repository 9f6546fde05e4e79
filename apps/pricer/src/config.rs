//! # Pricer Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PRICER_CONFLICT_POLICY=exclusive                                   │
//! │     PRICER_ROUNDING_SCALE=0                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/pricer/pricer.toml (Linux)                               │
//! │     ~/Library/Application Support/com.promo.pricer/pricer.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     stacking, scale 2, seeded catalog, "info" logging                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pricer.toml
//! [pricing]
//! rounding_scale = 2
//! conflict_policy = "stack"   # stack | exclusive
//! max_promotions = 3          # optional
//!
//! [catalog]
//! seed = true
//! promotions_file = "promotions.json"   # optional
//!
//! [logging]
//! filter = "info,promo_core=debug"
//! json = false
//! ```

use std::path::{Path, PathBuf};

use promo_core::ConflictPolicy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// Largest accepted `rounding_scale`.
pub const MAX_ROUNDING_SCALE: u32 = 10;

// =============================================================================
// Sections
// =============================================================================

/// How carts are priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Decimal places results are rounded to (half-up).
    #[serde(default = "default_rounding_scale")]
    pub rounding_scale: u32,

    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    /// Upper bound on promotions applied to one cart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_promotions: Option<usize>,
}

fn default_rounding_scale() -> u32 {
    promo_core::calculator::DEFAULT_SCALE
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            rounding_scale: default_rounding_scale(),
            conflict_policy: ConflictPolicy::default(),
            max_promotions: None,
        }
    }
}

/// What the in-memory store starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Load the built-in demo catalog.
    #[serde(default = "default_true")]
    pub seed: bool,

    /// Extra promotion definitions (JSON array) loaded on startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotions_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            seed: true,
            promotions_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

// =============================================================================
// Pricer Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricerConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl PricerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pricer.toml)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// file at the default location is not.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_path.is_some();
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) if explicit => {
                return Err(AppError::ConfigLoadFailed(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading pricer config from file");
        let contents = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file, creating parent directories.
    ///
    /// Returns the path written.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| AppError::io(&path, e))?;

        info!(?path, "Pricer config saved");
        Ok(path)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.pricing.rounding_scale > MAX_ROUNDING_SCALE {
            return Err(AppError::InvalidConfig(format!(
                "rounding_scale must be at most {}, got {}",
                MAX_ROUNDING_SCALE, self.pricing.rounding_scale
            )));
        }

        if self.pricing.max_promotions == Some(0) {
            return Err(AppError::InvalidConfig(
                "max_promotions must be greater than 0".into(),
            ));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(AppError::InvalidConfig("logging.filter must not be empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `PRICER_*` overrides from `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(scale) = lookup("PRICER_ROUNDING_SCALE") {
            match scale.parse::<u32>() {
                Ok(s) => {
                    debug!(scale = s, "Overriding rounding scale from environment");
                    self.pricing.rounding_scale = s;
                }
                Err(_) => warn!(value = %scale, "Ignoring invalid PRICER_ROUNDING_SCALE"),
            }
        }

        if let Some(policy) = lookup("PRICER_CONFLICT_POLICY") {
            match policy.parse::<ConflictPolicy>() {
                Ok(p) => {
                    debug!(policy = %p, "Overriding conflict policy from environment");
                    self.pricing.conflict_policy = p;
                }
                Err(_) => warn!(value = %policy, "Unknown conflict policy in environment"),
            }
        }

        if let Some(max) = lookup("PRICER_MAX_PROMOTIONS") {
            if max.trim().is_empty() || max.eq_ignore_ascii_case("none") {
                self.pricing.max_promotions = None;
            } else {
                match max.parse::<usize>() {
                    Ok(m) => self.pricing.max_promotions = Some(m),
                    Err(_) => warn!(value = %max, "Ignoring invalid PRICER_MAX_PROMOTIONS"),
                }
            }
        }

        if let Some(seed) = lookup("PRICER_SEED_CATALOG") {
            match parse_bool(&seed) {
                Some(b) => self.catalog.seed = b,
                None => warn!(value = %seed, "Ignoring invalid PRICER_SEED_CATALOG"),
            }
        }

        if let Some(file) = lookup("PRICER_PROMOTIONS_FILE") {
            self.catalog.promotions_file = Some(PathBuf::from(file));
        }

        if let Some(filter) = lookup("PRICER_LOG_FILTER") {
            self.logging.filter = filter;
        }

        if let Some(json) = lookup("PRICER_LOG_JSON") {
            match parse_bool(&json) {
                Some(b) => self.logging.json = b,
                None => warn!(value = %json, "Ignoring invalid PRICER_LOG_JSON"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "promo", "pricer")
            .map(|dirs| dirs.config_dir().join("pricer.toml"))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
