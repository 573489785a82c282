//! # Cart Configuration
//!
//! Configuration for the cart store and its storage.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MARKETPLACE_STORAGE_KEY=@GoMarketplace:products                    │
//! │     MARKETPLACE_ZERO_QUANTITY=retain                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/marketplace/cart.toml (Linux)                            │
//! │     ~/Library/Application Support/com.gomarketplace.marketplace/...    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     key "@GoMarketplace:products", R$ formatting, prune at zero        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! key = "@GoMarketplace:products"
//! database_path = "/var/lib/marketplace/marketplace.db"
//!
//! [currency]
//! symbol = "R$"
//! decimal_separator = ","
//! thousands_separator = "."
//! symbol_spacing = false
//!
//! [persistence]
//! coalesce_window_ms = 0
//!
//! [cart]
//! zero_quantity = "prune"   # prune | retain
//! ```

use marketplace_core::{CurrencyFormat, ZeroQuantityPolicy, DEFAULT_STORAGE_KEY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CartError, CartResult};

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key holding the serialized line item list.
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// SQLite file. `None` means the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_storage_key(),
            database_path: None,
        }
    }
}

// =============================================================================
// Persistence Settings
// =============================================================================

/// Write-behind tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// How long the writer waits after a change before writing, so that a
    /// burst of taps produces one write. 0 writes as soon as possible.
    #[serde(default)]
    pub coalesce_window_ms: u64,
}

impl PersistenceSettings {
    /// The coalesce window as a duration.
    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }
}

// =============================================================================
// Cart Settings
// =============================================================================

/// Cart behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSettings {
    /// What happens to a line decremented to zero.
    #[serde(default)]
    pub zero_quantity: ZeroQuantityPolicy,
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storage key and database location.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Display format for the cart total.
    #[serde(default)]
    pub currency: CurrencyFormat,

    /// Background writer settings.
    #[serde(default)]
    pub persistence: PersistenceSettings,

    /// Cart rules.
    #[serde(default)]
    pub cart: CartSettings,
}

impl CartConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`cart.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document; missing sections take their defaults.
    pub fn from_toml(contents: &str) -> CartResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(CartError::InvalidConfig(
                "storage.key must not be empty".into(),
            ));
        }

        if self.currency.thousands_separator == Some(self.currency.decimal_separator) {
            return Err(CartError::InvalidConfig(format!(
                "currency separators must differ, both are '{}'",
                self.currency.decimal_separator
            )));
        }

        Ok(())
    }

    /// Applies `MARKETPLACE_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("MARKETPLACE_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(path) = lookup("MARKETPLACE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(symbol) = lookup("MARKETPLACE_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }

        if let Some(policy) = lookup("MARKETPLACE_ZERO_QUANTITY") {
            match policy.parse::<ZeroQuantityPolicy>() {
                Ok(parsed) => self.cart.zero_quantity = parsed,
                Err(e) => warn!(policy = %policy, "Ignoring {}", e),
            }
        }

        if let Some(window) = lookup("MARKETPLACE_COALESCE_MS") {
            match window.parse::<u64>() {
                Ok(ms) => self.persistence.coalesce_window_ms = ms,
                Err(_) => warn!(value = %window, "Ignoring non-numeric MARKETPLACE_COALESCE_MS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    /// The SQLite file to open: configured path, else the platform data dir.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join("marketplace.db"))
        })
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "gomarketplace", "marketplace")
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the storage key.
    pub fn storage_key(&self) -> &str {
        &self.storage.key
    }

    /// Returns the zero-quantity policy.
    pub fn zero_quantity(&self) -> ZeroQuantityPolicy {
        self.cart.zero_quantity
    }
}
