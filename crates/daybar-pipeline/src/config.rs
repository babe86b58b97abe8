//! Layered pipeline configuration.
//!
//! Settings are resolved from built-in defaults, an optional TOML file and
//! the environment, in that order. Command-line flags are applied last by the
//! binary by assigning fields directly.
//!
//! ```toml
//! ticker = "AAPL"
//! page_limit = 5000
//! span = "1 day"
//!
//! [window]
//! from = "2025-10-01"
//! to = "2025-10-02"
//!
//! [provider]
//! api_key = "..."
//!
//! [store]
//! database_url = "postgres://localhost/market"
//! table = "stock_prices"
//!
//! [audit]
//! enabled = true
//! dir = "audit"
//! ```

use chrono::NaiveDate;
use daybar_fetch::{AuditLog, ClientConfig};
use daybar_store::{DEFAULT_TABLE, TableName};
use daybar_types::{BarSpan, DateRange, Ticker};
use serde::Deserialize;
use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the ticker.
pub const ENV_TICKER: &str = "DAYBAR_TICKER";
/// Environment variable supplying the provider API key.
pub const ENV_API_KEY: &str = "POLYGON_API_KEY";
/// Environment variable supplying the store connection string.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Default bars requested per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 5_000;
/// Largest page size the provider accepts.
pub const MAX_PAGE_LIMIT: u32 = 50_000;

const DEFAULT_LIMIT: NonZeroU32 = match NonZeroU32::new(DEFAULT_PAGE_LIMIT) {
    Some(limit) => limit,
    None => panic!("default page limit must be non-zero"),
};

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required setting has no value.
    #[error("Missing required setting '{0}'")]
    Missing(&'static str),

    /// A setting has an unusable value.
    #[error("Invalid setting '{field}': {reason}")]
    Invalid {
        /// Setting name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Which dates to extract.
///
/// With both `from` and `to` the window is explicit. With only `from` it runs
/// to today. Otherwise it is the `lookback_days` days ending on `to` (or
/// today).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    /// First day (inclusive).
    pub from: Option<NaiveDate>,
    /// Last day (inclusive).
    pub to: Option<NaiveDate>,
    /// Window length in days when `from` is not set.
    pub lookback_days: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            lookback_days: 1,
        }
    }
}

impl WindowConfig {
    /// Resolves the window against the current UTC date.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is empty or inverted.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            field: "window",
            reason,
        };

        let range = match (self.from, self.to) {
            (Some(from), to) => DateRange::new(from, to.unwrap_or(today)),
            (None, to) => {
                if self.lookback_days == 0 {
                    return Err(invalid("lookback_days must be at least 1".to_string()));
                }
                DateRange::trailing(to.unwrap_or(today), self.lookback_days)
            }
        };
        range.map_err(|e| invalid(e.to_string()))
    }
}

/// Provider connection settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    /// Base URL of the REST API.
    pub base_url: String,
    /// API key.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry attempts for rate-limited requests.
    pub max_retries: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            base_url: client.base_url,
            api_key: None,
            timeout_secs: client.timeout.as_secs(),
            max_retries: client.max_retries,
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl ProviderSettings {
    /// Builds the HTTP client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the timeout is zero.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(ConfigError::Missing("provider.api_key"))?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "provider.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(ClientConfig {
            base_url: self.base_url.clone(),
            api_key,
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            ..Default::default()
        })
    }
}

/// Destination store settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Destination table.
    pub table: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("table", &self.table)
            .finish()
    }
}

impl StoreSettings {
    /// Returns the connection string.
    ///
    /// # Errors
    ///
    /// Returns an error if none is configured.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("store.database_url"))
    }

    /// Returns the validated destination table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is not a plain SQL identifier.
    pub fn table_name(&self) -> Result<TableName, ConfigError> {
        TableName::new(self.table.as_str()).map_err(|e| ConfigError::Invalid {
            field: "store.table",
            reason: e.to_string(),
        })
    }
}

/// Audit log settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditSettings {
    /// Whether extracted batches are written to the audit log.
    pub enabled: bool,
    /// Directory holding the per-ticker files.
    pub dir: PathBuf,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("."),
        }
    }
}

impl AuditSettings {
    /// Returns the audit log, or `None` when disabled.
    #[must_use]
    pub fn audit_log(&self) -> Option<AuditLog> {
        self.enabled.then(|| AuditLog::new(&self.dir))
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Instrument symbol.
    pub ticker: Option<String>,
    /// Date window.
    pub window: WindowConfig,
    /// Bars requested per page.
    pub page_limit: u32,
    /// Bar span, e.g. `"1 day"`.
    pub span: String,
    /// Provider settings.
    pub provider: ProviderSettings,
    /// Store settings.
    pub store: StoreSettings,
    /// Audit log settings.
    pub audit: AuditSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ticker: None,
            window: WindowConfig::default(),
            page_limit: DEFAULT_PAGE_LIMIT,
            span: BarSpan::DAILY.to_string(),
            provider: ProviderSettings::default(),
            store: StoreSettings::default(),
            audit: AuditSettings::default(),
        }
    }
}

/// Validated inputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Instrument symbol.
    pub ticker: Ticker,
    /// Closed date window.
    pub window: DateRange,
    /// Bars requested per page.
    pub page_limit: NonZeroU32,
    /// Bar span requested from the provider.
    pub span: BarSpan,
}

impl RunPlan {
    /// Creates a daily plan with the default page limit.
    #[must_use]
    pub const fn daily(ticker: Ticker, window: DateRange) -> Self {
        Self {
            ticker,
            window,
            page_limit: DEFAULT_LIMIT,
            span: BarSpan::DAILY,
        }
    }
}

impl PipelineConfig {
    /// Parses configuration from TOML text. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TOML or unknown keys.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads defaults, then the optional file, then the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Applies environment overrides using the given lookup. Empty values
    /// are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|value: &String| !value.trim().is_empty());

        if let Some(ticker) = lookup(ENV_TICKER) {
            self.ticker = Some(ticker);
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.provider.api_key = Some(api_key);
        }
        if let Some(database_url) = lookup(ENV_DATABASE_URL) {
            self.store.database_url = Some(database_url);
        }
    }

    /// Validates the run inputs against the current UTC date.
    ///
    /// # Errors
    ///
    /// Returns the first invalid or missing setting.
    pub fn plan(&self, today: NaiveDate) -> Result<RunPlan, ConfigError> {
        let ticker = self
            .ticker
            .as_deref()
            .ok_or(ConfigError::Missing("ticker"))
            .and_then(|raw| {
                Ticker::new(raw).map_err(|e| ConfigError::Invalid {
                    field: "ticker",
                    reason: e.to_string(),
                })
            })?;

        let window = self.window.resolve(today)?;

        let page_limit = NonZeroU32::new(self.page_limit)
            .filter(|limit| limit.get() <= MAX_PAGE_LIMIT)
            .ok_or_else(|| ConfigError::Invalid {
                field: "page_limit",
                reason: format!("must be between 1 and {MAX_PAGE_LIMIT}, got {}", self.page_limit),
            })?;

        let span: BarSpan = self.span.parse().map_err(|e| ConfigError::Invalid {
            field: "span",
            reason: format!("{e}"),
        })?;
        // One row per (ticker, date): anything but daily bars would collide
        if !span.is_daily() {
            return Err(ConfigError::Invalid {
                field: "span",
                reason: format!("only daily bars can be loaded, got '{span}'"),
            });
        }

        Ok(RunPlan {
            ticker,
            window,
            page_limit,
            span,
        })
    }
}
