//! Static idler configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{ConfigError, TargetMode, TargetSpec};

/// Request timeouts for the two kinds of remote lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Timeout for store metadata lookups (game names), in seconds.
    pub metadata_seconds: u64,
    /// Timeout for a single inventory page, in seconds.
    pub page_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            metadata_seconds: 10,
            page_seconds: 20,
        }
    }
}

impl TimeoutConfig {
    /// Returns the metadata timeout.
    #[must_use]
    pub const fn metadata(&self) -> Duration {
        Duration::from_secs(self.metadata_seconds)
    }

    /// Returns the inventory page timeout.
    #[must_use]
    pub const fn page(&self) -> Duration {
        Duration::from_secs(self.page_seconds)
    }
}

/// Configuration for an idle run, loaded once at startup from `config.json`.
///
/// The value is immutable after [`IdleConfig::validate`] and is passed
/// explicitly to every component that needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// SteamID64 of the account whose inventory is checked.
    pub steam_id_64: String,
    /// App id of the Steam Community inventory that holds trading cards.
    pub steam_community_appid: u32,
    /// Inventory context id for trading cards.
    pub trading_card_context_id: u32,
    /// Seconds between inventory checks (or drop estimates in timed mode).
    pub default_monitoring_interval_seconds: u64,
    /// Minutes of idling assumed per card drop, also used for the idle budget.
    pub max_idle_minutes_per_card: f64,
    /// Whether to read the real inventory. When false, drops are estimated from time.
    pub enable_inventory_checking: bool,
    /// Maximum number of items requested per inventory page.
    pub inventory_page_size: u32,
    /// Remote request timeouts.
    pub timeouts: TimeoutConfig,
    /// Pause between successive inventory page requests, in milliseconds.
    pub page_delay_ms: u64,
    /// Seconds to keep the game running after the idle budget is exhausted.
    pub sync_grace_seconds: u64,
    /// Optional program spawned with the app id to keep the game session running.
    pub session_helper: Option<PathBuf>,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            steam_id_64: String::new(),
            steam_community_appid: 753,
            trading_card_context_id: 6,
            default_monitoring_interval_seconds: 300,
            max_idle_minutes_per_card: 30.0,
            enable_inventory_checking: true,
            inventory_page_size: 2500,
            timeouts: TimeoutConfig::default(),
            page_delay_ms: 500,
            sync_grace_seconds: 5,
            session_helper: None,
        }
    }
}

impl IdleConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| ConfigError::ParseJson {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()
    }

    /// Normalizes and checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid option found.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.steam_id_64 = self.steam_id_64.trim().to_string();

        if self.enable_inventory_checking && self.steam_id_64.is_empty() {
            return Err(ConfigError::MissingSteamId);
        }
        if self.default_monitoring_interval_seconds == 0 {
            return Err(ConfigError::ZeroValue("default_monitoring_interval_seconds"));
        }
        if !(self.max_idle_minutes_per_card > 0.0 && self.max_idle_minutes_per_card.is_finite()) {
            return Err(ConfigError::NonPositiveRate(self.max_idle_minutes_per_card));
        }
        if self.inventory_page_size == 0 {
            return Err(ConfigError::ZeroValue("inventory_page_size"));
        }
        if self.timeouts.metadata_seconds == 0 {
            return Err(ConfigError::ZeroValue("timeouts.metadata_seconds"));
        }
        if self.timeouts.page_seconds == 0 {
            return Err(ConfigError::ZeroValue("timeouts.page_seconds"));
        }

        Ok(self)
    }

    /// Returns a copy with the monitoring interval replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if `seconds` is zero.
    pub fn with_interval(mut self, seconds: u64) -> Result<Self, ConfigError> {
        if seconds == 0 {
            return Err(ConfigError::ZeroValue("interval"));
        }
        self.default_monitoring_interval_seconds = seconds;
        Ok(self)
    }

    /// Checks that `target` can be evaluated under this configuration.
    ///
    /// Without inventory checking there is no measured baseline, so only
    /// remaining-mode targets are meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TotalTargetWithoutInventory`] for a total target
    /// while inventory checking is disabled.
    pub const fn check_target(&self, target: TargetSpec) -> Result<(), ConfigError> {
        if !self.enable_inventory_checking && matches!(target.mode(), TargetMode::Total) {
            return Err(ConfigError::TotalTargetWithoutInventory(target));
        }
        Ok(())
    }

    /// Returns the monitoring interval.
    #[must_use]
    pub const fn monitoring_interval(&self) -> Duration {
        Duration::from_secs(self.default_monitoring_interval_seconds)
    }

    /// Returns the pause between inventory page requests.
    #[must_use]
    pub const fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Returns the post-budget sync grace period.
    #[must_use]
    pub const fn sync_grace(&self) -> Duration {
        Duration::from_secs(self.sync_grace_seconds)
    }
}
