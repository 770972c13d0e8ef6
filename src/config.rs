// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FundError;
use crate::reconcile::DEFAULT_DISPLAY_CAP;

/// Marker left in the default donation link until the operator fills it in.
const DONATION_URL_PLACEHOLDER: &str = "YOUR_BUTTON_ID";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Currency code the ledger is reported in (e.g., "USD")
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Net amount that covers one period of server costs
    #[serde(default = "default_goal_threshold")]
    pub goal_threshold: Decimal,

    /// How many unspent donations to list in detail
    #[serde(default = "default_display_cap")]
    pub display_cap: usize,

    /// Name of one funding period ("month")
    #[serde(default = "default_period_label")]
    pub period_label: String,

    /// Where `serverfund donate` sends people
    #[serde(default = "default_donation_url")]
    pub donation_url: String,

    /// Ledger database settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Ledger database file (defaults to the XDG data directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Give up on a ledger query after this many seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            goal_threshold: default_goal_threshold(),
            display_cap: default_display_cap(),
            period_label: default_period_label(),
            donation_url: default_donation_url(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_goal_threshold() -> Decimal {
    Decimal::from(15)
}

fn default_display_cap() -> usize {
    DEFAULT_DISPLAY_CAP
}

fn default_period_label() -> String {
    "month".to_string()
}

fn default_donation_url() -> String {
    format!("https://www.paypal.com/donate/?hosted_button_id={DONATION_URL_PLACEHOLDER}")
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Config {
    /// Load configuration from XDG config directory.
    /// Returns default config if the file doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Path to the configuration file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Path to the data directory.
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Ledger database file: the configured path, or `ledger.db` in the data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("ledger.db")),
        }
    }

    /// Check the settings a funding report depends on.
    pub fn validate(&self) -> Result<(), FundError> {
        if self.currency.trim().is_empty() {
            return Err(FundError::Configuration("currency is empty".into()));
        }
        if self.goal_threshold <= Decimal::ZERO {
            return Err(FundError::Configuration(format!(
                "goal_threshold must be positive, got {}",
                self.goal_threshold
            )));
        }
        if let Some(path) = &self.database.path
            && path.as_os_str().to_string_lossy().trim().is_empty()
        {
            return Err(FundError::Configuration("database.path is empty".into()));
        }
        if self.database.timeout_seconds == 0 {
            return Err(FundError::Configuration(
                "database.timeout_seconds must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The donation link, unless it is missing or still the placeholder.
    pub fn donation_link(&self) -> Result<&str, FundError> {
        let url = self.donation_url.trim();
        if url.is_empty() || url.contains(DONATION_URL_PLACEHOLDER) {
            return Err(FundError::Configuration(
                "donation_url has not been set".into(),
            ));
        }
        Ok(url)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "serverfund").context("Could not determine home directory")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_match_observed_behaviour() {
        let config = Config::default();
        assert_eq!(config.currency, "USD");
        assert_eq!(config.goal_threshold, Decimal::from(15));
        assert_eq!(config.display_cap, 10);
        assert_eq!(config.period_label, "month");
        assert_eq!(config.database.timeout_seconds, 10);
        assert!(config.database.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_parses_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.currency, "USD");
        assert_eq!(config.display_cap, 10);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            "currency = \"EUR\"\ngoal_threshold = \"20.5\"\n\n[database]\ntimeout_seconds = 3\n",
        )
        .unwrap();
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.goal_threshold.to_string(), "20.5");
        assert_eq!(config.display_cap, 10);
        assert_eq!(config.database.timeout_seconds, 3);
    }

    #[test]
    fn serialized_default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.goal_threshold, Decimal::from(15));
        assert_eq!(parsed.donation_url, default_donation_url());
    }

    #[test]
    fn blank_currency_is_a_configuration_error() {
        let config = Config {
            currency: "  ".into(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn non_positive_goal_is_rejected() {
        let config = Config {
            goal_threshold: Decimal::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_database_path_is_rejected() {
        let mut config = Config::default();
        config.database.path = Some(PathBuf::from(" "));
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::default();
        config.database.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_database_path_wins() {
        let mut config = Config::default();
        config.database.path = Some(PathBuf::from("/srv/fund/ledger.db"));
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/srv/fund/ledger.db")
        );
    }

    #[test]
    fn placeholder_donation_link_is_rejected() {
        let config = Config::default();
        assert!(config.donation_link().is_err());

        let config = Config {
            donation_url: "https://www.paypal.com/donate/?hosted_button_id=ABC123".into(),
            ..Config::default()
        };
        assert_eq!(
            config.donation_link().unwrap(),
            "https://www.paypal.com/donate/?hosted_button_id=ABC123"
        );
    }
}
