//! Application configuration.
//!
//! Tunables come from a TOML file; secrets come from the environment
//! only (`Secrets::from_env`) and are never written to disk.

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trailstop_quotes::QuoteClientConfig;

/// One symbol seeded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolConfig {
    /// Ticker symbol (e.g. "AAPL", "SHOP.TO").
    pub ticker: String,
    /// Price the trailing stop starts from (typically cost basis).
    pub price: Decimal,
    /// Quote currency. Default: the configured default currency is not
    /// applied here; per-symbol entries default to "USD".
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// ntfy push channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NtfyConfig {
    /// Server base URL. Default: the public ntfy.sh instance.
    #[serde(default = "default_ntfy_base_url")]
    pub base_url: String,
    /// Topic the user subscribes to.
    pub topic: String,
}

fn default_ntfy_base_url() -> String {
    "https://ntfy.sh".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Broker login base URL for the OAuth token endpoint.
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Quote sync cadence (seconds). Default: 300 (5 minutes).
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    /// Alert flush cadence (seconds). Default: 86400 (daily).
    #[serde(default = "default_alert_interval_secs")]
    pub alert_interval_secs: u64,
    /// Stop-loss threshold as a fraction of the peak, in (0, 1].
    /// Default: 0.9 (alert on a 10% drawdown from peak).
    #[serde(default = "default_stop_loss_ratio")]
    pub stop_loss_ratio: Decimal,
    /// Symbol ids per quotes request. Default: 50.
    #[serde(default = "default_quote_batch_size")]
    pub quote_batch_size: usize,
    /// Minimum gap between broker requests (ms). Default: 200.
    #[serde(default = "default_min_request_gap_ms")]
    pub min_request_gap_ms: u64,
    /// Per-request timeout (seconds). Default: 10.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Recipient passed to notification channels that address one
    /// (channels like ntfy are addressed by topic and ignore it).
    #[serde(default)]
    pub alert_recipient: String,
    /// Whether to seed tracking from open account positions at startup.
    #[serde(default)]
    pub discover_positions: bool,
    /// Currency assumed for discovered positions. Default: "USD".
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Symbols to track from startup.
    #[serde(default)]
    pub symbols: Vec<SymbolConfig>,
    /// ntfy push channel. Alerts are only logged when no channel is set.
    #[serde(default)]
    pub ntfy: Option<NtfyConfig>,
}

fn default_login_url() -> String {
    "https://login.questrade.com".to_string()
}

fn default_sync_interval_secs() -> u64 {
    300
}

fn default_alert_interval_secs() -> u64 {
    86_400
}

fn default_stop_loss_ratio() -> Decimal {
    Decimal::new(9, 1) // 0.9
}

fn default_quote_batch_size() -> usize {
    50
}

fn default_min_request_gap_ms() -> u64 {
    200
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            sync_interval_secs: default_sync_interval_secs(),
            alert_interval_secs: default_alert_interval_secs(),
            stop_loss_ratio: default_stop_loss_ratio(),
            quote_batch_size: default_quote_batch_size(),
            min_request_gap_ms: default_min_request_gap_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            alert_recipient: String::new(),
            discover_positions: false,
            default_currency: default_currency(),
            symbols: Vec::new(),
            ntfy: None,
        }
    }
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn alert_interval(&self) -> Duration {
        Duration::from_secs(self.alert_interval_secs)
    }

    /// Quote client tuning derived from this config.
    pub fn quote_client_config(&self) -> QuoteClientConfig {
        QuoteClientConfig {
            batch_size: self.quote_batch_size,
            min_request_gap: Duration::from_millis(self.min_request_gap_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Secrets sourced from the environment, never from the config file.
///
/// No `Debug` derive; the seed token must not end up in logs.
pub struct Secrets {
    /// Hex-encoded 32-byte key for credential encryption
    /// (`TRAILSTOP_ENCRYPTION_KEY`).
    pub encryption_key_hex: String,
    /// Seed refresh token for first start (`TRAILSTOP_REFRESH_TOKEN`).
    /// Optional once a credential has been persisted.
    pub seed_refresh_token: Option<String>,
}

impl Secrets {
    pub fn from_env() -> AppResult<Self> {
        let encryption_key_hex = std::env::var("TRAILSTOP_ENCRYPTION_KEY")
            .map_err(|_| AppError::Config("TRAILSTOP_ENCRYPTION_KEY is not set".to_string()))?;

        let seed_refresh_token = std::env::var("TRAILSTOP_REFRESH_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        Ok(Self {
            encryption_key_hex,
            seed_refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.login_url, "https://login.questrade.com");
        assert_eq!(config.sync_interval_secs, 300);
        assert_eq!(config.alert_interval_secs, 86_400);
        assert_eq!(config.stop_loss_ratio, dec!(0.9));
        assert_eq!(config.quote_batch_size, 50);
        assert!(config.symbols.is_empty());
        assert!(config.ntfy.is_none());
        assert!(!config.discover_positions);
    }

    #[test]
    fn test_parse_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            stop_loss_ratio = 0.85

            [[symbols]]
            ticker = "AAPL"
            price = 150.0

            [[symbols]]
            ticker = "SHOP.TO"
            price = 80.5
            currency = "CAD"

            [ntfy]
            topic = "my-alerts"
            "#,
        )
        .unwrap();

        assert_eq!(config.stop_loss_ratio, dec!(0.85));
        // Unspecified fields fall back to defaults.
        assert_eq!(config.sync_interval_secs, 300);
        assert_eq!(config.min_request_gap_ms, 200);

        assert_eq!(config.symbols.len(), 2);
        assert_eq!(config.symbols[0].currency, "USD");
        assert_eq!(config.symbols[1].currency, "CAD");

        let ntfy = config.ntfy.unwrap();
        assert_eq!(ntfy.base_url, "https://ntfy.sh");
        assert_eq!(ntfy.topic, "my-alerts");
    }

    #[test]
    fn test_quote_client_config_mapping() {
        let config = AppConfig {
            quote_batch_size: 25,
            min_request_gap_ms: 500,
            request_timeout_secs: 5,
            ..AppConfig::default()
        };
        let qc = config.quote_client_config();
        assert_eq!(qc.batch_size, 25);
        assert_eq!(qc.min_request_gap, Duration::from_millis(500));
        assert_eq!(qc.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("login_url"));
        assert!(toml_str.contains("stop_loss_ratio"));
    }
}
