//! TOML configuration of the checker.
//!
//! ```toml
//! interval = 120
//! bech-prefix = "cosmos"
//! exclude-validators = ["cosmosvaloper1..."]
//!
//! [log]
//! level = "info"
//! json = false
//!
//! [node]
//! lcd-address = "http://localhost:1317"
//! rpc-address = "http://localhost:26657"
//!
//! [chain-info]
//! mintscan-prefix = "cosmos"
//!
//! [telegram]
//! token = "123:abc"
//! chat = -100123
//!
//! [[missed-blocks-groups]]
//! start = 0
//! end = 99
//! emoji-start = "🟡"
//! emoji-end = "🟢"
//! desc-start = "is skipping blocks (> 0%)"
//! desc-end = "is recovered (< 1%)"
//! ```

use mbc_engine::{BandsError, ChainParams, FilterError, MonitorFilter, SeverityBand, SeverityBands};
use mbc_node::NodeConfig;
use mbc_reporters::{ChainInfo, SlackConfig, TelegramConfig};
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::{Level, debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{0} is not set and cannot be derived, set bech-prefix")]
    MissingPrefix(&'static str),
    #[error("interval must be greater than zero")]
    InvalidInterval,
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),
    #[error("invalid {field} {value:?}: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("invalid missed-blocks-groups: {0}")]
    Bands(#[from] BandsError),
    #[error(transparent)]
    Filter(#[from] FilterError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppConfig {
    /// Seconds between two polls.
    pub interval: u64,
    pub bech_prefix: String,
    pub bech_validator_prefix: String,
    pub bech_consensus_node_prefix: String,
    pub include_validators: Vec<String>,
    pub exclude_validators: Vec<String>,
    pub log: LogConfig,
    pub node: NodeSettings,
    pub chain_info: ChainInfo,
    pub telegram: TelegramConfig,
    pub slack: SlackConfig,
    /// Generated from the signing window when absent.
    pub missed_blocks_groups: Option<Vec<SeverityBand>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NodeSettings {
    pub lcd_address: String,
    pub rpc_address: String,
    pub pagination_limit: u64,
    pub blocks_diff_in_the_past: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval: 120,
            bech_prefix: String::new(),
            bech_validator_prefix: String::new(),
            bech_consensus_node_prefix: String::new(),
            include_validators: Vec::new(),
            exclude_validators: Vec::new(),
            log: LogConfig::default(),
            node: NodeSettings::default(),
            chain_info: ChainInfo::default(),
            telegram: TelegramConfig::default(),
            slack: SlackConfig::default(),
            missed_blocks_groups: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            lcd_address: "http://localhost:1317".to_owned(),
            rpc_address: "http://localhost:26657".to_owned(),
            pagination_limit: 1000,
            blocks_diff_in_the_past: 100,
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Checks everything that can be checked without talking to the chain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        self.log_level()?;

        let validator_prefix = self.validator_prefix()?;
        self.node_config()?;
        self.monitor_filter()?;

        for address in self.include_validators.iter().chain(&self.exclude_validators) {
            if !address.starts_with(&validator_prefix) {
                warn!(
                    address = %address,
                    prefix = %validator_prefix,
                    "configured validator address does not use the validator prefix"
                );
            }
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log.level).map_err(|_| ConfigError::InvalidLogLevel(self.log.level.clone()))
    }

    /// `bech-validator-prefix`, or `<bech-prefix>valoper`.
    pub fn validator_prefix(&self) -> Result<String, ConfigError> {
        derive_prefix(
            &self.bech_validator_prefix,
            &self.bech_prefix,
            "valoper",
            "bech-validator-prefix",
        )
    }

    /// `bech-consensus-node-prefix`, or `<bech-prefix>valcons`.
    pub fn consensus_prefix(&self) -> Result<String, ConfigError> {
        derive_prefix(
            &self.bech_consensus_node_prefix,
            &self.bech_prefix,
            "valcons",
            "bech-consensus-node-prefix",
        )
    }

    pub fn monitor_filter(&self) -> Result<MonitorFilter, ConfigError> {
        Ok(MonitorFilter::new(
            &self.include_validators,
            &self.exclude_validators,
        )?)
    }

    pub fn node_config(&self) -> Result<NodeConfig, ConfigError> {
        check_url("node.lcd-address", &self.node.lcd_address)?;
        check_url("node.rpc-address", &self.node.rpc_address)?;

        Ok(NodeConfig {
            lcd_address: self.node.lcd_address.clone(),
            rpc_address: self.node.rpc_address.clone(),
            pagination_limit: self.node.pagination_limit,
            blocks_diff_in_the_past: self.node.blocks_diff_in_the_past,
            consensus_prefix: self.consensus_prefix()?,
        })
    }

    /// The configured ladder validated against the signing window, or the
    /// default ladder for that window.
    pub fn severity_bands(&self, params: &ChainParams) -> Result<SeverityBands, ConfigError> {
        let Some(groups) = &self.missed_blocks_groups else {
            debug!(
                window = params.signed_blocks_window,
                "missed-blocks-groups not set, using the default ones"
            );
            return Ok(SeverityBands::default_for_window(params.signed_blocks_window));
        };

        let bands = SeverityBands::new(groups.clone());
        bands.validate(params.signed_blocks_window)?;
        Ok(bands)
    }
}

fn derive_prefix(
    explicit: &str,
    base: &str,
    suffix: &str,
    field: &'static str,
) -> Result<String, ConfigError> {
    if !explicit.is_empty() {
        return Ok(explicit.to_owned());
    }

    if base.is_empty() {
        return Err(ConfigError::MissingPrefix(field));
    }

    Ok(format!("{base}{suffix}"))
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|source| ConfigError::InvalidUrl {
            field,
            value: value.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r##"
interval = 60
bech-prefix = "cosmos"
exclude-validators = ["cosmosvaloper1bad"]

[log]
level = "debug"
json = true

[node]
lcd-address = "https://lcd.example:443"
rpc-address = "https://rpc.example:443"
pagination-limit = 500

[chain-info]
mintscan-prefix = "cosmos"

[telegram]
token = "123:abc"
chat = -100123
config-path = "subscriptions.toml"

[slack]
token = "xoxb-test"
chat = "#alerts"

[[missed-blocks-groups]]
start = 0
end = 4999
emoji-start = "🟡"
emoji-end = "🟢"
desc-start = "is skipping blocks"
desc-end = "is recovered"

[[missed-blocks-groups]]
start = 5000
end = 10000
emoji-start = "🔴"
emoji-end = "🟡"
desc-start = "is about to be jailed"
desc-end = "is recovering"
"##;

    #[test]
    fn parses_full_config() {
        let config = AppConfig::from_toml_str(FULL_CONFIG);
        assert!(config.is_ok());
        let config = match config {
            Ok(config) => config,
            Err(_) => return,
        };

        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.log_level().ok(), Some(Level::DEBUG));
        assert!(config.log.json);
        assert_eq!(config.node.pagination_limit, 500);
        assert_eq!(config.node.blocks_diff_in_the_past, 100);
        assert_eq!(config.telegram.chat, -100123);
        assert_eq!(config.slack.chat, "#alerts");
        assert_eq!(config.chain_info.mintscan_prefix, "cosmos");
        assert!(matches!(config.monitor_filter(), Ok(MonitorFilter::Exclude(_))));

        let bands = config.severity_bands(&ChainParams::new(10_000, 0.05, 6.0));
        assert!(bands.is_ok_and(|bands| bands.len() == 2));
    }

    #[test]
    fn defaults_apply_to_minimal_config() {
        let config = AppConfig::from_toml_str(r#"bech-prefix = "osmo""#);
        assert!(config.is_ok());
        let config = match config {
            Ok(config) => config,
            Err(_) => return,
        };

        assert!(config.validate().is_ok());
        assert_eq!(config.interval, 120);
        assert_eq!(config.node.lcd_address, "http://localhost:1317");
        assert_eq!(config.node.rpc_address, "http://localhost:26657");
        assert_eq!(config.log_level().ok(), Some(Level::INFO));
        assert_eq!(config.validator_prefix().ok().as_deref(), Some("osmovaloper"));
        assert_eq!(config.consensus_prefix().ok().as_deref(), Some("osmovalcons"));
        assert!(matches!(config.monitor_filter(), Ok(MonitorFilter::All)));

        let bands = config.severity_bands(&ChainParams::new(10_000, 0.05, 6.0));
        assert!(bands.is_ok_and(|bands| bands.validate(10_000).is_ok()));
    }

    #[test]
    fn explicit_prefixes_override_derived_ones() {
        let config = AppConfig {
            bech_prefix: "cosmos".to_owned(),
            bech_consensus_node_prefix: "customvalcons".to_owned(),
            ..AppConfig::default()
        };
        assert_eq!(config.consensus_prefix().ok().as_deref(), Some("customvalcons"));
        assert_eq!(config.validator_prefix().ok().as_deref(), Some("cosmosvaloper"));
    }

    #[test]
    fn rejects_invalid_configs() {
        let no_prefix = AppConfig::default();
        assert!(matches!(
            no_prefix.validate(),
            Err(ConfigError::MissingPrefix("bech-validator-prefix"))
        ));

        let both_lists = AppConfig {
            bech_prefix: "cosmos".to_owned(),
            include_validators: vec!["cosmosvaloper1a".to_owned()],
            exclude_validators: vec!["cosmosvaloper1b".to_owned()],
            ..AppConfig::default()
        };
        assert!(matches!(
            both_lists.validate(),
            Err(ConfigError::Filter(FilterError::IncludeAndExclude))
        ));

        let zero_interval = AppConfig {
            bech_prefix: "cosmos".to_owned(),
            interval: 0,
            ..AppConfig::default()
        };
        assert!(matches!(zero_interval.validate(), Err(ConfigError::InvalidInterval)));

        let bad_level = AppConfig::from_toml_str("bech-prefix = \"cosmos\"\n[log]\nlevel = \"loud\"");
        assert!(matches!(
            bad_level.and_then(|config| config.validate()),
            Err(ConfigError::InvalidLogLevel(_))
        ));

        let bad_url = AppConfig::from_toml_str("bech-prefix = \"cosmos\"\n[node]\nlcd-address = \"not a url\"");
        assert!(matches!(
            bad_url.and_then(|config| config.validate()),
            Err(ConfigError::InvalidUrl { field: "node.lcd-address", .. })
        ));
    }

    #[test]
    fn rejects_ladder_not_covering_window() {
        let config = AppConfig::from_toml_str(FULL_CONFIG);
        assert!(config.is_ok());
        let config = match config {
            Ok(config) => config,
            Err(_) => return,
        };

        let bands = config.severity_bands(&ChainParams::new(20_000, 0.05, 6.0));
        assert!(matches!(
            bands,
            Err(ConfigError::Bands(BandsError::LastEndBelowWindow { .. }))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir();
        assert!(dir.is_ok());
        let dir = match dir {
            Ok(dir) => dir,
            Err(_) => return,
        };

        let loaded = AppConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(loaded, Err(ConfigError::Io(_))));

        let path = dir.path().join("config.toml");
        assert!(std::fs::write(&path, FULL_CONFIG).is_ok());
        assert!(AppConfig::load(&path).is_ok_and(|config| config.interval == 60));
    }
}
