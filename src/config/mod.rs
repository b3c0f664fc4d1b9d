//! # Configuration Management Module
//!
//! TOML configuration for the item limiter, loaded once at startup.
//!
//! ## Configuration Structure
//!
//! - [`LimiterConfig`] - sweep timing, cap ceiling, ban enforcement, paging
//! - [`StorageConfig`] - where the limits file lives
//! - [`LoggingConfig`] - log level, log file and audit log
//! - [`Messages`] - every player-facing text template
//!
//! ## Usage
//!
//! ```rust,no_run
//! use itemlimit::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("limits file: {}", config.limits_path().display());
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [limiter]
//! deployment = "ItemLimiter"
//! sweep_interval_ticks = 100
//! login_delay_ticks = 20
//! max_cap = 2304
//! ban_enforcement = "sweep"
//!
//! [storage]
//! data_dir = "./data"
//! limits_file = "limited-items.toml"
//!
//! [logging]
//! level = "info"
//! file = "itemlimit.log"
//! audit_file = "itemlimit-audit.log"
//!
//! [messages]
//! blocked_banned = "You cannot have {item}!"
//! ```
//!
//! Every section and key is optional; anything missing takes its default.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

use crate::limits::engine::{BanEnforcement, EngineSettings, DEFAULT_MAX_CAP};
use crate::limits::messages::Messages;

/// The two plugin names one engine can be deployed under. Only the label
/// differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Deployment {
    #[default]
    ItemLimiter,
    PumpkinsItemLimiter,
}

impl Deployment {
    pub fn name(&self) -> &'static str {
        match self {
            Deployment::ItemLimiter => "ItemLimiter",
            Deployment::PumpkinsItemLimiter => "PumpkinsItemLimiter",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimiterConfig {
    pub deployment: Deployment,
    /// Ticks between periodic sweeps; 0 disables the periodic sweep.
    pub sweep_interval_ticks: u64,
    pub sweep_initial_delay_ticks: u64,
    /// Delay between join and login enforcement.
    pub login_delay_ticks: u64,
    /// Highest cap accepted by `add`.
    pub max_cap: u32,
    pub ban_enforcement: BanEnforcement,
    pub list_page_size: usize,
    /// Wall-clock length of one tick for the built-in driver.
    pub tick_millis: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            deployment: Deployment::default(),
            sweep_interval_ticks: 100,
            sweep_initial_delay_ticks: 100,
            login_delay_ticks: 20,
            max_cap: DEFAULT_MAX_CAP,
            ban_enforcement: BanEnforcement::Sweep,
            list_page_size: 10,
            tick_millis: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub limits_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            limits_file: "limited-items.toml".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Registry changes made by administrators are also appended here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("itemlimit.log".to_string()),
            audit_file: Some("itemlimit-audit.log".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub limiter: LimiterConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub messages: Messages,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        if config.limiter.list_page_size == 0 {
            return Err(anyhow!("Invalid config {}: list_page_size must be at least 1", path));
        }
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// `<data_dir>/<limits_file>`
    pub fn limits_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(&self.storage.limits_file)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.limiter.tick_millis.max(1))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            sweep_interval_ticks: self.limiter.sweep_interval_ticks,
            sweep_initial_delay_ticks: self.limiter.sweep_initial_delay_ticks,
            login_delay_ticks: self.limiter.login_delay_ticks,
            max_cap: self.limiter.max_cap,
            ban_enforcement: self.limiter.ban_enforcement,
            list_page_size: self.limiter.list_page_size,
        }
    }
}
