//! # itemlimit - per-player item possession limits
//!
//! Administrators cap how many units of an item type any single player may
//! hold (a cap of 0 bans the item outright). The limiter intercepts every
//! pathway by which items enter a player's inventory, refuses or partially
//! admits transfers that would exceed a cap, and periodically reconciles
//! actual holdings, dropping any excess into the world at the player's
//! position.
//!
//! ## Features
//!
//! - **Persistent registry**: caps survive restarts in a small TOML file, written on every change.
//! - **Guarded pathways**: world pickup, hand swap, clicks, off-hand, drag, shift-click, trades, close and drop.
//! - **Partial admission**: shift-click and cursor transfers admit up to the remaining headroom on the next tick.
//! - **Reconciliation sweep**: periodic, on login and after container close, with one consolidated notice.
//! - **Administration**: `/itemlimit add|remove|list|check|clear` with tab completion and an audit log.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use itemlimit::config::Config;
//! use itemlimit::host::{memory::MemoryServer, OpenCatalog};
//! use itemlimit::limits::{LimitEngine, LimitRegistry};
//! use itemlimit::storage::TomlLimitStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = TomlLimitStore::new(config.limits_path());
//!     let registry = LimitRegistry::load(Box::new(store), &OpenCatalog, config.limiter.max_cap);
//!     let mut engine = LimitEngine::new(registry, config.engine_settings(), config.messages.clone());
//!
//!     let mut host = MemoryServer::new();
//!     engine.tick(&mut host);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`limits`] - registry, decisions, interception engine, sweeps and commands
//! - [`host`] - traits the embedding server implements, plus an in-memory host
//! - [`storage`] - limits file persistence
//! - [`driver`] - async tick loop for hosts without their own
//! - [`config`] - configuration loading
//! - [`metrics`] - enforcement counters
//! - [`logutil`] - single-line log escaping

pub mod config;
pub mod driver;
pub mod host;
pub mod limits;
pub mod logutil;
pub mod metrics;
pub mod storage;
