//! # Item limits
//!
//! The enforcement core: the limit registry, the holdings counter, the
//! excess resolver and the interception engine with its reconciliation
//! sweep.
//!
//! ## Submodules
//!
//! - [`types`] item, stack and identity types
//! - [`registry`] item type → cap, flushed to storage on every change
//! - [`holdings`] live count across storage, armor and off-hand
//! - [`excess`] strips holdings above the cap into the world
//! - [`decision`] pure allow / deny / partial-admit rules
//! - [`events`] event payloads for each guarded pathway
//! - [`deferred`] tick work queue and partial transfers
//! - [`engine`] [`LimitEngine`], the per-pathway entry points and sweeps
//! - [`commands`] `/itemlimit` administration and tab completion
//! - [`messages`] player-facing templates

pub mod commands;
pub mod decision;
pub mod deferred;
pub mod engine;
pub mod errors;
pub mod events;
pub mod excess;
pub mod holdings;
pub mod messages;
pub mod registry;
pub mod types;

pub use commands::{CommandOutcome, CommandSender, LimitCommand};
pub use decision::{Decision, DenyReason};
pub use deferred::{DeferredAction, PendingPartialTransfer, SweepReason, TickQueue};
pub use engine::{BanEnforcement, EngineSettings, LimitEngine};
pub use errors::LimitError;
pub use messages::Messages;
pub use registry::LimitRegistry;
pub use types::{ContainerId, ItemStack, ItemType, PlayerId, Region};
