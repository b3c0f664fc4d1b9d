//! Shared fixtures: an engine over an in-memory store and a one-player server.
#![allow(dead_code)]

use itemlimit::host::memory::MemoryServer;
use itemlimit::limits::{EngineSettings, ItemType, LimitEngine, LimitRegistry, Messages, PlayerId};
use itemlimit::storage::MemoryLimitStore;

pub const STEVE: PlayerId = PlayerId(1);
pub const ALEX: PlayerId = PlayerId(2);

/// Settings with the periodic sweep off so tests control every tick.
pub fn quiet_settings() -> EngineSettings {
    EngineSettings {
        sweep_interval_ticks: 0,
        ..EngineSettings::default()
    }
}

pub fn engine_with(limits: &[(&str, u32)], settings: EngineSettings) -> (LimitEngine, MemoryLimitStore) {
    let store = MemoryLimitStore::new();
    let mut registry = LimitRegistry::new(Box::new(store.clone()));
    for (name, cap) in limits {
        registry.add_or_update(ItemType::new(name), *cap);
    }
    (LimitEngine::new(registry, settings, Messages::default()), store)
}

pub fn engine(limits: &[(&str, u32)]) -> LimitEngine {
    engine_with(limits, quiet_settings()).0
}

pub fn server() -> MemoryServer {
    let mut host = MemoryServer::new();
    host.add_player(STEVE, "Steve");
    host
}

pub fn run_ticks(engine: &mut LimitEngine, host: &mut MemoryServer, n: u64) {
    for _ in 0..n {
        engine.tick(host);
    }
}
