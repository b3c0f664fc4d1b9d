//! Enforcement counters.
//!
//! Owned by the engine and updated on the dispatch thread, so plain integers
//! suffice. The driver hands out copies through its snapshot command.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::limits::decision::Decision;
use crate::limits::events::Pathway;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct EnforcementStats {
    pub allowed: u64,
    pub denied: u64,
    pub partial_admits: u64,
    /// Units moved by executed partial transfers.
    pub units_admitted_partial: u64,
    /// Units placed into the world by any enforcement path.
    pub units_surfaced: u64,
    pub sweeps_run: u64,
    /// Deferred actions skipped because the player had gone offline.
    pub stale_dropped: u64,
    pub denials_by_pathway: BTreeMap<String, u64>,
}

impl EnforcementStats {
    pub fn record(&mut self, pathway: Pathway, decision: &Decision) {
        match decision {
            Decision::Allow => self.allowed = self.allowed.saturating_add(1),
            Decision::Deny(_) => {
                self.denied = self.denied.saturating_add(1);
                *self
                    .denials_by_pathway
                    .entry(pathway.as_str().to_string())
                    .or_default() += 1;
            }
            Decision::PartialAdmit { .. } => {
                self.partial_admits = self.partial_admits.saturating_add(1)
            }
        }
    }

    pub fn record_surfaced(&mut self, units: u32) {
        self.units_surfaced = self.units_surfaced.saturating_add(u64::from(units));
    }

    pub fn record_partial_units(&mut self, units: u32) {
        self.units_admitted_partial = self
            .units_admitted_partial
            .saturating_add(u64::from(units));
    }

    pub fn record_sweep(&mut self) {
        self.sweeps_run = self.sweeps_run.saturating_add(1);
    }

    pub fn record_stale(&mut self) {
        self.stale_dropped = self.stale_dropped.saturating_add(1);
    }

    pub fn denials_for(&self, pathway: Pathway) -> u64 {
        self.denials_by_pathway
            .get(pathway.as_str())
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::decision::DenyReason;

    #[test]
    fn decisions_update_counters() {
        let mut stats = EnforcementStats::default();
        stats.record(Pathway::Pickup, &Decision::Allow);
        stats.record(Pathway::Pickup, &Decision::Deny(DenyReason::Banned));
        stats.record(Pathway::Drag, &Decision::Deny(DenyReason::AtLimit));
        stats.record(
            Pathway::ShiftClick,
            &Decision::PartialAdmit {
                admitted: 2,
                diverted: 3,
            },
        );
        assert_eq!(stats.allowed, 1);
        assert_eq!(stats.denied, 2);
        assert_eq!(stats.partial_admits, 1);
        assert_eq!(stats.denials_for(Pathway::Pickup), 1);
        assert_eq!(stats.denials_for(Pathway::Trade), 0);
    }

    #[test]
    fn serializes_to_json() {
        let mut stats = EnforcementStats::default();
        stats.record_surfaced(15);
        let json = serde_json::to_value(&stats).expect("json");
        assert_eq!(json["units_surfaced"], 15);
    }
}
