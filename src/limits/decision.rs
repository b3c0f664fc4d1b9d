//! Pure decision rules for guarded pathways.
//!
//! Each pathway reduces its event to a cap, the live holdings count and an
//! incoming quantity, asks one of these functions for a [`Decision`], then
//! applies the matching action against the host.

/// Why a mutation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Cap is 0.
    Banned,
    /// Holdings already at or above the cap.
    AtLimit,
    /// The change would overshoot and this pathway cannot be split;
    /// `remaining` is the headroom that was available.
    WouldExceed { remaining: u32 },
    /// The player's inventory could not be read.
    Unverifiable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
    /// Admit `admitted` units through the normal path and divert `diverted`.
    PartialAdmit { admitted: u32, diverted: u32 },
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Decision::Deny(_))
    }
}

/// The general rule for a change that adds `incoming` units to `current`.
pub fn decide(cap: Option<u32>, current: u32, incoming: u32) -> Decision {
    let Some(cap) = cap else {
        return Decision::Allow;
    };
    if cap == 0 {
        return Decision::Deny(DenyReason::Banned);
    }
    if current >= cap {
        return Decision::Deny(DenyReason::AtLimit);
    }
    let after = u64::from(current) + u64::from(incoming);
    if after > u64::from(cap) {
        let admitted = cap - current;
        return Decision::PartialAdmit {
            admitted,
            diverted: incoming - admitted,
        };
    }
    Decision::Allow
}

/// [`decide`] for pathways that cannot be split: any overshoot denies.
pub fn decide_all_or_nothing(cap: Option<u32>, current: u32, incoming: u32) -> Decision {
    match decide(cap, current, incoming) {
        Decision::PartialAdmit { admitted, .. } => {
            Decision::Deny(DenyReason::WouldExceed { remaining: admitted })
        }
        other => other,
    }
}

/// For a stack the player is already holding on the cursor: illegal when the
/// item is banned or holdings are already at the cap.
pub fn decide_holding(cap: Option<u32>, current: u32) -> Decision {
    match cap {
        None => Decision::Allow,
        Some(0) => Decision::Deny(DenyReason::Banned),
        Some(cap) if current >= cap => Decision::Deny(DenyReason::AtLimit),
        Some(_) => Decision::Allow,
    }
}

/// For moves that cannot change holdings (hand swaps): only a ban denies.
pub fn decide_neutral(cap: Option<u32>) -> Decision {
    if cap == Some(0) {
        Decision::Deny(DenyReason::Banned)
    } else {
        Decision::Allow
    }
}
