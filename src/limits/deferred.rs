//! Tick-based work queue consumed by the engine.
//!
//! Some compensating actions cannot run inside the interception callback
//! because the host has not yet restored slot state for the cancelled event.
//! They are recorded here as plain values and executed on a later tick, after
//! re-checking that the player is still online.
//!
//! Ordering: actions due on the same tick run in the order they were
//! enqueued. Recurring jobs run after that tick's one-shot actions.

use crate::limits::types::{ContainerId, ItemStack, ItemType, PlayerId};

/// Where the units of a partial transfer come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSource {
    Cursor,
    Container { container: ContainerId, slot: usize },
}

/// Where the admitted units go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferTarget {
    /// Bulk storage through the host's normal add path.
    Inventory,
    OffHand,
}

/// What happens to the units that were not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainderDisposition {
    ReturnToSource,
    DropInWorld,
}

/// Intent to admit only part of a moving stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPartialTransfer {
    pub player: PlayerId,
    pub source: TransferSource,
    pub target: TransferTarget,
    pub item: ItemType,
    pub admitted: u32,
    pub remainder: u32,
    pub disposition: RemainderDisposition,
}

impl PendingPartialTransfer {
    /// Cursor stack split: admitted units into `target`, the rest into the world.
    pub fn from_cursor(
        player: PlayerId,
        target: TransferTarget,
        item: ItemType,
        admitted: u32,
        remainder: u32,
    ) -> Self {
        Self {
            player,
            source: TransferSource::Cursor,
            target,
            item,
            admitted,
            remainder,
            disposition: RemainderDisposition::DropInWorld,
        }
    }

    /// Container stack split: admitted units into the inventory, the rest
    /// stays where it was.
    pub fn from_container(
        player: PlayerId,
        container: ContainerId,
        slot: usize,
        item: ItemType,
        admitted: u32,
        remainder: u32,
    ) -> Self {
        Self {
            player,
            source: TransferSource::Container { container, slot },
            target: TransferTarget::Inventory,
            item,
            admitted,
            remainder,
            disposition: RemainderDisposition::ReturnToSource,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepReason {
    Periodic,
    Login,
    ContainerClose,
    AmbiguousCursor,
    Manual,
}

impl SweepReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SweepReason::Periodic => "periodic",
            SweepReason::Login => "login",
            SweepReason::ContainerClose => "container_close",
            SweepReason::AmbiguousCursor => "ambiguous_cursor",
            SweepReason::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredAction {
    PartialTransfer(PendingPartialTransfer),
    /// Surface the cursor stack if it still holds `item`.
    SurfaceCursor { player: PlayerId, item: ItemType },
    /// Surface a stack already taken off the player's cursor.
    SurfaceStack { player: PlayerId, stack: ItemStack },
    Sweep { player: PlayerId, reason: SweepReason },
    LoginEnforcement { player: PlayerId },
}

impl DeferredAction {
    pub fn player(&self) -> PlayerId {
        match self {
            DeferredAction::PartialTransfer(t) => t.player,
            DeferredAction::SurfaceCursor { player, .. }
            | DeferredAction::SurfaceStack { player, .. }
            | DeferredAction::Sweep { player, .. }
            | DeferredAction::LoginEnforcement { player } => *player,
        }
    }
}

/// Work that repeats on a fixed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurringKind {
    PeriodicSweep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(u64);

#[derive(Debug, Clone)]
struct RecurringJob {
    id: JobId,
    kind: RecurringKind,
    next_due: u64,
    period: u64,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: u64,
    seq: u64,
    action: DeferredAction,
}

#[derive(Debug, Default)]
pub struct TickQueue {
    now: u64,
    seq: u64,
    next_job: u64,
    pending: Vec<Scheduled>,
    recurring: Vec<RecurringJob>,
}

impl TickQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick number.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn run_next_tick(&mut self, action: DeferredAction) {
        self.run_later(1, action);
    }

    /// Schedule `action` to run `delay` ticks from now (at least one).
    pub fn run_later(&mut self, delay: u64, action: DeferredAction) {
        let due = self.now.saturating_add(delay.max(1));
        self.seq += 1;
        self.pending.push(Scheduled {
            due,
            seq: self.seq,
            action,
        });
    }

    pub fn schedule_recurring(&mut self, kind: RecurringKind, initial_delay: u64, period: u64) -> JobId {
        self.next_job += 1;
        let id = JobId(self.next_job);
        self.recurring.push(RecurringJob {
            id,
            kind,
            next_due: self.now.saturating_add(initial_delay.max(1)),
            period: period.max(1),
        });
        id
    }

    /// Returns whether the job existed.
    pub fn cancel_recurring(&mut self, id: JobId) -> bool {
        let before = self.recurring.len();
        self.recurring.retain(|job| job.id != id);
        self.recurring.len() != before
    }

    /// Move to the next tick and return its number.
    pub fn advance(&mut self) -> u64 {
        self.now += 1;
        self.now
    }

    /// Remove and return every action due at or before the current tick.
    pub fn drain_due(&mut self) -> Vec<DeferredAction> {
        let now = self.now;
        let (mut due, rest): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = rest;
        due.sort_by_key(|s| (s.due, s.seq));
        due.into_iter().map(|s| s.action).collect()
    }

    /// Recurring jobs due this tick; each is rescheduled one period later.
    pub fn due_jobs(&mut self) -> Vec<RecurringKind> {
        let now = self.now;
        let mut kinds = Vec::new();
        for job in self.recurring.iter_mut() {
            if job.next_due <= now {
                kinds.push(job.kind);
                job.next_due = now + job.period;
            }
        }
        kinds
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn recurring(&self) -> usize {
        self.recurring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
