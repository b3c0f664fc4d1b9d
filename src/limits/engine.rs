//! Interception engine and reconciliation sweep.
//!
//! [`LimitEngine`] owns the registry, the tick queue, message templates and
//! counters. The host calls one `on_*` entry point per guarded pathway with
//! the event payload; the engine decides (see [`crate::limits::decision`]),
//! flips the payload's `cancelled` flag when refusing, and performs or
//! schedules the compensating action. [`LimitEngine::tick`] must be called
//! once per host tick to run deferred work and the periodic sweep.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::host::{Host, ItemCatalog};
use crate::limits::commands::{
    self, handle_limit_command, CommandContext, CommandOutcome, CommandSender,
};
use crate::limits::decision::{
    decide, decide_all_or_nothing, decide_holding, decide_neutral, Decision, DenyReason,
};
use crate::limits::deferred::{
    DeferredAction, JobId, PendingPartialTransfer, RecurringKind, RemainderDisposition,
    SweepReason, TickQueue, TransferSource, TransferTarget,
};
use crate::limits::errors::LimitError;
use crate::limits::events::{
    ClickAction, ClickEvent, ClickedInventory, CloseEvent, DragEvent, DropEvent, HandSwapEvent,
    JoinEvent, Pathway, PickupEvent, SlotOwner, ViewKind,
};
use crate::limits::excess;
use crate::limits::holdings;
use crate::limits::messages::Messages;
use crate::limits::registry::LimitRegistry;
use crate::limits::types::{
    ContainerId, ItemStack, ItemType, PlayerId, Region, HOTBAR_SLOTS, MERCHANT_RESULT_SLOT,
    OFF_HAND_SLOT,
};
use crate::metrics::EnforcementStats;

/// Largest cap an administrator may set: 36 full stacks of 64.
pub const DEFAULT_MAX_CAP: u32 = 2304;

/// How a newly set cap is applied to items players already hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BanEnforcement {
    /// Left to the next reconciliation sweep.
    #[default]
    Sweep,
    /// Excess is stripped from every online player as soon as the cap is set.
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub sweep_interval_ticks: u64,
    pub sweep_initial_delay_ticks: u64,
    pub login_delay_ticks: u64,
    pub max_cap: u32,
    pub ban_enforcement: BanEnforcement,
    pub list_page_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sweep_interval_ticks: 100,
            sweep_initial_delay_ticks: 100,
            login_delay_ticks: 20,
            max_cap: DEFAULT_MAX_CAP,
            ban_enforcement: BanEnforcement::Sweep,
            list_page_size: 10,
        }
    }
}

/// Where the units of a guarded click come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Cursor,
    Hotbar,
    Container(ContainerId),
    /// Leaving the player's inventory.
    Player,
}

pub struct LimitEngine {
    registry: LimitRegistry,
    queue: TickQueue,
    messages: Messages,
    settings: EngineSettings,
    stats: EnforcementStats,
    periodic: Option<JobId>,
}

impl LimitEngine {
    /// Build an engine and schedule the periodic sweep (disabled when
    /// `sweep_interval_ticks` is 0).
    pub fn new(registry: LimitRegistry, settings: EngineSettings, messages: Messages) -> Self {
        let mut queue = TickQueue::new();
        let periodic = (settings.sweep_interval_ticks > 0).then(|| {
            queue.schedule_recurring(
                RecurringKind::PeriodicSweep,
                settings.sweep_initial_delay_ticks,
                settings.sweep_interval_ticks,
            )
        });
        Self {
            registry,
            queue,
            messages,
            settings,
            stats: EnforcementStats::default(),
            periodic,
        }
    }

    pub fn registry(&self) -> &LimitRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LimitRegistry {
        &mut self.registry
    }

    pub fn queue(&self) -> &TickQueue {
        &self.queue
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn stats(&self) -> &EnforcementStats {
        &self.stats
    }

    /// Live holdings; 0 when the host has no inventory for the player.
    pub fn count<H: Host + ?Sized>(&self, host: &H, player: PlayerId, item: &ItemType) -> u32 {
        holdings::count_for(host, player, item).unwrap_or(0)
    }

    pub fn get_limit(&self, item: &ItemType) -> Option<u32> {
        self.registry.lookup(item)
    }

    pub fn is_limited(&self, item: &ItemType) -> bool {
        self.registry.is_limited(item)
    }

    pub fn is_banned(&self, item: &ItemType) -> bool {
        self.registry.is_banned(item)
    }

    pub fn drop_excess<H: Host + ?Sized>(&mut self, host: &mut H, player: PlayerId, item: &ItemType) -> u32 {
        let removed = excess::drop_excess(host, &self.registry, player, item);
        self.stats.record_surfaced(removed);
        removed
    }

    fn note(&mut self, pathway: Pathway, player: PlayerId, item: &ItemType, decision: Decision) -> Decision {
        self.stats.record(pathway, &decision);
        if !decision.is_allow() {
            debug!("{}: {} for {} -> {:?}", pathway, item, player, decision);
        }
        decision
    }

    fn tell_blocked<H: Host + ?Sized>(&self, host: &mut H, player: PlayerId, item: &ItemType, cap: u32) {
        host.send_message(player, &self.messages.blocked(item, cap));
    }

    /// Decision for `incoming` units, or an unverifiable deny when the
    /// player's inventory cannot be read.
    fn decide_for<H: Host + ?Sized>(
        host: &H,
        player: PlayerId,
        item: &ItemType,
        rule: impl FnOnce(u32) -> Decision,
    ) -> Decision {
        match holdings::count_for(host, player, item) {
            Some(current) => rule(current),
            None => Decision::Deny(DenyReason::Unverifiable),
        }
    }

    // ---------------------------------------------------------------------
    // Guarded pathways
    // ---------------------------------------------------------------------

    /// Pickup from the world. All-or-nothing.
    pub fn on_pickup<H: Host + ?Sized>(&mut self, host: &mut H, event: &mut PickupEvent) -> Decision {
        if event.cancelled || event.stack.is_empty() {
            return Decision::Allow;
        }
        let item = event.stack.item.clone();
        let Some(cap) = self.registry.lookup(&item) else {
            return Decision::Allow;
        };
        let amount = event.stack.amount;
        let decision = Self::decide_for(host, event.player, &item, |current| {
            decide_all_or_nothing(Some(cap), current, amount)
        });
        if decision.is_deny() {
            event.cancelled = true;
            self.tell_blocked(host, event.player, &item, cap);
        }
        self.note(Pathway::Pickup, event.player, &item, decision)
    }

    /// Main hand / off-hand swap. Holdings do not change, so only a ban on
    /// either side refuses it.
    pub fn on_hand_swap<H: Host + ?Sized>(&mut self, host: &mut H, event: &mut HandSwapEvent) -> Decision {
        if event.cancelled {
            return Decision::Allow;
        }
        let sides = [event.off_hand.clone(), event.main_hand.clone()];
        let mut checked = None;
        for stack in sides.into_iter().flatten().filter(|s| !s.is_empty()) {
            let Some(cap) = self.registry.lookup(&stack.item) else {
                continue;
            };
            let decision = decide_neutral(Some(cap));
            if decision.is_deny() {
                event.cancelled = true;
                self.tell_blocked(host, event.player, &stack.item, cap);
                return self.note(Pathway::HandSwap, event.player, &stack.item, decision);
            }
            checked = Some(stack.item);
        }
        match checked {
            Some(item) => self.note(Pathway::HandSwap, event.player, &item, Decision::Allow),
            None => Decision::Allow,
        }
    }

    /// Any click in an open inventory view. Routes to the trade, shift-click
    /// or generic slot handler.
    pub fn on_click<H: Host + ?Sized>(&mut self, host: &mut H, event: &mut ClickEvent) -> Decision {
        if event.cancelled || event.view == ViewKind::Creative {
            return Decision::Allow;
        }
        if matches!(event.view, ViewKind::Merchant(_)) && event.raw_slot == MERCHANT_RESULT_SLOT {
            return self.on_trade(host, event);
        }
        if event.click.is_shift() {
            if let Some(ClickedInventory::Container(container)) = event.clicked {
                return self.on_shift_click(host, event, container);
            }
        }
        self.on_slot_click(host, event)
    }

    /// Taking a merchant result. Trades cannot be split.
    fn on_trade<H: Host + ?Sized>(&mut self, host: &mut H, event: &mut ClickEvent) -> Decision {
        let Some(result) = event.current.clone().filter(|s| !s.is_empty()) else {
            return Decision::Allow;
        };
        let Some(cap) = self.registry.lookup(&result.item) else {
            return Decision::Allow;
        };
        let decision = Self::decide_for(host, event.player, &result.item, |current| {
            decide_all_or_nothing(Some(cap), current, result.amount)
        });
        if let Decision::Deny(reason) = decision {
            event.cancelled = true;
            host.send_message(
                event.player,
                &self.messages.trade_denied(&result.item, cap, reason),
            );
        }
        self.note(Pathway::Trade, event.player, &result.item, decision)
    }

    /// Shift-click from a container into the player's inventory. Overflow
    /// becomes a next-tick partial transfer that leaves the rest in place.
    fn on_shift_click<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        event: &mut ClickEvent,
        container: ContainerId,
    ) -> Decision {
        let Some(stack) = event.current.clone().filter(|s| !s.is_empty()) else {
            return Decision::Allow;
        };
        let Some(cap) = self.registry.lookup(&stack.item) else {
            return Decision::Allow;
        };
        let player = event.player;
        let decision = Self::decide_for(host, player, &stack.item, |current| {
            decide(Some(cap), current, stack.amount)
        });
        match decision {
            Decision::Deny(_) => {
                event.cancelled = true;
                self.tell_blocked(host, player, &stack.item, cap);
            }
            Decision::PartialAdmit { admitted, diverted } => {
                event.cancelled = true;
                self.queue.run_next_tick(DeferredAction::PartialTransfer(
                    PendingPartialTransfer::from_container(
                        player,
                        container,
                        event.slot,
                        stack.item.clone(),
                        admitted,
                        diverted,
                    ),
                ));
            }
            Decision::Allow => {}
        }
        self.note(Pathway::ShiftClick, player, &stack.item, decision)
    }

    fn on_slot_click<H: Host + ?Sized>(&mut self, host: &mut H, event: &mut ClickEvent) -> Decision {
        let Some(clicked) = event.clicked else {
            return Decision::Allow;
        };
        let player = event.player;
        let on_player = clicked == ClickedInventory::Player;
        let off_hand_slot = on_player && event.slot == OFF_HAND_SLOT;

        let (moving, origin) = if event.action.moves_cursor() {
            (event.cursor.clone(), Origin::Cursor)
        } else if event.action == ClickAction::MoveToOtherInventory {
            let origin = match clicked {
                ClickedInventory::Player => Origin::Player,
                ClickedInventory::Container(c) => Origin::Container(c),
            };
            (event.current.clone(), origin)
        } else if event.action.is_hotbar() {
            match clicked {
                ClickedInventory::Player if off_hand_slot => {
                    let hotbar = event
                        .hotbar_button
                        .filter(|b| *b < HOTBAR_SLOTS)
                        .and_then(|b| host.inventory(player)?.item(Region::Storage, b).cloned());
                    (hotbar, Origin::Hotbar)
                }
                ClickedInventory::Container(c) => (event.current.clone(), Origin::Container(c)),
                ClickedInventory::Player => return Decision::Allow,
            }
        } else {
            return Decision::Allow;
        };

        let Some(moving) = moving.filter(|s| !s.is_empty()) else {
            return Decision::Allow;
        };
        let Some(cap) = self.registry.lookup(&moving.item) else {
            return Decision::Allow;
        };
        if origin == Origin::Player {
            return Decision::Allow;
        }
        let incoming = if event.action == ClickAction::PlaceOne {
            1
        } else {
            moving.amount
        };
        if off_hand_slot {
            return self.on_off_hand_click(host, event, &moving.item, incoming, origin, cap);
        }
        if origin == Origin::Cursor && !on_player {
            return Decision::Allow;
        }

        let item = moving.item.clone();
        let decision = Self::decide_for(host, player, &item, |current| {
            decide(Some(cap), current, incoming)
        });
        match decision {
            Decision::Deny(_) => {
                event.cancelled = true;
                host.refresh_inventory(player);
                if origin == Origin::Cursor {
                    self.queue.run_next_tick(DeferredAction::SurfaceCursor {
                        player,
                        item: item.clone(),
                    });
                }
                self.tell_blocked(host, player, &item, cap);
            }
            Decision::PartialAdmit { admitted, diverted } => {
                event.cancelled = true;
                host.refresh_inventory(player);
                let transfer = match origin {
                    Origin::Container(container) => PendingPartialTransfer::from_container(
                        player,
                        container,
                        event.slot,
                        item.clone(),
                        admitted,
                        diverted,
                    ),
                    _ => PendingPartialTransfer::from_cursor(
                        player,
                        TransferTarget::Inventory,
                        item.clone(),
                        admitted,
                        diverted,
                    ),
                };
                self.queue.run_next_tick(DeferredAction::PartialTransfer(transfer));
            }
            Decision::Allow => {}
        }
        self.note(Pathway::Click, player, &item, decision)
    }

    /// Clicks targeting the off-hand slot.
    fn on_off_hand_click<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        event: &mut ClickEvent,
        item: &ItemType,
        incoming: u32,
        origin: Origin,
        cap: u32,
    ) -> Decision {
        let player = event.player;
        let decision = if cap == 0 || origin == Origin::Hotbar {
            decide_neutral(Some(cap))
        } else {
            let same_type = host
                .inventory(player)
                .and_then(|inv| inv.off_hand())
                .is_some_and(|s| s.is(item));
            if same_type {
                Decision::Allow
            } else {
                Self::decide_for(host, player, item, |current| {
                    decide(Some(cap), current, incoming)
                })
            }
        };
        match decision {
            Decision::Deny(_) => {
                event.cancelled = true;
                host.refresh_inventory(player);
                self.tell_blocked(host, player, item, cap);
            }
            Decision::PartialAdmit { admitted, diverted } => {
                event.cancelled = true;
                host.refresh_inventory(player);
                self.queue.run_next_tick(DeferredAction::PartialTransfer(
                    PendingPartialTransfer::from_cursor(
                        player,
                        TransferTarget::OffHand,
                        item.clone(),
                        admitted,
                        diverted,
                    ),
                ));
            }
            Decision::Allow => {}
        }
        self.note(Pathway::OffHand, player, item, decision)
    }

    /// Drag of the cursor stack across several slots. Only slots owned by the
    /// player count towards holdings; any overflow refuses the whole drag.
    pub fn on_drag<H: Host + ?Sized>(&mut self, host: &mut H, event: &mut DragEvent) -> Decision {
        if event.cancelled {
            return Decision::Allow;
        }
        let Some(dragged) = event.old_cursor.clone().filter(|s| !s.is_empty()) else {
            return Decision::Allow;
        };
        let item = dragged.item;
        let Some(cap) = self.registry.lookup(&item) else {
            return Decision::Allow;
        };

        let decision = if cap == 0 {
            Decision::Deny(DenyReason::Banned)
        } else {
            let mut into_player = event
                .slots
                .iter()
                .filter(|s| s.owner == SlotOwner::Player)
                .peekable();
            if into_player.peek().is_none() {
                return Decision::Allow;
            }
            let total = into_player
                .filter(|s| s.stack.is(&item))
                .fold(0u32, |acc, s| acc.saturating_add(s.stack.amount));
            Self::decide_for(host, event.player, &item, |current| {
                decide_all_or_nothing(Some(cap), current, total)
            })
        };
        if decision.is_deny() {
            event.cancelled = true;
            self.tell_blocked(host, event.player, &item, cap);
        }
        self.note(Pathway::Drag, event.player, &item, decision)
    }

    /// Inventory close. An illegal cursor stack is taken off the cursor right
    /// away and surfaced on the next tick, ahead of the follow-up sweep.
    pub fn on_close<H: Host + ?Sized>(&mut self, host: &mut H, event: &CloseEvent) -> Decision {
        let player = event.player;
        let cursor = host
            .inventory(player)
            .and_then(|inv| inv.cursor().cloned())
            .filter(|s| !s.is_empty());
        let limited = cursor.and_then(|stack| self.registry.lookup(&stack.item).map(|cap| (stack, cap)));

        let Some((stack, cap)) = limited else {
            self.queue.run_next_tick(DeferredAction::Sweep {
                player,
                reason: SweepReason::AmbiguousCursor,
            });
            return Decision::Allow;
        };

        let item = stack.item.clone();
        let current = self.count(host, player, &item);
        let decision = decide_holding(Some(cap), current);
        if decision.is_deny() {
            if let Some(inv) = host.inventory_mut(player) {
                inv.set_cursor(None);
            }
            host.refresh_inventory(player);
            self.queue.run_next_tick(DeferredAction::SurfaceStack { player, stack });
            self.tell_blocked(host, player, &item, cap);
        }
        self.queue.run_next_tick(DeferredAction::Sweep {
            player,
            reason: SweepReason::ContainerClose,
        });
        self.note(Pathway::Close, player, &item, decision)
    }

    /// Drop key while holding an illegal cursor stack: the gesture is
    /// refused and the cursor stack is surfaced on the next tick instead.
    pub fn on_drop<H: Host + ?Sized>(&mut self, host: &mut H, event: &mut DropEvent) -> Decision {
        if event.cancelled {
            return Decision::Allow;
        }
        let player = event.player;
        let Some(cursor) = host
            .inventory(player)
            .and_then(|inv| inv.cursor().cloned())
            .filter(|s| !s.is_empty())
        else {
            return Decision::Allow;
        };
        let Some(cap) = self.registry.lookup(&cursor.item) else {
            return Decision::Allow;
        };
        let current = self.count(host, player, &cursor.item);
        let decision = decide_holding(Some(cap), current);
        if decision.is_deny() {
            event.cancelled = true;
            self.queue.run_next_tick(DeferredAction::SurfaceCursor {
                player,
                item: cursor.item.clone(),
            });
            self.tell_blocked(host, player, &cursor.item, cap);
        }
        self.note(Pathway::Drop, player, &cursor.item, decision)
    }

    /// Schedule login enforcement once the join has settled.
    pub fn on_join(&mut self, event: &JoinEvent) {
        debug!(
            "scheduling login enforcement for {} in {} ticks",
            event.player, self.settings.login_delay_ticks
        );
        self.queue.run_later(
            self.settings.login_delay_ticks,
            DeferredAction::LoginEnforcement {
                player: event.player,
            },
        );
    }

    // ---------------------------------------------------------------------
    // Reconciliation
    // ---------------------------------------------------------------------

    /// Strip excess of every limited item from one player and send a single
    /// consolidated notice. Returns units removed.
    pub fn sweep_player<H: Host + ?Sized>(&mut self, host: &mut H, player: PlayerId, reason: SweepReason) -> u32 {
        let items: Vec<ItemType> = self
            .registry
            .sorted_entries()
            .into_iter()
            .map(|(item, _)| item)
            .collect();
        let mut total = 0u32;
        for item in &items {
            total = total.saturating_add(excess::drop_excess(host, &self.registry, player, item));
        }
        self.stats.record_sweep();
        if total > 0 {
            self.stats.record_surfaced(total);
            host.send_message(player, &self.messages.dropped(total, reason));
            info!("{} sweep removed {} limited items from {}", reason.as_str(), total, player);
        }
        total
    }

    /// [`Self::sweep_player`] over every online player.
    pub fn sweep_all<H: Host + ?Sized>(&mut self, host: &mut H, reason: SweepReason) -> u32 {
        let mut total = 0u32;
        for player in host.online_players() {
            total = total.saturating_add(self.sweep_player(host, player, reason));
        }
        total
    }

    /// Apply the cap for `item` to every online player now, with a
    /// per-item notice to each affected player.
    pub fn enforce_item<H: Host + ?Sized>(&mut self, host: &mut H, item: &ItemType) -> u32 {
        let Some(cap) = self.registry.lookup(item) else {
            return 0;
        };
        let mut total = 0u32;
        for player in host.online_players() {
            let removed = self.drop_excess(host, player, item);
            if removed > 0 {
                host.send_message(player, &self.messages.dropped_item(item, removed, cap));
                total = total.saturating_add(removed);
            }
        }
        if total > 0 {
            info!("immediate enforcement of {} removed {} items", item, total);
        }
        total
    }

    // ---------------------------------------------------------------------
    // Tick processing
    // ---------------------------------------------------------------------

    /// Advance one tick: run due deferred actions in enqueue order, then any
    /// due recurring job.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.queue.advance();
        for action in self.queue.drain_due() {
            let player = action.player();
            // A captured stack is already off the inventory and lands regardless.
            let captured = matches!(action, DeferredAction::SurfaceStack { .. });
            if !captured && !host.is_online(player) {
                self.stats.record_stale();
                debug!("dropping deferred action for offline {}: {:?}", player, action);
                continue;
            }
            self.execute(host, action);
        }
        for job in self.queue.due_jobs() {
            match job {
                RecurringKind::PeriodicSweep => {
                    self.sweep_all(host, SweepReason::Periodic);
                }
            }
        }
    }

    fn execute<H: Host + ?Sized>(&mut self, host: &mut H, action: DeferredAction) {
        match action {
            DeferredAction::PartialTransfer(transfer) => self.execute_transfer(host, transfer),
            DeferredAction::SurfaceCursor { player, item } => self.surface_cursor(host, player, &item),
            DeferredAction::SurfaceStack { player, stack } => {
                self.stats.record_surfaced(stack.amount);
                host.surface(player, stack);
            }
            DeferredAction::Sweep { player, reason } => {
                self.sweep_player(host, player, reason);
            }
            DeferredAction::LoginEnforcement { player } => {
                self.sweep_player(host, player, SweepReason::Login);
            }
        }
    }

    fn surface_cursor<H: Host + ?Sized>(&mut self, host: &mut H, player: PlayerId, item: &ItemType) {
        let stack = {
            let Some(inv) = host.inventory_mut(player) else {
                return;
            };
            let Some(stack) = inv.cursor().filter(|s| s.is(item)).cloned() else {
                return;
            };
            inv.set_cursor(None);
            stack
        };
        self.stats.record_surfaced(stack.amount);
        host.surface(player, stack);
        host.refresh_inventory(player);
    }

    /// Carry out a partial transfer, re-validating the source and the
    /// headroom first.
    fn execute_transfer<H: Host + ?Sized>(&mut self, host: &mut H, transfer: PendingPartialTransfer) {
        let PendingPartialTransfer {
            player,
            source,
            target,
            item,
            admitted,
            disposition,
            ..
        } = transfer;

        let Some(current) = holdings::count_for(host, player, &item) else {
            return;
        };
        let cap = self.registry.lookup(&item);
        let headroom = cap.map_or(admitted, |cap| cap.saturating_sub(current));

        let available = match source {
            TransferSource::Cursor => host
                .inventory(player)
                .and_then(|inv| inv.cursor())
                .filter(|s| s.is(&item))
                .map_or(0, |s| s.amount),
            TransferSource::Container { container, slot } => host
                .container_item(container, slot)
                .filter(|s| s.is(&item))
                .map_or(0, |s| s.amount),
        };
        if available == 0 {
            debug!("partial transfer of {} for {}: source no longer holds it", item, player);
            return;
        }

        let admit = admitted.min(headroom).min(available);
        let released = match disposition {
            RemainderDisposition::ReturnToSource => admit,
            RemainderDisposition::DropInWorld => available,
        };
        let kept = (available - released > 0).then(|| ItemStack::new(item.clone(), available - released));
        match source {
            TransferSource::Cursor => {
                if let Some(inv) = host.inventory_mut(player) {
                    inv.set_cursor(kept);
                }
            }
            TransferSource::Container { container, slot } => host.set_container_item(container, slot, kept),
        }

        let leftover = if admit > 0 {
            place(host, player, target, ItemStack::new(item.clone(), admit))
        } else {
            0
        };
        let added = admit - leftover;
        let to_world = released - admit + leftover;
        if to_world > 0 {
            self.stats.record_surfaced(to_world);
            host.surface(player, ItemStack::new(item.clone(), to_world));
        }
        self.stats.record_partial_units(added);
        host.refresh_inventory(player);

        if let Some(cap) = cap.filter(|_| added > 0) {
            host.send_message(player, &self.messages.partial_added(&item, added, cap));
        }
        debug!(
            "partial transfer of {} for {}: added {}, surfaced {}",
            item, player, added, to_world
        );
    }

    // ---------------------------------------------------------------------
    // Administration and lifecycle
    // ---------------------------------------------------------------------

    /// Run an `/itemlimit` command: apply it to the registry, broadcast its
    /// announcements and, with immediate ban enforcement, strip excess right
    /// away. Returns the lines for the sender.
    pub fn run_command<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        catalog: &dyn ItemCatalog,
        sender: &CommandSender,
        args: &[&str],
    ) -> Vec<String> {
        let ctx = CommandContext {
            catalog,
            messages: &self.messages,
            max_cap: self.settings.max_cap,
            page_size: self.settings.list_page_size,
        };
        let outcome = handle_limit_command(&mut self.registry, &ctx, sender, args);
        self.apply_outcome(host, outcome)
    }

    /// Tab-completion candidates for a partially typed `/itemlimit` command.
    pub fn complete_command(&self, catalog: &dyn ItemCatalog, args: &[&str]) -> Vec<String> {
        commands::complete(&self.registry, catalog, self.settings.list_page_size, args)
    }

    pub fn apply_outcome<H: Host + ?Sized>(&mut self, host: &mut H, outcome: CommandOutcome) -> Vec<String> {
        for line in &outcome.broadcasts {
            host.broadcast(line);
        }
        if let Some(item) = &outcome.enforce {
            if self.settings.ban_enforcement == BanEnforcement::Immediate {
                self.enforce_item(host, item);
            }
        }
        outcome.replies
    }

    /// Stop the periodic sweep and flush the registry.
    pub fn shutdown(&mut self) -> Result<(), LimitError> {
        if let Some(id) = self.periodic.take() {
            self.queue.cancel_recurring(id);
        }
        self.registry.save()
    }
}

/// Put `stack` into the player's inventory at `target`; returns how many
/// units did not fit.
fn place<H: Host + ?Sized>(host: &mut H, player: PlayerId, target: TransferTarget, stack: ItemStack) -> u32 {
    let amount = stack.amount;
    let Some(inv) = host.inventory_mut(player) else {
        return amount;
    };
    if target == TransferTarget::OffHand && inv.off_hand().is_none() {
        inv.set_off_hand(Some(stack));
        return 0;
    }
    inv.add_item(stack).map_or(0, |rest| rest.amount)
}
