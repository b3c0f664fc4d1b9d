mod common;

use common::{engine, engine_with, quiet_settings, run_ticks, server, ALEX, STEVE};
use itemlimit::host::{Host, Inventory};
use itemlimit::limits::events::{
    ClickAction, ClickEvent, ClickType, ClickedInventory, CloseEvent, DropEvent, JoinEvent,
    ViewKind,
};
use itemlimit::limits::{
    ContainerId, Decision, DenyReason, EngineSettings, ItemStack, ItemType, Region, SweepReason,
};

#[test]
fn login_enforcement_runs_after_the_join_delay() {
    let mut engine = engine(&[("ender_pearl", 5)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("ender_pearl", 20));

    engine.on_join(&JoinEvent { player: STEVE });
    run_ticks(&mut engine, &mut host, 19);
    assert_eq!(host.holdings(STEVE, "ender_pearl"), 20);

    run_ticks(&mut engine, &mut host, 1);
    assert_eq!(host.holdings(STEVE, "ender_pearl"), 5);
    assert_eq!(host.surfaced_total(STEVE, "ender_pearl"), 15);
    assert_eq!(
        host.messages_for(STEVE),
        vec!["Dropped 15 limited items at your feet!"]
    );
}

#[test]
fn login_enforcement_is_dropped_if_the_player_left() {
    let mut engine = engine(&[("ender_pearl", 5)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("ender_pearl", 20));

    engine.on_join(&JoinEvent { player: STEVE });
    run_ticks(&mut engine, &mut host, 5);
    host.set_online(STEVE, false);
    run_ticks(&mut engine, &mut host, 20);

    assert_eq!(host.holdings(STEVE, "ender_pearl"), 20);
    assert!(host.surfaced.is_empty());
    assert_eq!(engine.stats().stale_dropped, 1);
    assert!(engine.queue().is_empty());
}

#[test]
fn periodic_sweep_reconciles_every_online_player() {
    let settings = EngineSettings {
        sweep_interval_ticks: 100,
        sweep_initial_delay_ticks: 100,
        ..quiet_settings()
    };
    let (mut engine, _) = engine_with(&[("golden_apple", 4)], settings);
    let mut host = server();
    host.add_player(ALEX, "Alex");
    host.give(STEVE, ItemStack::of("golden_apple", 12));
    host.give(ALEX, ItemStack::of("golden_apple", 2));

    run_ticks(&mut engine, &mut host, 99);
    assert_eq!(host.holdings(STEVE, "golden_apple"), 12);

    run_ticks(&mut engine, &mut host, 1);
    assert_eq!(host.holdings(STEVE, "golden_apple"), 4);
    assert_eq!(host.holdings(ALEX, "golden_apple"), 2);
    assert_eq!(
        host.messages_for(STEVE),
        vec!["Dropped 8 excess limited items at your feet!"]
    );
    assert!(host.messages_for(ALEX).is_empty());

    // Excess gained later is caught by the next pass.
    host.give(STEVE, ItemStack::of("golden_apple", 1));
    run_ticks(&mut engine, &mut host, 100);
    assert_eq!(host.holdings(STEVE, "golden_apple"), 4);
    assert_eq!(engine.stats().units_surfaced, 9);
}

#[test]
fn sweep_counts_armor_and_off_hand_and_sends_one_notice() {
    let mut engine = engine(&[("diamond", 2), ("emerald", 1)]);
    let mut host = server();
    host.put(STEVE, Region::Storage, 0, ItemStack::of("diamond", 3));
    host.put(STEVE, Region::Armor, 0, ItemStack::of("diamond", 1));
    host.put(STEVE, Region::OffHand, 0, ItemStack::of("emerald", 3));

    let removed = engine.sweep_player(&mut host, STEVE, SweepReason::Manual);

    assert_eq!(removed, 4);
    assert_eq!(host.holdings(STEVE, "diamond"), 2);
    assert_eq!(host.holdings(STEVE, "emerald"), 1);
    // Bulk storage drains first, so the worn diamond stays put.
    let inv = host.inventory(STEVE).unwrap();
    assert_eq!(inv.item(Region::Armor, 0), Some(&ItemStack::of("diamond", 1)));
    assert_eq!(inv.item(Region::Storage, 0), Some(&ItemStack::of("diamond", 1)));
    assert_eq!(
        host.messages_for(STEVE),
        vec!["Dropped 4 excess limited items at your feet!"]
    );
}

#[test]
fn cursor_is_not_counted_until_it_lands() {
    let mut engine = engine(&[("diamond", 2)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("diamond", 2));
    host.set_cursor(STEVE, Some(ItemStack::of("diamond", 30)));

    assert_eq!(engine.count(&host, STEVE, &ItemType::new("diamond")), 2);
    assert_eq!(engine.sweep_player(&mut host, STEVE, SweepReason::Manual), 0);
}

#[test]
fn closing_with_an_illegal_cursor_stack_clears_it_and_surfaces_next_tick() {
    let mut engine = engine(&[("elytra", 0)]);
    let mut host = server();
    host.set_cursor(STEVE, Some(ItemStack::of("elytra", 1)));
    host.put(STEVE, Region::Storage, 9, ItemStack::of("elytra", 1));

    let decision = engine.on_close(&mut host, &CloseEvent { player: STEVE });

    assert_eq!(decision, Decision::Deny(DenyReason::Banned));
    assert_eq!(host.cursor(STEVE), None);
    assert!(host.surfaced.is_empty());
    assert_eq!(host.messages_for(STEVE), vec!["You cannot have Elytra!"]);

    // The captured stack lands first, then the sweep clears what was stored.
    run_ticks(&mut engine, &mut host, 1);
    assert_eq!(host.surfaced[0], (STEVE, ItemStack::of("elytra", 1)));
    assert_eq!(host.holdings(STEVE, "elytra"), 0);
    assert_eq!(host.surfaced_total(STEVE, "elytra"), 2);
}

#[test]
fn closing_with_an_unlimited_cursor_still_schedules_a_sweep() {
    let mut engine = engine(&[("diamond", 2)]);
    let mut host = server();
    host.set_cursor(STEVE, Some(ItemStack::of("dirt", 64)));
    host.put(STEVE, Region::Storage, 0, ItemStack::of("diamond", 5));

    assert_eq!(
        engine.on_close(&mut host, &CloseEvent { player: STEVE }),
        Decision::Allow
    );
    assert_eq!(host.holdings(STEVE, "diamond"), 5);
    assert_eq!(engine.queue().pending(), 1);

    run_ticks(&mut engine, &mut host, 1);
    assert_eq!(host.holdings(STEVE, "diamond"), 2);
    assert_eq!(host.cursor(STEVE), Some(ItemStack::of("dirt", 64)));
}

#[test]
fn cursor_stack_taken_on_close_lands_even_if_the_player_left() {
    let mut engine = engine(&[("elytra", 0)]);
    let mut host = server();
    host.set_cursor(STEVE, Some(ItemStack::of("elytra", 1)));

    engine.on_close(&mut host, &CloseEvent { player: STEVE });
    host.set_online(STEVE, false);
    run_ticks(&mut engine, &mut host, 1);

    assert_eq!(host.surfaced_total(STEVE, "elytra"), 1);
    assert_eq!(engine.stats().units_surfaced, 1);
    // Only the follow-up sweep is stale.
    assert_eq!(engine.stats().stale_dropped, 1);
}

#[test]
fn drop_key_with_an_illegal_cursor_is_refused_and_surfaced() {
    let mut engine = engine(&[("diamond", 3)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("diamond", 3));
    host.set_cursor(STEVE, Some(ItemStack::of("diamond", 2)));

    let mut event = DropEvent::new(STEVE);
    assert_eq!(
        engine.on_drop(&mut host, &mut event),
        Decision::Deny(DenyReason::AtLimit)
    );
    assert!(event.cancelled);

    run_ticks(&mut engine, &mut host, 1);
    assert_eq!(host.cursor(STEVE), None);
    assert_eq!(host.surfaced_total(STEVE, "diamond"), 2);
}

#[test]
fn drop_key_below_the_cap_is_left_alone() {
    let mut engine = engine(&[("diamond", 3)]);
    let mut host = server();
    host.set_cursor(STEVE, Some(ItemStack::of("diamond", 2)));

    let mut event = DropEvent::new(STEVE);
    assert_eq!(engine.on_drop(&mut host, &mut event), Decision::Allow);
    assert!(!event.cancelled);
    assert!(engine.queue().is_empty());
}

#[test]
fn partial_transfer_for_a_departed_player_is_discarded() {
    let mut engine = engine(&[("diamond", 10)]);
    let mut host = server();
    let chest = ContainerId(4);
    host.give(STEVE, ItemStack::of("diamond", 8));
    host.add_container(chest, 27);
    host.fill_container(chest, 0, ItemStack::of("diamond", 5));

    let mut event = ClickEvent::new(
        STEVE,
        ViewKind::Container(chest),
        Some(ClickedInventory::Container(chest)),
        0,
        ClickAction::MoveToOtherInventory,
        ClickType::ShiftLeft,
    )
    .with_current(ItemStack::of("diamond", 5));
    engine.on_click(&mut host, &mut event);
    host.set_online(STEVE, false);
    run_ticks(&mut engine, &mut host, 1);

    assert_eq!(engine.stats().stale_dropped, 1);
    assert_eq!(host.container_item(chest, 0), Some(ItemStack::of("diamond", 5)));
    assert_eq!(host.holdings(STEVE, "diamond"), 8);
}

#[test]
fn deferred_actions_run_in_enqueue_order() {
    let mut engine = engine(&[("diamond", 10)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("diamond", 8));
    host.add_container(ContainerId(1), 27);
    host.fill_container(ContainerId(1), 0, ItemStack::of("diamond", 5));
    host.fill_container(ContainerId(1), 1, ItemStack::of("diamond", 5));

    for slot in [0, 1] {
        let mut event = ClickEvent::new(
            STEVE,
            ViewKind::Container(ContainerId(1)),
            Some(ClickedInventory::Container(ContainerId(1))),
            slot,
            ClickAction::MoveToOtherInventory,
            ClickType::ShiftLeft,
        )
        .with_current(ItemStack::of("diamond", 5));
        engine.on_click(&mut host, &mut event);
    }
    run_ticks(&mut engine, &mut host, 1);

    // The first transfer used the headroom; the second found none.
    assert_eq!(host.holdings(STEVE, "diamond"), 10);
    assert_eq!(host.container_item(ContainerId(1), 0), Some(ItemStack::of("diamond", 3)));
    assert_eq!(host.container_item(ContainerId(1), 1), Some(ItemStack::of("diamond", 5)));
    assert_eq!(host.messages_for(STEVE), vec!["Added 2 Diamond (max: 10)"]);
}
