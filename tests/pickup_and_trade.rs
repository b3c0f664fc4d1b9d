mod common;

use common::{engine, server, STEVE};
use itemlimit::limits::events::{
    ClickAction, ClickEvent, ClickType, ClickedInventory, HandSwapEvent, PickupEvent, ViewKind,
};
use itemlimit::limits::{ContainerId, Decision, DenyReason, ItemStack, PlayerId, Region};
use itemlimit::metrics::EnforcementStats;

#[test]
fn pickup_that_would_overshoot_is_refused_whole() {
    let mut engine = engine(&[("golden_apple", 4)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("golden_apple", 3));

    let mut event = PickupEvent::new(STEVE, ItemStack::of("golden_apple", 3));
    let decision = engine.on_pickup(&mut host, &mut event);

    assert_eq!(decision, Decision::Deny(DenyReason::WouldExceed { remaining: 1 }));
    assert!(event.cancelled);
    assert_eq!(host.holdings(STEVE, "golden_apple"), 3);
    assert_eq!(
        host.messages_for(STEVE),
        vec!["You cannot have more than 4 Golden Apple!"]
    );
}

#[test]
fn pickup_within_headroom_is_allowed() {
    let mut engine = engine(&[("golden_apple", 4)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("golden_apple", 1));

    let mut event = PickupEvent::new(STEVE, ItemStack::of("golden_apple", 3));
    assert_eq!(engine.on_pickup(&mut host, &mut event), Decision::Allow);
    assert!(!event.cancelled);
    assert!(host.messages.is_empty());
}

#[test]
fn banned_item_cannot_be_picked_up_even_with_none_held() {
    let mut engine = engine(&[("totem_of_undying", 0)]);
    let mut host = server();

    let mut event = PickupEvent::new(STEVE, ItemStack::of("totem_of_undying", 1));
    assert_eq!(
        engine.on_pickup(&mut host, &mut event),
        Decision::Deny(DenyReason::Banned)
    );
    assert!(event.cancelled);
    assert_eq!(host.messages_for(STEVE), vec!["You cannot have Totem Of Undying!"]);
}

#[test]
fn unlimited_items_pass_every_pathway() {
    let mut engine = engine(&[]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("dirt", 2000));

    let mut pickup = PickupEvent::new(STEVE, ItemStack::of("dirt", 64));
    assert_eq!(engine.on_pickup(&mut host, &mut pickup), Decision::Allow);

    let mut click = ClickEvent::new(
        STEVE,
        ViewKind::Container(ContainerId(1)),
        Some(ClickedInventory::Container(ContainerId(1))),
        0,
        ClickAction::MoveToOtherInventory,
        ClickType::ShiftLeft,
    )
    .with_current(ItemStack::of("dirt", 64));
    assert_eq!(engine.on_click(&mut host, &mut click), Decision::Allow);
    assert!(!click.cancelled);

    assert!(host.messages.is_empty());
    assert_eq!(engine.stats(), &EnforcementStats::default());
}

#[test]
fn unreadable_inventory_fails_safe() {
    let mut engine = engine(&[("diamond", 10)]);
    let mut host = server();
    let stranger = PlayerId(99);

    let mut event = PickupEvent::new(stranger, ItemStack::of("diamond", 1));
    assert_eq!(
        engine.on_pickup(&mut host, &mut event),
        Decision::Deny(DenyReason::Unverifiable)
    );
    assert!(event.cancelled);
}

#[test]
fn hand_swap_with_banned_item_is_refused() {
    let mut engine = engine(&[("totem_of_undying", 0), ("shield", 1)]);
    let mut host = server();
    host.put(STEVE, Region::Storage, 0, ItemStack::of("totem_of_undying", 1));

    let mut event = HandSwapEvent::new(STEVE, None, Some(ItemStack::of("totem_of_undying", 1)));
    assert!(engine.on_hand_swap(&mut host, &mut event).is_deny());
    assert!(event.cancelled);

    // A capped (not banned) item never changes holdings by swapping hands.
    let mut event = HandSwapEvent::new(STEVE, Some(ItemStack::of("shield", 1)), None);
    assert_eq!(engine.on_hand_swap(&mut host, &mut event), Decision::Allow);
    assert!(!event.cancelled);
}

fn trade_click(result: ItemStack) -> ClickEvent {
    ClickEvent::new(
        STEVE,
        ViewKind::Merchant(ContainerId(7)),
        Some(ClickedInventory::Container(ContainerId(7))),
        2,
        ClickAction::PickupAll,
        ClickType::Left,
    )
    .with_current(result)
}

#[test]
fn trade_result_that_overshoots_reports_remaining_headroom() {
    let mut engine = engine(&[("emerald", 10)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("emerald", 8));

    let mut event = trade_click(ItemStack::of("emerald", 4));
    assert_eq!(
        engine.on_click(&mut host, &mut event),
        Decision::Deny(DenyReason::WouldExceed { remaining: 2 })
    );
    assert!(event.cancelled);
    assert_eq!(
        host.messages_for(STEVE),
        vec!["This trade would exceed your limit! You can only have 2 more Emerald (limit: 10)"]
    );
}

#[test]
fn trade_messages_follow_the_refusal_reason() {
    let mut engine = engine(&[("emerald", 10), ("elytra", 0)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("emerald", 10));

    let mut at_cap = trade_click(ItemStack::of("emerald", 1));
    assert_eq!(
        engine.on_click(&mut host, &mut at_cap),
        Decision::Deny(DenyReason::AtLimit)
    );
    let mut banned = trade_click(ItemStack::of("elytra", 1));
    assert_eq!(
        engine.on_click(&mut host, &mut banned),
        Decision::Deny(DenyReason::Banned)
    );
    assert_eq!(
        host.messages_for(STEVE),
        vec![
            "You cannot trade for Emerald - you already have the maximum (10)!",
            "You cannot trade for Elytra - it is banned!",
        ]
    );
}

#[test]
fn only_the_trade_result_slot_is_treated_as_a_trade() {
    let mut engine = engine(&[("emerald", 10)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("emerald", 10));

    // Taking back an ingredient from an input slot leaves the player's view.
    let mut event = ClickEvent::new(
        STEVE,
        ViewKind::Merchant(ContainerId(7)),
        Some(ClickedInventory::Container(ContainerId(7))),
        0,
        ClickAction::PickupAll,
        ClickType::Left,
    )
    .with_current(ItemStack::of("emerald", 5));
    assert_eq!(engine.on_click(&mut host, &mut event), Decision::Allow);
}

#[test]
fn creative_view_is_exempt() {
    let mut engine = engine(&[("diamond", 0)]);
    let mut host = server();

    let mut event = ClickEvent::new(
        STEVE,
        ViewKind::Creative,
        Some(ClickedInventory::Player),
        5,
        ClickAction::PlaceAll,
        ClickType::Left,
    )
    .with_cursor(ItemStack::of("diamond", 64));
    assert_eq!(engine.on_click(&mut host, &mut event), Decision::Allow);
    assert!(!event.cancelled);
}

#[test]
fn denials_are_counted_per_pathway() {
    let mut engine = engine(&[("diamond", 1)]);
    let mut host = server();
    host.give(STEVE, ItemStack::of("diamond", 1));

    for _ in 0..3 {
        let mut event = PickupEvent::new(STEVE, ItemStack::of("diamond", 1));
        engine.on_pickup(&mut host, &mut event);
    }
    let mut trade = trade_click(ItemStack::of("diamond", 1));
    engine.on_click(&mut host, &mut trade);

    let stats = engine.stats();
    assert_eq!(stats.denied, 4);
    assert_eq!(stats.denials_for(itemlimit::limits::events::Pathway::Pickup), 3);
    assert_eq!(stats.denials_for(itemlimit::limits::events::Pathway::Trade), 1);
}
