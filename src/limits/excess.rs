//! Excess resolver: strips holdings above the cap and surfaces them into the
//! world at the player's feet.

use crate::host::{Host, Inventory};
use crate::limits::holdings::count;
use crate::limits::registry::LimitRegistry;
use crate::limits::types::{ItemStack, ItemType, PlayerId, COUNTED_REGIONS};

/// Remove units of `item` above `cap` from `inventory`, draining bulk storage
/// (ascending slot order) before armor before off-hand. Whole stacks are
/// taken when they fit in the remaining excess; otherwise the stack is split
/// in place. Returns the removed stacks.
pub fn take_excess(inventory: &mut dyn Inventory, item: &ItemType, cap: u32) -> Vec<ItemStack> {
    let have = count(inventory, item);
    if have <= cap {
        return Vec::new();
    }
    let to_remove = have - cap;
    let mut removed = 0u32;
    let mut taken = Vec::new();

    'regions: for region in COUNTED_REGIONS {
        for index in 0..inventory.slot_count(region) {
            if removed >= to_remove {
                break 'regions;
            }
            let Some(stack) = inventory.item(region, index).filter(|s| s.is(item)).cloned() else {
                continue;
            };
            let remaining = to_remove - removed;
            if stack.amount <= remaining {
                inventory.set_item(region, index, None);
                removed += stack.amount;
                taken.push(stack);
            } else {
                let mut kept = stack;
                let portion = kept.split(remaining);
                inventory.set_item(region, index, Some(kept));
                removed += portion.amount;
                taken.push(portion);
            }
        }
    }
    taken
}

/// Enforce the registered cap for `item` on `player`, surfacing the excess.
/// Returns the number of units surfaced (0 when unlimited or within the cap).
pub fn drop_excess<H: Host + ?Sized>(
    host: &mut H,
    registry: &LimitRegistry,
    player: PlayerId,
    item: &ItemType,
) -> u32 {
    let Some(cap) = registry.lookup(item) else {
        return 0;
    };
    let taken = match host.inventory_mut(player) {
        Some(inventory) => take_excess(inventory, item, cap),
        None => return 0,
    };
    if taken.is_empty() {
        return 0;
    }
    let total = taken.iter().map(|s| s.amount).sum();
    for stack in taken {
        host.surface(player, stack);
    }
    host.refresh_inventory(player);
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryServer;
    use crate::limits::types::Region;
    use crate::storage::MemoryLimitStore;

    const P: PlayerId = PlayerId(1);

    fn setup(cap: u32) -> (MemoryServer, LimitRegistry) {
        let mut server = MemoryServer::new();
        server.add_player(P, "alice");
        let mut registry = LimitRegistry::new(Box::new(MemoryLimitStore::new()));
        registry.add_or_update(ItemType::new("ENDER_PEARL"), cap);
        (server, registry)
    }

    #[test]
    fn unregistered_item_is_a_no_op() {
        let (mut server, registry) = setup(1);
        server.put(P, Region::Storage, 0, ItemStack::of("DIRT", 64));
        assert_eq!(drop_excess(&mut server, &registry, P, &ItemType::new("DIRT")), 0);
        assert!(server.surfaced.is_empty());
    }

    #[test]
    fn drains_storage_before_armor_and_off_hand() {
        let (mut server, registry) = setup(2);
        server.put(P, Region::Storage, 4, ItemStack::of("ENDER_PEARL", 3));
        server.put(P, Region::Storage, 9, ItemStack::of("ENDER_PEARL", 2));
        server.put(P, Region::Armor, 0, ItemStack::of("ENDER_PEARL", 1));
        server.put(P, Region::OffHand, 0, ItemStack::of("ENDER_PEARL", 1));

        let removed = drop_excess(&mut server, &registry, P, &ItemType::new("ENDER_PEARL"));
        assert_eq!(removed, 5);
        assert_eq!(server.holdings(P, "ENDER_PEARL"), 2);
        let inv = &server.player(P).expect("player").inventory;
        assert!(inv.item(Region::Storage, 4).is_none());
        assert!(inv.item(Region::Storage, 9).is_none());
        assert!(inv.item(Region::Armor, 0).is_some());
        assert!(inv.off_hand().is_some());
        assert_eq!(server.surfaced_total(P, "ENDER_PEARL"), 5);
    }

    #[test]
    fn splits_partial_stack_in_place() {
        let (mut server, registry) = setup(10);
        server.put(P, Region::Storage, 0, ItemStack::of("ENDER_PEARL", 16));
        let removed = drop_excess(&mut server, &registry, P, &ItemType::new("ENDER_PEARL"));
        assert_eq!(removed, 6);
        let inv = &server.player(P).expect("player").inventory;
        assert_eq!(inv.item(Region::Storage, 0).map(|s| s.amount), Some(10));
        assert_eq!(server.surfaced, vec![(P, ItemStack::of("ENDER_PEARL", 6))]);
    }

    #[test]
    fn reaches_off_hand_when_storage_is_short() {
        let (mut server, registry) = setup(0);
        server.put(P, Region::Storage, 0, ItemStack::of("ENDER_PEARL", 1));
        server.put(P, Region::OffHand, 0, ItemStack::of("ENDER_PEARL", 4));
        let removed = drop_excess(&mut server, &registry, P, &ItemType::new("ENDER_PEARL"));
        assert_eq!(removed, 5);
        assert_eq!(server.holdings(P, "ENDER_PEARL"), 0);
    }

    #[test]
    fn second_call_removes_nothing() {
        let (mut server, registry) = setup(3);
        server.put(P, Region::Storage, 0, ItemStack::of("ENDER_PEARL", 8));
        let pearl = ItemType::new("ENDER_PEARL");
        assert_eq!(drop_excess(&mut server, &registry, P, &pearl), 5);
        assert_eq!(drop_excess(&mut server, &registry, P, &pearl), 0);
    }
}
