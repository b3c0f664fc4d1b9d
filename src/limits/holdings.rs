//! Holdings counter: how many units of an item type a player holds right now.
//!
//! Always recomputed from the live inventory; nothing is cached between
//! calls, so two calls may disagree if the host mutated the inventory in
//! between.

use crate::host::{Host, Inventory};
use crate::limits::types::{ItemType, PlayerId, COUNTED_REGIONS};

/// Sum of `item` across bulk storage, armor and off-hand. The cursor is not
/// counted. The sentinel type always counts zero.
pub fn count(inventory: &dyn Inventory, item: &ItemType) -> u32 {
    if item.is_air() {
        return 0;
    }
    let mut total: u32 = 0;
    for region in COUNTED_REGIONS {
        for index in 0..inventory.slot_count(region) {
            if let Some(stack) = inventory.item(region, index) {
                if stack.is(item) {
                    total = total.saturating_add(stack.amount);
                }
            }
        }
    }
    total
}

/// [`count`] for a player looked up through the host; `None` when the host
/// has no inventory for them.
pub fn count_for<H: Host + ?Sized>(host: &H, player: PlayerId, item: &ItemType) -> Option<u32> {
    host.inventory(player).map(|inv| count(inv, item))
}
