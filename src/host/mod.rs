//! Contracts the limiter consumes from the game server that embeds it.
//!
//! The host owns players, inventories, containers, and the world; the
//! limiter only reads and mutates them through these traits and never
//! caches inventory contents across calls.
//!
//! [`memory::MemoryServer`] is a complete in-process implementation used by
//! the test-suite and handy for embedding in simulations.

pub mod memory;

use std::collections::BTreeSet;

use crate::limits::types::{ContainerId, ItemStack, ItemType, PlayerId, Region};

/// Slot-level access to one player's inventory.
pub trait Inventory {
    /// Number of slots in `region` (the off-hand region has one).
    fn slot_count(&self, region: Region) -> usize;

    /// Stack at `index` of `region`, `None` for an empty or out-of-range slot.
    fn item(&self, region: Region, index: usize) -> Option<&ItemStack>;

    fn set_item(&mut self, region: Region, index: usize, stack: Option<ItemStack>);

    /// Stack currently held on the cursor.
    fn cursor(&self) -> Option<&ItemStack>;

    fn set_cursor(&mut self, stack: Option<ItemStack>);

    /// Adds `stack` to bulk storage, merging into matching stacks first and
    /// then filling empty slots. Returns whatever did not fit.
    fn add_item(&mut self, stack: ItemStack) -> Option<ItemStack>;

    fn off_hand(&self) -> Option<&ItemStack> {
        self.item(Region::OffHand, 0)
    }

    fn set_off_hand(&mut self, stack: Option<ItemStack>) {
        self.set_item(Region::OffHand, 0, stack);
    }
}

/// Text delivery to players.
pub trait Notifier {
    fn send_message(&mut self, player: PlayerId, message: &str);

    fn broadcast(&mut self, message: &str);
}

/// Everything else the limiter needs from the server: player liveness,
/// inventories, open containers, and placing items into the world.
pub trait Host: Notifier {
    fn is_online(&self, player: PlayerId) -> bool;

    fn online_players(&self) -> Vec<PlayerId>;

    fn inventory(&self, player: PlayerId) -> Option<&dyn Inventory>;

    fn inventory_mut(&mut self, player: PlayerId) -> Option<&mut dyn Inventory>;

    fn container_item(&self, container: ContainerId, slot: usize) -> Option<ItemStack>;

    fn set_container_item(&mut self, container: ContainerId, slot: usize, stack: Option<ItemStack>);

    /// Places `stack` at the player's position as a freely collectible entity.
    fn surface(&mut self, player: PlayerId, stack: ItemStack);

    /// Re-sends the player's inventory view after a cancelled interaction.
    fn refresh_inventory(&mut self, _player: PlayerId) {}
}

/// Resolves administrator-typed names to item types.
pub trait ItemCatalog {
    /// Returns the item type for `name` if the catalog knows it. The
    /// sentinel may be returned; callers reject it separately.
    fn resolve(&self, name: &str) -> Option<ItemType>;

    /// All known item names, used for tab completion.
    fn item_names(&self) -> Vec<String>;
}

/// Accepts any identifier made of `A-Z`, `0-9` and `_`.
///
/// Used by the offline CLI where no server catalog is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCatalog;

impl ItemCatalog for OpenCatalog {
    fn resolve(&self, name: &str) -> Option<ItemType> {
        let item = ItemType::new(name);
        let valid = !item.name().is_empty()
            && item
                .name()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        valid.then_some(item)
    }

    fn item_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Fixed set of known item names.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    names: BTreeSet<String>,
}

impl StaticCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| ItemType::new(n.as_ref()).name().to_string())
                .collect(),
        }
    }
}

impl ItemCatalog for StaticCatalog {
    fn resolve(&self, name: &str) -> Option<ItemType> {
        let item = ItemType::new(name);
        (item.is_air() || self.names.contains(item.name())).then_some(item)
    }

    fn item_names(&self) -> Vec<String> {
        self.names
            .iter()
            .filter(|n| n.as_str() != ItemType::AIR_NAME)
            .cloned()
            .collect()
    }
}
