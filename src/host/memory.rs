//! In-memory server implementing every host contract.
//!
//! Records everything the limiter does to the outside world (items surfaced,
//! messages, broadcasts, inventory refreshes) so callers can assert on it.

use std::collections::{BTreeMap, HashMap};

use super::{Host, Inventory, Notifier};
use crate::limits::holdings;
use crate::limits::types::{
    ContainerId, ItemStack, ItemType, PlayerId, Region, ARMOR_SLOTS, DEFAULT_MAX_STACK,
    STORAGE_SLOTS,
};

/// Plain slot-array inventory with the standard player layout.
#[derive(Debug, Clone)]
pub struct MemoryInventory {
    storage: Vec<Option<ItemStack>>,
    armor: Vec<Option<ItemStack>>,
    off_hand: Option<ItemStack>,
    cursor: Option<ItemStack>,
    max_stack: u32,
}

impl Default for MemoryInventory {
    fn default() -> Self {
        Self {
            storage: vec![None; STORAGE_SLOTS],
            armor: vec![None; ARMOR_SLOTS],
            off_hand: None,
            cursor: None,
            max_stack: DEFAULT_MAX_STACK,
        }
    }
}

impl MemoryInventory {
    pub fn with_max_stack(max_stack: u32) -> Self {
        Self {
            max_stack: max_stack.max(1),
            ..Self::default()
        }
    }

    fn region(&self, region: Region) -> &[Option<ItemStack>] {
        match region {
            Region::Storage => &self.storage,
            Region::Armor => &self.armor,
            Region::OffHand => std::slice::from_ref(&self.off_hand),
        }
    }

    fn region_mut(&mut self, region: Region) -> &mut [Option<ItemStack>] {
        match region {
            Region::Storage => &mut self.storage,
            Region::Armor => &mut self.armor,
            Region::OffHand => std::slice::from_mut(&mut self.off_hand),
        }
    }
}

fn normalise(stack: Option<ItemStack>) -> Option<ItemStack> {
    stack.filter(|s| !s.is_empty())
}

impl Inventory for MemoryInventory {
    fn slot_count(&self, region: Region) -> usize {
        self.region(region).len()
    }

    fn item(&self, region: Region, index: usize) -> Option<&ItemStack> {
        self.region(region).get(index).and_then(|s| s.as_ref())
    }

    fn set_item(&mut self, region: Region, index: usize, stack: Option<ItemStack>) {
        if let Some(slot) = self.region_mut(region).get_mut(index) {
            *slot = normalise(stack);
        }
    }

    fn cursor(&self) -> Option<&ItemStack> {
        self.cursor.as_ref()
    }

    fn set_cursor(&mut self, stack: Option<ItemStack>) {
        self.cursor = normalise(stack);
    }

    fn add_item(&mut self, mut stack: ItemStack) -> Option<ItemStack> {
        if stack.is_empty() {
            return None;
        }
        let max = self.max_stack;
        for slot in self.storage.iter_mut().flatten() {
            if slot.item == stack.item && slot.amount < max {
                let moved = (max - slot.amount).min(stack.amount);
                slot.amount += moved;
                stack.amount -= moved;
                if stack.amount == 0 {
                    return None;
                }
            }
        }
        for slot in self.storage.iter_mut().filter(|s| s.is_none()) {
            let placed = stack.split(max);
            *slot = Some(placed);
            if stack.amount == 0 {
                return None;
            }
        }
        Some(stack)
    }
}

/// A player known to the [`MemoryServer`].
#[derive(Debug, Clone)]
pub struct MemoryPlayer {
    pub name: String,
    pub online: bool,
    pub inventory: MemoryInventory,
}

#[derive(Debug, Default)]
pub struct MemoryServer {
    players: BTreeMap<PlayerId, MemoryPlayer>,
    containers: HashMap<ContainerId, Vec<Option<ItemStack>>>,
    /// Every stack placed into the world, in order.
    pub surfaced: Vec<(PlayerId, ItemStack)>,
    /// Every direct message, in order.
    pub messages: Vec<(PlayerId, String)>,
    pub broadcasts: Vec<String>,
    pub refreshes: Vec<PlayerId>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an online player with an empty inventory.
    pub fn add_player(&mut self, id: PlayerId, name: &str) {
        self.players.insert(
            id,
            MemoryPlayer {
                name: name.to_string(),
                online: true,
                inventory: MemoryInventory::default(),
            },
        );
    }

    pub fn player(&self, id: PlayerId) -> Option<&MemoryPlayer> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut MemoryPlayer> {
        self.players.get_mut(&id)
    }

    pub fn set_online(&mut self, id: PlayerId, online: bool) {
        if let Some(p) = self.players.get_mut(&id) {
            p.online = online;
        }
    }

    /// Puts `stack` directly into a slot, bypassing every guard (like an
    /// administrative grant).
    pub fn put(&mut self, id: PlayerId, region: Region, index: usize, stack: ItemStack) {
        if let Some(p) = self.players.get_mut(&id) {
            p.inventory.set_item(region, index, Some(stack));
        }
    }

    /// Gives `stack` through the normal add path, bypassing every guard.
    pub fn give(&mut self, id: PlayerId, stack: ItemStack) -> Option<ItemStack> {
        match self.players.get_mut(&id) {
            Some(p) => p.inventory.add_item(stack),
            None => Some(stack),
        }
    }

    pub fn set_cursor(&mut self, id: PlayerId, stack: Option<ItemStack>) {
        if let Some(p) = self.players.get_mut(&id) {
            p.inventory.set_cursor(stack);
        }
    }

    pub fn cursor(&self, id: PlayerId) -> Option<ItemStack> {
        self.players
            .get(&id)
            .and_then(|p| p.inventory.cursor().cloned())
    }

    /// Current holdings of `item` across all counted regions.
    pub fn holdings(&self, id: PlayerId, item: &str) -> u32 {
        self.players
            .get(&id)
            .map(|p| holdings::count(&p.inventory, &ItemType::new(item)))
            .unwrap_or(0)
    }

    pub fn add_container(&mut self, id: ContainerId, size: usize) {
        self.containers.insert(id, vec![None; size]);
    }

    pub fn fill_container(&mut self, id: ContainerId, slot: usize, stack: ItemStack) {
        self.set_container_item(id, slot, Some(stack));
    }

    /// Total units of `item` surfaced at `id`'s position so far.
    pub fn surfaced_total(&self, id: PlayerId, item: &str) -> u32 {
        let item = ItemType::new(item);
        self.surfaced
            .iter()
            .filter(|(p, s)| *p == id && s.item == item)
            .map(|(_, s)| s.amount)
            .sum()
    }

    pub fn messages_for(&self, id: PlayerId) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(p, _)| *p == id)
            .map(|(_, m)| m.as_str())
            .collect()
    }
}

impl Notifier for MemoryServer {
    fn send_message(&mut self, player: PlayerId, message: &str) {
        self.messages.push((player, message.to_string()));
    }

    fn broadcast(&mut self, message: &str) {
        self.broadcasts.push(message.to_string());
    }
}

impl Host for MemoryServer {
    fn is_online(&self, player: PlayerId) -> bool {
        self.players.get(&player).is_some_and(|p| p.online)
    }

    fn online_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|(_, p)| p.online)
            .map(|(id, _)| *id)
            .collect()
    }

    fn inventory(&self, player: PlayerId) -> Option<&dyn Inventory> {
        self.players
            .get(&player)
            .map(|p| &p.inventory as &dyn Inventory)
    }

    fn inventory_mut(&mut self, player: PlayerId) -> Option<&mut dyn Inventory> {
        self.players
            .get_mut(&player)
            .map(|p| &mut p.inventory as &mut dyn Inventory)
    }

    fn container_item(&self, container: ContainerId, slot: usize) -> Option<ItemStack> {
        self.containers
            .get(&container)
            .and_then(|slots| slots.get(slot))
            .and_then(|s| s.clone())
    }

    fn set_container_item(&mut self, container: ContainerId, slot: usize, stack: Option<ItemStack>) {
        if let Some(target) = self
            .containers
            .get_mut(&container)
            .and_then(|slots| slots.get_mut(slot))
        {
            *target = normalise(stack);
        }
    }

    fn surface(&mut self, player: PlayerId, stack: ItemStack) {
        if !stack.is_empty() {
            self.surfaced.push((player, stack));
        }
    }

    fn refresh_inventory(&mut self, player: PlayerId) {
        self.refreshes.push(player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_item_merges_then_fills_empty_slots() {
        let mut inv = MemoryInventory::with_max_stack(16);
        inv.set_item(Region::Storage, 3, Some(ItemStack::of("PEARL", 10)));
        let leftover = inv.add_item(ItemStack::of("PEARL", 20));
        assert!(leftover.is_none());
        assert_eq!(inv.item(Region::Storage, 3).map(|s| s.amount), Some(16));
        assert_eq!(inv.item(Region::Storage, 0).map(|s| s.amount), Some(14));
    }

    #[test]
    fn add_item_returns_what_does_not_fit() {
        let mut inv = MemoryInventory::with_max_stack(1);
        for i in 0..STORAGE_SLOTS - 1 {
            inv.set_item(Region::Storage, i, Some(ItemStack::of("DIRT", 1)));
        }
        let leftover = inv.add_item(ItemStack::of("STONE", 3));
        assert_eq!(leftover, Some(ItemStack::of("STONE", 2)));
    }

    #[test]
    fn offline_players_are_not_listed() {
        let mut server = MemoryServer::new();
        server.add_player(PlayerId(1), "alice");
        server.add_player(PlayerId(2), "bob");
        server.set_online(PlayerId(2), false);
        assert_eq!(server.online_players(), vec![PlayerId(1)]);
        assert!(!server.is_online(PlayerId(3)));
    }
}
