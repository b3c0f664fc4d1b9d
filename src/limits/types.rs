//! Value types shared by the limiter: item identifiers, stacks, and the
//! identifiers the host uses for players and containers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bulk storage slots (hotbar + main grid) in a player inventory.
pub const STORAGE_SLOTS: usize = 36;
/// Number of equipped-armor slots.
pub const ARMOR_SLOTS: usize = 4;
/// The first `HOTBAR_SLOTS` storage slots form the hotbar.
pub const HOTBAR_SLOTS: usize = 9;
/// Index of the off-hand slot in the player inventory view.
pub const OFF_HAND_SLOT: usize = 40;
/// Raw slot index of the result slot in a merchant view.
pub const MERCHANT_RESULT_SLOT: usize = 2;
/// Default maximum size of a single stack.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// Catalog identifier for a kind of item, independent of quantity.
///
/// Names are normalised to upper case (`golden_apple` and `GOLDEN_APPLE`
/// denote the same type). The empty name and `AIR` are the "no item"
/// sentinel: they never match a stack and can never be limited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemType(String);

impl ItemType {
    pub const AIR_NAME: &'static str = "AIR";

    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_uppercase())
    }

    /// The "no item" sentinel.
    pub fn air() -> Self {
        Self(Self::AIR_NAME.to_string())
    }

    pub fn is_air(&self) -> bool {
        self.0.is_empty() || self.0 == Self::AIR_NAME
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A quantity of one item type occupying one slot (or the cursor, or the
/// ground).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemType,
    pub amount: u32,
}

impl ItemStack {
    pub fn new(item: ItemType, amount: u32) -> Self {
        Self { item, amount }
    }

    /// Convenience constructor used heavily by hosts and tests.
    pub fn of(name: &str, amount: u32) -> Self {
        Self::new(ItemType::new(name), amount)
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0 || self.item.is_air()
    }

    /// True when this is a non-empty stack of `item`. The sentinel never matches.
    pub fn is(&self, item: &ItemType) -> bool {
        !self.is_empty() && !item.is_air() && &self.item == item
    }

    /// Clone of this stack carrying a different amount.
    pub fn with_amount(&self, amount: u32) -> Self {
        Self::new(self.item.clone(), amount)
    }

    /// Reduces this stack by up to `amount` and returns the split-off portion.
    pub fn split(&mut self, amount: u32) -> ItemStack {
        let taken = amount.min(self.amount);
        self.amount -= taken;
        self.with_amount(taken)
    }
}

/// Host-assigned identity of a connected (or previously connected) player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Host-assigned identity of an open non-player inventory (chest, shulker,
/// merchant, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(pub u64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

/// The three disjoint inventory areas examined for holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Hotbar and main grid.
    Storage,
    Armor,
    OffHand,
}

/// Regions in the order excess is removed from them.
pub const COUNTED_REGIONS: [Region; 3] = [Region::Storage, Region::Armor, Region::OffHand];
