//! Event payloads handed to the engine by the host, one per guarded pathway.
//!
//! Each payload carries a `cancelled` flag. The engine sets it when the
//! decision is to refuse the mutation; the host is expected to honour it
//! exactly like a cancelled native event. Payloads that arrive already
//! cancelled are ignored.

use crate::limits::types::{ContainerId, ItemStack, PlayerId};

/// The player is about to collect a stack lying in the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupEvent {
    pub player: PlayerId,
    pub stack: ItemStack,
    pub cancelled: bool,
}

impl PickupEvent {
    pub fn new(player: PlayerId, stack: ItemStack) -> Self {
        Self {
            player,
            stack,
            cancelled: false,
        }
    }
}

/// Main hand and off-hand are about to trade places. The stacks are the
/// ones each hand will hold afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandSwapEvent {
    pub player: PlayerId,
    pub main_hand: Option<ItemStack>,
    pub off_hand: Option<ItemStack>,
    pub cancelled: bool,
}

impl HandSwapEvent {
    pub fn new(player: PlayerId, main_hand: Option<ItemStack>, off_hand: Option<ItemStack>) -> Self {
        Self {
            player,
            main_hand,
            off_hand,
            cancelled: false,
        }
    }
}

/// The top inventory of the view the player has open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Only the player's own inventory is open.
    Player,
    Container(ContainerId),
    /// A trading view; raw slot 2 is the trade result.
    Merchant(ContainerId),
    /// Creative-mode inventory, exempt from click interception.
    Creative,
}

/// Which inventory the clicked slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickedInventory {
    Player,
    Container(ContainerId),
}

/// What the host is about to do in response to the click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    PlaceAll,
    PlaceOne,
    PlaceSome,
    SwapWithCursor,
    CollectToCursor,
    MoveToOtherInventory,
    HotbarSwap,
    HotbarMoveAndReadd,
    PickupAll,
    PickupHalf,
    PickupOne,
    PickupSome,
    DropFromSlot,
    Nothing,
    Other,
}

impl ClickAction {
    /// Actions whose moving stack is the one on the cursor.
    pub fn moves_cursor(self) -> bool {
        matches!(
            self,
            ClickAction::PlaceAll
                | ClickAction::PlaceOne
                | ClickAction::PlaceSome
                | ClickAction::SwapWithCursor
                | ClickAction::CollectToCursor
        )
    }

    pub fn is_hotbar(self) -> bool {
        matches!(self, ClickAction::HotbarSwap | ClickAction::HotbarMoveAndReadd)
    }
}

/// The physical input that produced the click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickType {
    Left,
    Right,
    ShiftLeft,
    ShiftRight,
    NumberKey,
    Middle,
    Drop,
    Other,
}

impl ClickType {
    pub fn is_shift(self) -> bool {
        matches!(self, ClickType::ShiftLeft | ClickType::ShiftRight)
    }
}

/// A single click on a slot in an open inventory view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub player: PlayerId,
    pub view: ViewKind,
    /// `None` when the click landed outside any inventory.
    pub clicked: Option<ClickedInventory>,
    /// Slot index within `clicked`.
    pub slot: usize,
    /// Slot index within the whole view.
    pub raw_slot: usize,
    pub action: ClickAction,
    pub click: ClickType,
    /// Stack in the clicked slot before the click.
    pub current: Option<ItemStack>,
    /// Stack on the cursor before the click.
    pub cursor: Option<ItemStack>,
    /// Hotbar index for number-key clicks.
    pub hotbar_button: Option<usize>,
    pub cancelled: bool,
}

impl ClickEvent {
    pub fn new(
        player: PlayerId,
        view: ViewKind,
        clicked: Option<ClickedInventory>,
        slot: usize,
        action: ClickAction,
        click: ClickType,
    ) -> Self {
        Self {
            player,
            view,
            clicked,
            slot,
            raw_slot: slot,
            action,
            click,
            current: None,
            cursor: None,
            hotbar_button: None,
            cancelled: false,
        }
    }

    pub fn with_raw_slot(mut self, raw_slot: usize) -> Self {
        self.raw_slot = raw_slot;
        self
    }

    pub fn with_current(mut self, stack: ItemStack) -> Self {
        self.current = Some(stack);
        self
    }

    pub fn with_cursor(mut self, stack: ItemStack) -> Self {
        self.cursor = Some(stack);
        self
    }

    pub fn with_hotbar_button(mut self, button: usize) -> Self {
        self.hotbar_button = Some(button);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOwner {
    Player,
    Container,
}

/// One slot touched by a drag and the stack that would land in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraggedSlot {
    pub raw_slot: usize,
    pub owner: SlotOwner,
    pub stack: ItemStack,
}

/// A cursor stack spread across several slots in one gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEvent {
    pub player: PlayerId,
    pub old_cursor: Option<ItemStack>,
    pub slots: Vec<DraggedSlot>,
    pub cancelled: bool,
}

impl DragEvent {
    pub fn new(player: PlayerId, old_cursor: ItemStack, slots: Vec<DraggedSlot>) -> Self {
        Self {
            player,
            old_cursor: Some(old_cursor),
            slots,
            cancelled: false,
        }
    }
}

/// The player closed an inventory view. Not cancellable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseEvent {
    pub player: PlayerId,
}

/// The player pressed the drop key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropEvent {
    pub player: PlayerId,
    pub cancelled: bool,
}

impl DropEvent {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            cancelled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinEvent {
    pub player: PlayerId,
}

/// Names each guarded pathway for logs and per-pathway counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pathway {
    Pickup,
    HandSwap,
    Click,
    OffHand,
    Drag,
    ShiftClick,
    Trade,
    Close,
    Drop,
}

impl Pathway {
    pub fn as_str(self) -> &'static str {
        match self {
            Pathway::Pickup => "pickup",
            Pathway::HandSwap => "hand_swap",
            Pathway::Click => "click",
            Pathway::OffHand => "off_hand",
            Pathway::Drag => "drag",
            Pathway::ShiftClick => "shift_click",
            Pathway::Trade => "trade",
            Pathway::Close => "close",
            Pathway::Drop => "drop",
        }
    }
}

impl std::fmt::Display for Pathway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
