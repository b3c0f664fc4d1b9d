//! Player-facing text.
//!
//! Templates use `{name}` placeholders and are overridable from the
//! `[messages]` section of the configuration file.

use serde::{Deserialize, Serialize};

use crate::limits::decision::DenyReason;
use crate::limits::deferred::SweepReason;
use crate::limits::types::ItemType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Messages {
    pub blocked_banned: String,
    pub blocked_limit: String,
    pub partial_added: String,
    pub trade_banned: String,
    pub trade_limit: String,
    pub trade_partial: String,
    pub dropped_login: String,
    pub dropped_sweep: String,
    pub dropped_item: String,
    pub broadcast_banned: String,
    pub broadcast_limited: String,
    pub broadcast_removed: String,
    pub broadcast_cleared: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            blocked_banned: "You cannot have {item}!".to_string(),
            blocked_limit: "You cannot have more than {limit} {item}!".to_string(),
            partial_added: "Added {amount} {item} (max: {limit})".to_string(),
            trade_banned: "You cannot trade for {item} - it is banned!".to_string(),
            trade_limit: "You cannot trade for {item} - you already have the maximum ({limit})!"
                .to_string(),
            trade_partial: "This trade would exceed your limit! You can only have {remaining} more {item} (limit: {limit})"
                .to_string(),
            dropped_login: "Dropped {count} limited items at your feet!".to_string(),
            dropped_sweep: "Dropped {count} excess limited items at your feet!".to_string(),
            dropped_item: "Dropped {amount} {item} (limit: {limit})".to_string(),
            broadcast_banned: "{item} has been completely banned!".to_string(),
            broadcast_limited: "{item} has been limited to {quantity} items!".to_string(),
            broadcast_removed: "{item} is no longer limited!".to_string(),
            broadcast_cleared: "All item limitations have been removed!".to_string(),
        }
    }
}

/// Replace each `{key}` in `template` with its value. Unknown placeholders
/// are left as they are.
pub fn render(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

/// `GOLDEN_APPLE` → `Golden Apple`.
pub fn format_item_name(item: &ItemType) -> String {
    item.name()
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Messages {
    /// Generic refusal; the banned variant when `limit` is 0.
    pub fn blocked(&self, item: &ItemType, limit: u32) -> String {
        let template = if limit == 0 {
            &self.blocked_banned
        } else {
            &self.blocked_limit
        };
        render(
            template,
            &[("item", format_item_name(item)), ("limit", limit.to_string())],
        )
    }

    pub fn partial_added(&self, item: &ItemType, amount: u32, limit: u32) -> String {
        render(
            &self.partial_added,
            &[
                ("item", format_item_name(item)),
                ("amount", amount.to_string()),
                ("limit", limit.to_string()),
            ],
        )
    }

    /// Refusal text for the trade pathway, chosen by why it was refused.
    pub fn trade_denied(&self, item: &ItemType, limit: u32, reason: DenyReason) -> String {
        let name = format_item_name(item);
        match reason {
            DenyReason::Banned => render(&self.trade_banned, &[("item", name)]),
            DenyReason::WouldExceed { remaining } => render(
                &self.trade_partial,
                &[
                    ("item", name),
                    ("remaining", remaining.to_string()),
                    ("limit", limit.to_string()),
                ],
            ),
            DenyReason::AtLimit | DenyReason::Unverifiable => render(
                &self.trade_limit,
                &[("item", name), ("limit", limit.to_string())],
            ),
        }
    }

    /// Consolidated notice after a sweep removed `count` units.
    pub fn dropped(&self, count: u32, reason: SweepReason) -> String {
        let template = match reason {
            SweepReason::Login => &self.dropped_login,
            _ => &self.dropped_sweep,
        };
        render(template, &[("count", count.to_string())])
    }

    pub fn dropped_item(&self, item: &ItemType, amount: u32, limit: u32) -> String {
        render(
            &self.dropped_item,
            &[
                ("item", format_item_name(item)),
                ("amount", amount.to_string()),
                ("limit", limit.to_string()),
            ],
        )
    }

    pub fn broadcast_limit_set(&self, item: &ItemType, quantity: u32) -> String {
        let name = format_item_name(item);
        if quantity == 0 {
            render(&self.broadcast_banned, &[("item", name)])
        } else {
            render(
                &self.broadcast_limited,
                &[("item", name), ("quantity", quantity.to_string())],
            )
        }
    }

    pub fn broadcast_removed(&self, item: &ItemType) -> String {
        render(&self.broadcast_removed, &[("item", format_item_name(item))])
    }

    pub fn broadcast_cleared(&self) -> String {
        self.broadcast_cleared.clone()
    }
}
