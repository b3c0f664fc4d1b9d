//! `/itemlimit` administrator command front-end.
//!
//! Parses the argument list into a [`LimitCommand`], applies it to the
//! registry and returns the text to show. Broadcasting and enforcement are
//! left to the caller through [`CommandOutcome`], so the same handler serves
//! the in-game command and the offline CLI.

use log::{info, warn};

use crate::host::ItemCatalog;
use crate::limits::errors::LimitError;
use crate::limits::messages::{format_item_name, Messages};
use crate::limits::registry::LimitRegistry;
use crate::limits::types::ItemType;
use crate::logutil::{escape_args, escape_log};

/// Permission node required for every sub-command.
pub const ADMIN_PERMISSION: &str = "itemlimit.admin";

const SUBCOMMANDS: [&str; 5] = ["add", "remove", "list", "check", "clear"];
const SUGGESTED_QUANTITIES: [&str; 6] = ["0", "1", "8", "16", "32", "64"];
const MAX_PAGE_SUGGESTIONS: usize = 5;
const RULE: &str = "---------------------------------------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSender {
    pub name: String,
    /// Holds [`ADMIN_PERMISSION`].
    pub is_admin: bool,
}

impl CommandSender {
    pub fn admin(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_admin: true,
        }
    }

    pub fn player(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_admin: false,
        }
    }

    pub fn console() -> Self {
        Self::admin("CONSOLE")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitCommand {
    Add { item: String, quantity: Option<String> }, // add <item> [quantity]
    Remove(String),                                 // remove <item>
    List(Option<String>),                           // list [page]
    Check(String),                                  // check <item>
    Clear,                                          // clear
    Usage(&'static str),                            // sub-command missing its item
    Help,
}

impl LimitCommand {
    pub fn parse(args: &[&str]) -> Self {
        let Some(sub) = args.first() else {
            return LimitCommand::Help;
        };
        let arg = |i: usize| args.get(i).map(|s| s.to_string());
        match sub.to_ascii_lowercase().as_str() {
            "add" => match arg(1) {
                Some(item) => LimitCommand::Add {
                    item,
                    quantity: arg(2),
                },
                None => LimitCommand::Usage("add"),
            },
            "remove" => arg(1).map_or(LimitCommand::Usage("remove"), LimitCommand::Remove),
            "list" => LimitCommand::List(arg(1)),
            "check" => arg(1).map_or(LimitCommand::Usage("check"), LimitCommand::Check),
            "clear" => LimitCommand::Clear,
            _ => LimitCommand::Help,
        }
    }
}

/// Settings and collaborators a command needs besides the registry.
pub struct CommandContext<'a> {
    pub catalog: &'a dyn ItemCatalog,
    pub messages: &'a Messages,
    pub max_cap: u32,
    pub page_size: usize,
}

#[derive(Debug, Default)]
pub struct CommandOutcome {
    /// Lines for the sender.
    pub replies: Vec<String>,
    /// Lines for every connected player.
    pub broadcasts: Vec<String>,
    /// Item whose cap was just set.
    pub enforce: Option<ItemType>,
    /// Why the command was rejected, if it was.
    pub error: Option<LimitError>,
}

impl CommandOutcome {
    fn reply<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn rejected<I, S>(error: LimitError, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            error: Some(error),
            ..Self::reply(lines)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub fn handle_limit_command(
    registry: &mut LimitRegistry,
    ctx: &CommandContext<'_>,
    sender: &CommandSender,
    args: &[&str],
) -> CommandOutcome {
    if !sender.is_admin {
        warn!(
            target: "audit",
            "{} denied /itemlimit {}",
            escape_log(&sender.name),
            escape_args(args)
        );
        return CommandOutcome::rejected(
            LimitError::PermissionDenied(sender.name.clone()),
            ["You don't have permission to use this command!"],
        );
    }

    match LimitCommand::parse(args) {
        LimitCommand::Add { item, quantity } => handle_add(registry, ctx, sender, &item, quantity.as_deref()),
        LimitCommand::Remove(item) => handle_remove(registry, ctx, sender, &item),
        LimitCommand::List(page) => handle_list(registry, ctx, page.as_deref()),
        LimitCommand::Check(item) => handle_check(registry, ctx, &item),
        LimitCommand::Clear => handle_clear(registry, ctx, sender),
        LimitCommand::Usage(sub) => CommandOutcome::reply(usage(sub)),
        LimitCommand::Help => CommandOutcome::reply(help_lines()),
    }
}

fn resolve(ctx: &CommandContext<'_>, raw: &str) -> Result<ItemType, CommandOutcome> {
    match ctx.catalog.resolve(raw) {
        Some(item) => Ok(item),
        None => Err(CommandOutcome::rejected(
            LimitError::InvalidItemType(raw.to_string()),
            [
                format!("Invalid item: {}", raw),
                "Use tab completion or check the item list for valid item names.".to_string(),
            ],
        )),
    }
}

fn parse_quantity(raw: Option<&str>, max_cap: u32) -> Result<u32, CommandOutcome> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    let out_of_range = || LimitError::OutOfRangeQuantity {
        value: raw.to_string(),
        max: max_cap,
    };
    let trimmed = raw.trim();
    let all_digits = !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit());
    match trimmed.parse::<i64>() {
        Err(_) if all_digits => Err(CommandOutcome::rejected(
            out_of_range(),
            [format!("Quantity cannot exceed {}!", max_cap)],
        )),
        Err(_) => Err(CommandOutcome::rejected(
            out_of_range(),
            ["Invalid quantity! Must be a number."],
        )),
        Ok(n) if n < 0 => Err(CommandOutcome::rejected(
            out_of_range(),
            ["Quantity cannot be negative!"],
        )),
        Ok(n) if n > i64::from(max_cap) => Err(CommandOutcome::rejected(
            out_of_range(),
            [format!("Quantity cannot exceed {}!", max_cap)],
        )),
        Ok(n) => Ok(n as u32),
    }
}

fn handle_add(
    registry: &mut LimitRegistry,
    ctx: &CommandContext<'_>,
    sender: &CommandSender,
    raw_item: &str,
    raw_quantity: Option<&str>,
) -> CommandOutcome {
    let item = match resolve(ctx, raw_item) {
        Ok(item) => item,
        Err(outcome) => return outcome,
    };
    if item.is_air() {
        return CommandOutcome::rejected(
            LimitError::InvalidItemType(item.name().to_string()),
            ["You cannot limit AIR!"],
        );
    }
    let quantity = match parse_quantity(raw_quantity, ctx.max_cap) {
        Ok(q) => q,
        Err(outcome) => return outcome,
    };

    registry.add_or_update(item.clone(), quantity);
    info!(
        target: "audit",
        "{} set limit {} = {}",
        escape_log(&sender.name),
        item,
        quantity
    );

    let name = format_item_name(&item);
    let replies = if quantity == 0 {
        vec![
            format!("Completely banned {}!", name),
            "Players cannot obtain this item at all.".to_string(),
        ]
    } else {
        vec![
            format!("Limited {} to {} items!", name, quantity),
            format!("Players can have a maximum of {} of this item.", quantity),
        ]
    };
    CommandOutcome {
        replies,
        broadcasts: vec![ctx.messages.broadcast_limit_set(&item, quantity)],
        enforce: Some(item),
        error: None,
    }
}

fn handle_remove(
    registry: &mut LimitRegistry,
    ctx: &CommandContext<'_>,
    sender: &CommandSender,
    raw_item: &str,
) -> CommandOutcome {
    let item = match resolve(ctx, raw_item) {
        Ok(item) => item,
        Err(outcome) => return outcome,
    };
    let name = format_item_name(&item);
    if !registry.remove(&item) {
        return CommandOutcome::rejected(
            LimitError::NotLimited(item.name().to_string()),
            [format!("{} is not currently limited!", name)],
        );
    }
    info!(target: "audit", "{} removed limit {}", escape_log(&sender.name), item);
    CommandOutcome {
        replies: vec![format!("Removed limit on {}!", name)],
        broadcasts: vec![ctx.messages.broadcast_removed(&item)],
        ..CommandOutcome::default()
    }
}

fn total_pages(entries: usize, page_size: usize) -> usize {
    entries.div_ceil(page_size.max(1))
}

fn handle_list(registry: &LimitRegistry, ctx: &CommandContext<'_>, raw_page: Option<&str>) -> CommandOutcome {
    let entries = registry.sorted_entries();
    if entries.is_empty() {
        return CommandOutcome::reply([
            "No items are currently limited.",
            "Use /itemlimit add <item> [quantity] to limit an item.",
        ]);
    }

    let page = match raw_page.map(|p| p.trim().parse::<usize>()) {
        None => 1,
        Some(Ok(p)) => p,
        Some(Err(_)) => {
            return CommandOutcome::rejected(
                LimitError::InvalidPage(raw_page.unwrap_or_default().to_string()),
                ["Invalid page number!"],
            )
        }
    };
    let page_size = ctx.page_size.max(1);
    let pages = total_pages(entries.len(), page_size);
    if page < 1 || page > pages {
        return CommandOutcome::rejected(
            LimitError::InvalidPage(page.to_string()),
            [format!("Invalid page! Valid pages: 1-{}", pages)],
        );
    }

    let mut lines = vec![
        format!("---------- Limited Items (Page {}/{}) ----------", page, pages),
        format!("Total: {}", entries.len()),
        String::new(),
    ];
    for (item, cap) in entries.iter().skip((page - 1) * page_size).take(page_size) {
        let name = format_item_name(item);
        if *cap == 0 {
            lines.push(format!("• {} [BANNED]", name));
        } else {
            lines.push(format!("• {} - Max: {}", name, cap));
        }
    }
    if page < pages {
        lines.push(String::new());
        lines.push(format!("Use /itemlimit list {} for the next page.", page + 1));
    }
    lines.push(RULE.to_string());
    CommandOutcome::reply(lines)
}

fn handle_check(registry: &LimitRegistry, ctx: &CommandContext<'_>, raw_item: &str) -> CommandOutcome {
    let item = match resolve(ctx, raw_item) {
        Ok(item) => item,
        Err(outcome) => return outcome,
    };
    let name = format_item_name(&item);
    match registry.lookup(&item) {
        Some(0) => CommandOutcome::reply([
            format!("{} is completely BANNED!", name),
            "Players cannot obtain this item at all.".to_string(),
        ]),
        Some(cap) => CommandOutcome::reply([
            format!("{} is limited to {} items!", name, cap),
            format!("Players can have a maximum of {} of this item.", cap),
        ]),
        None => CommandOutcome::reply([format!("{} is not limited.", name)]),
    }
}

fn handle_clear(registry: &mut LimitRegistry, ctx: &CommandContext<'_>, sender: &CommandSender) -> CommandOutcome {
    let count = registry.len();
    if count == 0 {
        return CommandOutcome::reply(["No items are currently limited!"]);
    }
    registry.clear();
    info!(target: "audit", "{} cleared {} limits", escape_log(&sender.name), count);
    CommandOutcome {
        replies: vec![format!("Cleared all {} limited items!", count)],
        broadcasts: vec![ctx.messages.broadcast_cleared()],
        ..CommandOutcome::default()
    }
}

fn usage(sub: &str) -> Vec<String> {
    let lines: &[&str] = match sub {
        "add" => &[
            "Usage: /itemlimit add <item> [maxQuantity]",
            "Example: /itemlimit add GOLDEN_APPLE 64",
            "Example: /itemlimit add TOTEM_OF_UNDYING 1",
            "Example: /itemlimit add NETHERITE_SWORD 0 (completely ban)",
        ],
        "remove" => &[
            "Usage: /itemlimit remove <item>",
            "Example: /itemlimit remove GOLDEN_APPLE",
        ],
        _ => &[
            "Usage: /itemlimit check <item>",
            "Example: /itemlimit check GOLDEN_APPLE",
        ],
    };
    lines.iter().map(|l| l.to_string()).collect()
}

fn help_lines() -> Vec<String> {
    [
        "---------- Item Limiter ----------",
        "/itemlimit add <item> [quantity] - Limit an item",
        "  • No quantity = completely banned",
        "  • Quantity 0 = completely banned",
        "  • Quantity 1-max = max amount allowed",
        "/itemlimit remove <item> - Remove item limit",
        "/itemlimit list [page] - List all limited items",
        "/itemlimit check <item> - Check if item is limited",
        "/itemlimit clear - Clear all limited items",
        RULE,
    ]
    .iter()
    .map(|l| l.to_string())
    .collect()
}

/// Tab-completion candidates for the argument currently being typed (the
/// last element of `args`), filtered case-insensitively by its prefix.
pub fn complete(
    registry: &LimitRegistry,
    catalog: &dyn ItemCatalog,
    page_size: usize,
    args: &[&str],
) -> Vec<String> {
    let prefix = args.last().map(|a| a.to_ascii_lowercase()).unwrap_or_default();
    let sub = args.first().map(|a| a.to_ascii_lowercase()).unwrap_or_default();

    let candidates: Vec<String> = match args.len() {
        0 | 1 => SUBCOMMANDS.iter().map(|s| s.to_string()).collect(),
        2 => match sub.as_str() {
            "add" | "check" => catalog
                .item_names()
                .into_iter()
                .filter(|n| !ItemType::new(n).is_air())
                .collect(),
            "remove" => registry.item_names(),
            "list" => {
                let pages = total_pages(registry.len(), page_size).min(MAX_PAGE_SUGGESTIONS);
                (1..=pages).map(|p| p.to_string()).collect()
            }
            _ => Vec::new(),
        },
        3 if sub == "add" => SUGGESTED_QUANTITIES.iter().map(|s| s.to_string()).collect(),
        _ => Vec::new(),
    };

    candidates
        .into_iter()
        .filter(|c| c.to_ascii_lowercase().starts_with(&prefix))
        .collect()
}
