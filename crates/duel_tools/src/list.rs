//! Catalog listing.

use std::fmt::Write;

use duel_core::catalog::{Effect, Tool, ToolCatalog};

fn describe_effect(effect: &Effect) -> String {
    match *effect {
        Effect::Damage { amount } => format!("damage {amount}"),
        Effect::Heal { amount } => format!("heal {amount}"),
        Effect::Shield { amount } => format!("shield {amount}"),
        Effect::Dodge { duration } => format!("dodge ({duration})"),
        Effect::Slow { duration } => format!("slow ({duration})"),
    }
}

fn describe_tool(tool: &Tool) -> String {
    let effects = tool
        .effects
        .iter()
        .map(describe_effect)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{:<12} {:<14} {:<8} {:>4} {:>3}  {:<24} {}",
        tool.id,
        tool.name,
        tool.category.label(),
        tool.mana_cost,
        tool.cooldown,
        effects,
        tool.aliases.join(" | ")
    )
}

/// Table of every tool in catalog order, with a header row.
#[must_use]
pub fn format_listing(catalog: &ToolCatalog) -> String {
    let mut out = format!(
        "{:<12} {:<14} {:<8} {:>4} {:>3}  {:<24} {}",
        "ID", "NAME", "CATEGORY", "MANA", "CD", "EFFECTS", "ALIASES"
    );
    for tool in catalog.iter() {
        let _ = write!(out, "\n{}", describe_tool(tool));
    }
    out
}
