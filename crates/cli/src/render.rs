//! Plain-text rendering of command results.

use std::collections::HashMap;
use std::fmt::Write as _;

use vanstock_core::{Entity, ItemId};
use vanstock_infra::ReorderPlan;
use vanstock_infra::reorder_planner::PlanSource;
use vanstock_inventory::{Assembly, InventoryEvent, Item, ReorderSuggestion, StockShortfall};

pub fn stock_table(items: &[Item]) -> String {
    if items.is_empty() {
        return "Keine Artikel gefunden.\n".to_string();
    }

    let name_width = items.iter().map(|i| i.name().chars().count()).max().unwrap_or(0).max(7);
    let article_width = items.iter().map(|i| i.article_number().chars().count()).max().unwrap_or(0).max(8);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<name_width$}  {:<article_width$}  {:>9}  {:>12}",
        "Artikel", "Art.-Nr.", "Bestand", "Preis"
    );
    for item in items {
        let level = format!("{}/{}", item.current_stock(), item.target_stock());
        let marker = if item.is_low_stock() { "  niedrig" } else { "" };
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<article_width$}  {:>9}  {:>12}{marker}",
            item.name(),
            item.article_number(),
            level,
            item.list_price().to_string()
        );
    }
    out
}

pub fn shortfall_warning(shortfall: &StockShortfall) -> String {
    format!(
        "Nicht genügend Lagerbestand: Für {} sind nur noch {} Stück verfügbar.",
        shortfall.name, shortfall.available
    )
}

pub fn assembly_summary(assembly: &Assembly) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Montage gespeichert: Der Verbrauch für Kommission {} wurde protokolliert.",
        assembly.commission()
    );
    out.push_str(&assembly_lines(assembly));
    out
}

/// Notices a published event carries for the technician.
pub fn event_notices(event: &InventoryEvent) -> Vec<String> {
    match event {
        InventoryEvent::AssemblyRecorded(recorded) => recorded.shortfalls.iter().map(shortfall_warning).collect(),
        _ => Vec::new(),
    }
}

fn assembly_lines(assembly: &Assembly) -> String {
    let mut out = String::new();
    for line in assembly.items() {
        let _ = writeln!(
            out,
            "  {}x {} (Art.-Nr.: {})",
            line.quantity_consumed, line.name, line.article_number
        );
    }
    out
}

pub fn assemblies_list(assemblies: &[Assembly]) -> String {
    if assemblies.is_empty() {
        return "Noch keine Montagen erfasst.\n".to_string();
    }

    let mut out = String::new();
    for assembly in assemblies {
        let _ = writeln!(
            out,
            "{}  {}",
            assembly.date().format("%d.%m.%Y %H:%M"),
            assembly.commission()
        );
        out.push_str(&assembly_lines(assembly));
    }
    out
}

pub fn reorder_table(plan: &ReorderPlan, items: &[Item]) -> String {
    let mut out = String::new();
    if let PlanSource::Fallback(reason) = &plan.source {
        let _ = writeln!(out, "Hinweis: Vorschläge nach Sollbestand ({reason}).");
    }
    out.push_str(&suggestion_lines(&plan.suggestions, items));
    out
}

pub fn suggestion_lines(suggestions: &[ReorderSuggestion], items: &[Item]) -> String {
    let by_id: HashMap<&ItemId, &Item> = items.iter().map(|i| (i.id(), i)).collect();

    let mut out = String::new();
    for suggestion in suggestions.iter().filter(|s| s.needs_reorder()) {
        if let Some(item) = by_id.get(&suggestion.item_id) {
            let _ = writeln!(
                out,
                "{:>5}x {} (Art.-Nr.: {})  [{}/{}]",
                suggestion.reorder_quantity,
                item.name(),
                item.article_number(),
                item.current_stock(),
                item.target_stock()
            );
        }
    }
    if out.is_empty() {
        out.push_str("Aktuell sind keine Nachbestellungen notwendig.\n");
    }
    out
}
