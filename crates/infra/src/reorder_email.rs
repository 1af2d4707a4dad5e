//! Reorder e-mail to the office, rendered as a `mailto:` link.

use std::collections::HashMap;

use vanstock_core::{Entity, ItemId};
use vanstock_inventory::{Item, ReorderSuggestion};

pub const SUBJECT: &str = "Nachbestellung für Fahrzeug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderEmail {
    pub recipient: Option<String>,
    pub subject: String,
    /// One line per item to order.
    pub lines: Vec<String>,
}

impl ReorderEmail {
    /// Build the e-mail from (possibly user-edited) suggestions.
    ///
    /// Zero quantities and suggestions for items not in `items` are skipped.
    pub fn compose(suggestions: &[ReorderSuggestion], items: &[Item]) -> Self {
        let by_id: HashMap<&ItemId, &Item> = items.iter().map(|i| (i.id(), i)).collect();

        let lines = suggestions
            .iter()
            .filter(|s| s.needs_reorder())
            .filter_map(|s| {
                by_id.get(&s.item_id).map(|item| {
                    format!(
                        "{}x {} (Art.-Nr.: {})",
                        s.reorder_quantity,
                        item.name(),
                        item.article_number()
                    )
                })
            })
            .collect();

        Self {
            recipient: None,
            subject: SUBJECT.to_string(),
            lines,
        }
    }

    pub fn with_recipient(mut self, recipient: Option<String>) -> Self {
        self.recipient = recipient;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn body(&self) -> String {
        self.lines.join("\n")
    }

    pub fn mailto_uri(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.recipient.as_deref().map(encode_component).unwrap_or_default(),
            encode_component(&self.subject),
            encode_component(&self.body())
        )
    }
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, the
/// same set browsers leave alone in URI components.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() * 3);
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
