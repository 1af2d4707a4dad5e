use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vanstock_core::{AssemblyId, Entity, ItemId};

use crate::item::Item;

/// One item's consumption within an assembly.
///
/// `name` and `article_number` are copied from the catalog when the assembly
/// is recorded, so the line stays readable after the item is renamed or
/// deleted. `item_id` is a lookup key only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyLineItem {
    pub item_id: ItemId,
    pub name: String,
    pub article_number: String,
    pub quantity_consumed: u32,
}

impl AssemblyLineItem {
    pub(crate) fn snapshot(item: &Item, quantity_consumed: u32) -> Self {
        Self {
            item_id: item.id().clone(),
            name: item.name().to_string(),
            article_number: item.article_number().to_string(),
            quantity_consumed,
        }
    }
}

/// A committed consumption transaction against a commission (job reference).
///
/// Immutable: there is no public constructor or setter. New assemblies come
/// only out of `StockLedgerEngine::apply_assembly`; loaded ones come out of
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    id: AssemblyId,
    commission: String,
    date: DateTime<Utc>,
    items: Vec<AssemblyLineItem>,
}

impl Assembly {
    pub(crate) fn new(
        id: AssemblyId,
        commission: String,
        date: DateTime<Utc>,
        items: Vec<AssemblyLineItem>,
    ) -> Self {
        Self {
            id,
            commission,
            date,
            items,
        }
    }

    pub fn id_typed(&self) -> AssemblyId {
        self.id
    }

    pub fn commission(&self) -> &str {
        &self.commission
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn items(&self) -> &[AssemblyLineItem] {
        &self.items
    }

    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity_consumed)).sum()
    }
}

impl Entity for Assembly {
    type Id = AssemblyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
