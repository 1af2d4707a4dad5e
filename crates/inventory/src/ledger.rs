use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vanstock_core::{ItemId, ValueObject};

use crate::assembly::Assembly;

/// One past consumption, flattened out of an assembly line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalConsumption {
    pub item_id: ItemId,
    pub quantity_consumed: u32,
    pub date: DateTime<Utc>,
}

impl ValueObject for HistoricalConsumption {}

/// Append-only log of committed assemblies.
///
/// No edit or delete. Removing an assembly is an administrative task outside
/// the ledger.
pub trait AssemblyLedger {
    fn append(&mut self, assembly: Assembly);

    /// All assemblies in append order.
    fn list(&self) -> Vec<Assembly>;

    /// Assemblies for display: most recent first.
    fn newest_first(&self) -> Vec<Assembly> {
        let mut assemblies = self.list();
        assemblies.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| b.id_typed().cmp(&a.id_typed())));
        assemblies
    }

    /// Per-line consumption history for reorder estimation.
    fn history(&self) -> Vec<HistoricalConsumption> {
        self.list()
            .iter()
            .flat_map(|assembly| {
                assembly.items().iter().map(|line| HistoricalConsumption {
                    item_id: line.item_id.clone(),
                    quantity_consumed: line.quantity_consumed,
                    date: assembly.date(),
                })
            })
            .collect()
    }
}

impl<L> AssemblyLedger for &mut L
where
    L: AssemblyLedger + ?Sized,
{
    fn append(&mut self, assembly: Assembly) {
        (**self).append(assembly)
    }

    fn list(&self) -> Vec<Assembly> {
        (**self).list()
    }
}

/// In-memory assembly ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryAssemblyLedger {
    assemblies: Vec<Assembly>,
}

impl InMemoryAssemblyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_assemblies(assemblies: Vec<Assembly>) -> Self {
        Self { assemblies }
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    pub fn as_slice(&self) -> &[Assembly] {
        &self.assemblies
    }

    pub fn into_assemblies(self) -> Vec<Assembly> {
        self.assemblies
    }
}

impl AssemblyLedger for InMemoryAssemblyLedger {
    fn append(&mut self, assembly: Assembly) {
        self.assemblies.push(assembly);
    }

    fn list(&self) -> Vec<Assembly> {
        self.assemblies.clone()
    }
}
