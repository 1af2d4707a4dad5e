use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use vanstock_inventory::{Assembly, CatalogStore, InMemoryAssemblyLedger, InMemoryCatalog, Item};

use crate::seed::seed_items;
use crate::section::Section;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Data parsed but breaks a catalog rule (e.g. duplicate item ids).
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Load/save boundary for section catalogs and the shared ledger.
///
/// `load_items` returns `None` for a section that was never saved, so callers
/// can tell "empty on purpose" from "first run".
pub trait SnapshotStore: Send + Sync {
    fn load_items(&self, section: Section) -> Result<Option<Vec<Item>>, StoreError>;

    fn save_items(&self, section: Section, items: &[Item]) -> Result<(), StoreError>;

    /// Assemblies in append order; empty when nothing was recorded yet.
    fn load_assemblies(&self) -> Result<Vec<Assembly>, StoreError>;

    fn save_assemblies(&self, assemblies: &[Assembly]) -> Result<(), StoreError>;

    /// Catalog for a section, seeded with the demo items on first run.
    fn load_catalog(&self, section: Section) -> Result<InMemoryCatalog, StoreError> {
        let items = match self.load_items(section)? {
            Some(items) => items,
            None => seed_items(section).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        };
        InMemoryCatalog::from_items(items).map_err(|e| StoreError::Corrupt(format!("{}: {e}", section.storage_key())))
    }

    fn save_catalog(&self, section: Section, catalog: &InMemoryCatalog) -> Result<(), StoreError> {
        self.save_items(section, &catalog.list())
    }

    fn load_ledger(&self) -> Result<InMemoryAssemblyLedger, StoreError> {
        Ok(InMemoryAssemblyLedger::from_assemblies(self.load_assemblies()?))
    }

    fn save_ledger(&self, ledger: &InMemoryAssemblyLedger) -> Result<(), StoreError> {
        self.save_assemblies(ledger.as_slice())
    }
}

impl<S> SnapshotStore for Arc<S>
where
    S: SnapshotStore + ?Sized,
{
    fn load_items(&self, section: Section) -> Result<Option<Vec<Item>>, StoreError> {
        (**self).load_items(section)
    }

    fn save_items(&self, section: Section, items: &[Item]) -> Result<(), StoreError> {
        (**self).save_items(section, items)
    }

    fn load_assemblies(&self) -> Result<Vec<Assembly>, StoreError> {
        (**self).load_assemblies()
    }

    fn save_assemblies(&self, assemblies: &[Assembly]) -> Result<(), StoreError> {
        (**self).save_assemblies(assemblies)
    }
}
