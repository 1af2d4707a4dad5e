use std::collections::HashMap;
use std::sync::RwLock;

use vanstock_inventory::{Assembly, Item};

use super::r#trait::{SnapshotStore, StoreError};
use crate::section::Section;

/// In-memory snapshot store.
///
/// Intended for tests/dev. Starts empty, so every section seeds on first load.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    sections: RwLock<HashMap<Section, Vec<Item>>>,
    assemblies: RwLock<Vec<Assembly>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `items` for `section`.
    pub fn with_items(section: Section, items: Vec<Item>) -> Self {
        let store = Self::default();
        if let Ok(mut sections) = store.sections.write() {
            sections.insert(section, items);
        }
        store
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load_items(&self, section: Section) -> Result<Option<Vec<Item>>, StoreError> {
        let sections = self.sections.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sections.get(&section).cloned())
    }

    fn save_items(&self, section: Section, items: &[Item]) -> Result<(), StoreError> {
        let mut sections = self.sections.write().map_err(|_| StoreError::Poisoned)?;
        sections.insert(section, items.to_vec());
        Ok(())
    }

    fn load_assemblies(&self) -> Result<Vec<Assembly>, StoreError> {
        let assemblies = self.assemblies.read().map_err(|_| StoreError::Poisoned)?;
        Ok(assemblies.clone())
    }

    fn save_assemblies(&self, assemblies: &[Assembly]) -> Result<(), StoreError> {
        let mut stored = self.assemblies.write().map_err(|_| StoreError::Poisoned)?;
        *stored = assemblies.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsaved_section_loads_seed_catalog() {
        let store = InMemorySnapshotStore::new();
        assert!(store.load_items(Section::Tools).unwrap().is_none());

        let catalog = store.load_catalog(Section::Tools).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn saved_empty_section_stays_empty() {
        let store = InMemorySnapshotStore::new();
        store.save_items(Section::SpareParts, &[]).unwrap();

        assert!(store.load_catalog(Section::SpareParts).unwrap().is_empty());
    }
}
