use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use vanstock_inventory::{Assembly, Item};

use super::r#trait::{SnapshotStore, StoreError};
use crate::section::Section;

const LEDGER_KEY: &str = "assemblies";

/// JSON snapshot files in one directory:
/// `items.json`, `spare_parts_items.json`, `tool_items.json`, `assemblies.json`.
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the target, so a crash never leaves a half-written snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.path_for(key);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&raw).map(Some).map_err(|source| {
            // Well-formed JSON holding records the catalog would not accept.
            if source.is_data() {
                StoreError::Corrupt(format!("{}: {source}", path.display()))
            } else {
                StoreError::Json { path, source }
            }
        })
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_err)?;

        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, value).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?;
            writer.flush().map_err(io_err)?;
        }
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;

        debug!(path = %path.display(), "snapshot written");
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn load_items(&self, section: Section) -> Result<Option<Vec<Item>>, StoreError> {
        self.read(section.storage_key())
    }

    fn save_items(&self, section: Section, items: &[Item]) -> Result<(), StoreError> {
        self.write(section.storage_key(), items)
    }

    fn load_assemblies(&self) -> Result<Vec<Assembly>, StoreError> {
        Ok(self.read(LEDGER_KEY)?.unwrap_or_default())
    }

    fn save_assemblies(&self, assemblies: &[Assembly]) -> Result<(), StoreError> {
        self.write(LEDGER_KEY, assemblies)
    }
}
