//! Snapshot persistence for catalogs and the assembly ledger.
//!
//! The stock domain never touches storage; the service loads plain data from a
//! `SnapshotStore`, runs the engine in memory and writes the result back.

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemorySnapshotStore;
pub use json_file::JsonFileStore;
pub use r#trait::{SnapshotStore, StoreError};
