//! Vehicle stock domain: item catalog, assembly ledger, stock ledger engine and
//! reorder calculator.
//!
//! This crate contains business rules only, implemented as deterministic domain
//! logic (no IO, no storage, no clock other than what callers pass in).

pub mod assembly;
pub mod catalog;
pub mod engine;
pub mod events;
pub mod item;
pub mod ledger;
pub mod price;
pub mod reorder;

pub use assembly::{Assembly, AssemblyLineItem};
pub use catalog::{CatalogStore, InMemoryCatalog};
pub use engine::{
    ApplyError, AssemblyReceipt, AssemblyRequest, ConsumptionRequest, ShortfallPolicy,
    StockLedgerEngine, StockShortfall,
};
pub use events::InventoryEvent;
pub use item::{Item, ItemDraft};
pub use ledger::{AssemblyLedger, HistoricalConsumption, InMemoryAssemblyLedger};
pub use price::Price;
pub use reorder::{
    AdvisedQuantity, ReorderContext, ReorderSuggestion, StockLevel, clamp_advised,
    compute_reorder_quantities, replenishment_quantity,
};
