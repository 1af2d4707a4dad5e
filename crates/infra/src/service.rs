//! Stock service: application-level orchestration around the engine.
//!
//! ```text
//! call
//!   ↓
//! 1. take the write lock (one mutation at a time)
//!   ↓
//! 2. load section catalog + ledger from the snapshot store
//!   ↓
//! 3. run the engine / catalog operation in memory
//!   ↓
//! 4. persist catalog, then ledger
//!   ↓
//! 5. publish an InventoryEvent (best-effort)
//! ```
//!
//! A failure in steps 1-3 writes nothing. If the ledger write in step 4
//! fails after the catalog was saved, the catalog is written back as it was
//! loaded, so stock never stays decremented without its assembly. Only when
//! that restore fails too does the store keep the partial write; it is logged.
//! Publication failures are logged only; the change is already durable.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use vanstock_core::{DomainError, Entity, ItemId};
use vanstock_events::{EventBus, EventEnvelope};
use vanstock_inventory::catalog::{create_item, remove_item, revise_item, settings_view, stock_view};
use vanstock_inventory::events::{AssemblyRecorded, ItemCreated, ItemRemoved, ItemRevised, StockReceived};
use vanstock_inventory::{
    ApplyError, Assembly, AssemblyLedger, AssemblyReceipt, AssemblyRequest, CatalogStore, HistoricalConsumption,
    InventoryEvent, Item, ItemDraft, StockLedgerEngine,
};

use crate::section::Section;
use crate::snapshot_store::{SnapshotStore, StoreError};

const LEDGER_STREAM: &str = "assemblies";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("service lock poisoned")]
    Poisoned,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Serializes all mutations of one data directory and publishes what changed.
#[derive(Debug)]
pub struct StockService<S, B> {
    store: S,
    bus: B,
    engine: StockLedgerEngine,
    write_lock: Mutex<()>,
    sequence: AtomicU64,
}

impl<S, B> StockService<S, B> {
    pub fn new(store: S, bus: B, engine: StockLedgerEngine) -> Self {
        Self {
            store,
            bus,
            engine,
            write_lock: Mutex::new(()),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn engine(&self) -> StockLedgerEngine {
        self.engine
    }
}

impl<S, B> StockService<S, B>
where
    S: SnapshotStore,
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    /// Section items in stored order.
    pub fn items(&self, section: Section) -> ServiceResult<Vec<Item>> {
        Ok(self.store.load_catalog(section)?.list())
    }

    /// Stock view: matching items, emptiest first.
    pub fn stock_view(&self, section: Section, term: &str) -> ServiceResult<Vec<Item>> {
        Ok(stock_view(&self.store.load_catalog(section)?, term))
    }

    /// Settings view: matching items by name.
    pub fn settings_view(&self, section: Section, term: &str) -> ServiceResult<Vec<Item>> {
        Ok(settings_view(&self.store.load_catalog(section)?, term))
    }

    /// Assemblies for display, most recent first.
    pub fn assemblies(&self) -> ServiceResult<Vec<Assembly>> {
        Ok(self.store.load_ledger()?.newest_first())
    }

    /// Section items and the full consumption history, for the reorder calculator.
    pub fn reorder_inputs(&self, section: Section) -> ServiceResult<(Vec<Item>, Vec<HistoricalConsumption>)> {
        let items = self.items(section)?;
        let history = self.store.load_ledger()?.history();
        Ok((items, history))
    }

    #[instrument(skip(self, section, request), fields(section = %section, commission = %request.commission))]
    pub fn record_assembly(&self, section: Section, request: &AssemblyRequest) -> ServiceResult<AssemblyReceipt> {
        let _guard = self.write_lock.lock().map_err(|_| ServiceError::Poisoned)?;

        let mut catalog = self.store.load_catalog(section)?;
        let mut ledger = self.store.load_ledger()?;
        let before = catalog.clone();

        let receipt = self
            .engine
            .apply_assembly(request, &mut catalog, &mut ledger)
            .inspect_err(|e| debug!(error = %e, "assembly rejected"))?;

        self.store.save_catalog(section, &catalog)?;
        if let Err(e) = self.store.save_ledger(&ledger) {
            if let Err(restore) = self.store.save_catalog(section, &before) {
                warn!(error = %restore, "catalog restore failed; stock saved without its assembly");
            }
            return Err(e.into());
        }

        for shortfall in &receipt.shortfalls {
            warn!(
                item_id = %shortfall.item_id,
                available = shortfall.available,
                requested = shortfall.requested,
                "line excluded for insufficient stock"
            );
        }
        info!(
            assembly_id = %receipt.assembly.id_typed(),
            lines = receipt.assembly.items().len(),
            units = receipt.assembly.total_units(),
            "assembly recorded"
        );

        self.publish(
            LEDGER_STREAM,
            InventoryEvent::AssemblyRecorded(AssemblyRecorded {
                assembly: receipt.assembly.clone(),
                shortfalls: receipt.shortfalls.clone(),
            }),
        );
        Ok(receipt)
    }

    #[instrument(skip(self, section), fields(section = %section))]
    pub fn receive_stock(&self, section: Section, item_id: &ItemId, quantity: u32) -> ServiceResult<Item> {
        let _guard = self.write_lock.lock().map_err(|_| ServiceError::Poisoned)?;

        let mut catalog = self.store.load_catalog(section)?;
        let item = self.engine.receive_stock(item_id, quantity, &mut catalog)?;
        self.store.save_catalog(section, &catalog)?;

        info!(new_stock = item.current_stock(), "stock received");
        self.publish(
            section.storage_key(),
            InventoryEvent::StockReceived(StockReceived {
                item_id: item_id.clone(),
                quantity,
                new_stock: item.current_stock(),
                occurred_at: Utc::now(),
            }),
        );
        Ok(item)
    }

    #[instrument(skip(self, section, draft), fields(section = %section, name = %draft.name))]
    pub fn create_item(&self, section: Section, draft: &ItemDraft) -> ServiceResult<Item> {
        let _guard = self.write_lock.lock().map_err(|_| ServiceError::Poisoned)?;

        let mut catalog = self.store.load_catalog(section)?;
        let item = create_item(&mut catalog, draft)?;
        self.store.save_catalog(section, &catalog)?;

        info!(item_id = %item.id(), "item created");
        self.publish(
            section.storage_key(),
            InventoryEvent::ItemCreated(ItemCreated {
                item: item.clone(),
                occurred_at: Utc::now(),
            }),
        );
        Ok(item)
    }

    #[instrument(skip(self, section, draft), fields(section = %section))]
    pub fn revise_item(&self, section: Section, item_id: &ItemId, draft: &ItemDraft) -> ServiceResult<Item> {
        let _guard = self.write_lock.lock().map_err(|_| ServiceError::Poisoned)?;

        let mut catalog = self.store.load_catalog(section)?;
        let item = revise_item(&mut catalog, item_id, draft)?;
        self.store.save_catalog(section, &catalog)?;

        info!("item revised");
        self.publish(
            section.storage_key(),
            InventoryEvent::ItemRevised(ItemRevised {
                item: item.clone(),
                occurred_at: Utc::now(),
            }),
        );
        Ok(item)
    }

    #[instrument(skip(self, section), fields(section = %section))]
    pub fn remove_item(&self, section: Section, item_id: &ItemId) -> ServiceResult<Item> {
        let _guard = self.write_lock.lock().map_err(|_| ServiceError::Poisoned)?;

        let mut catalog = self.store.load_catalog(section)?;
        let removed = remove_item(&mut catalog, item_id)?;
        self.store.save_catalog(section, &catalog)?;

        info!("item removed");
        self.publish(
            section.storage_key(),
            InventoryEvent::ItemRemoved(ItemRemoved {
                item_id: item_id.clone(),
                occurred_at: Utc::now(),
            }),
        );
        Ok(removed)
    }

    fn publish(&self, stream: &str, event: InventoryEvent) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let envelope = EventEnvelope::new(Uuid::now_v7(), stream, sequence, event);
        if let Err(e) = self.bus.publish(envelope) {
            warn!(error = ?e, stream, "event publication failed; state is already saved");
        }
    }
}
