use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vanstock_core::ItemId;
use vanstock_events::Event;

use crate::assembly::Assembly;
use crate::engine::StockShortfall;
use crate::item::Item;

/// Event: ItemCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCreated {
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRevised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRevised {
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: AssemblyRecorded. Carries the lines left out because of shortfalls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyRecorded {
    pub assembly: Assembly,
    pub shortfalls: Vec<StockShortfall>,
}

/// Event: StockReceived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReceived {
    pub item_id: ItemId,
    pub quantity: u32,
    pub new_stock: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InventoryEvent {
    ItemCreated(ItemCreated),
    ItemRevised(ItemRevised),
    ItemRemoved(ItemRemoved),
    AssemblyRecorded(AssemblyRecorded),
    StockReceived(StockReceived),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemCreated(_) => "inventory.item.created",
            InventoryEvent::ItemRevised(_) => "inventory.item.revised",
            InventoryEvent::ItemRemoved(_) => "inventory.item.removed",
            InventoryEvent::AssemblyRecorded(_) => "inventory.assembly.recorded",
            InventoryEvent::StockReceived(_) => "inventory.stock.received",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::ItemCreated(e) => e.occurred_at,
            InventoryEvent::ItemRevised(e) => e.occurred_at,
            InventoryEvent::ItemRemoved(e) => e.occurred_at,
            InventoryEvent::AssemblyRecorded(e) => e.assembly.date(),
            InventoryEvent::StockReceived(e) => e.occurred_at,
        }
    }
}
