use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock level of one item, as seen by the advisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnapshot {
    pub item_id: String,
    pub current_stock: u32,
    pub target_stock: u32,
    pub increment_step: u32,
}

/// One past consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionSnapshot {
    pub item_id: String,
    pub quantity: u32,
    pub date: DateTime<Utc>,
}

/// Everything an advisory job sees: stock levels plus history, at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub as_of: DateTime<Utc>,
    pub items: Vec<ItemSnapshot>,
    pub history: Vec<ConsumptionSnapshot>,
}

impl StockSnapshot {
    pub fn new(as_of: DateTime<Utc>, items: Vec<ItemSnapshot>, history: Vec<ConsumptionSnapshot>) -> Self {
        Self { as_of, items, history }
    }
}
