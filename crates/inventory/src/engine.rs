//! Stock ledger engine: the single path by which stock quantities change.
//!
//! Applying an assembly is split the same way an aggregate splits decision and
//! state evolution:
//!
//! 1. **Plan** (pure): validate the request against the catalog, build the
//!    assembly and the updated items. Nothing is written.
//! 2. **Commit**: write the updated items back and append the assembly.
//!
//! Every failure happens during planning, so a failed call leaves catalog and
//! ledger exactly as they were.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vanstock_core::{AssemblyId, DomainError, ItemId};

use crate::assembly::{Assembly, AssemblyLineItem};
use crate::catalog::CatalogStore;
use crate::item::Item;
use crate::ledger::AssemblyLedger;

/// Requested consumption: item id → quantity, in selection order.
///
/// A quantity of `0` means "selected but not used" and is ignored when the
/// assembly is applied. Setting the same item twice replaces the quantity and
/// keeps the item's original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumptionRequest {
    lines: IndexMap<ItemId, u32>,
}

impl ConsumptionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, item_id: ItemId, quantity: u32) -> &mut Self {
        self.lines.insert(item_id, quantity);
        self
    }

    pub fn with(mut self, item_id: impl Into<ItemId>, quantity: u32) -> Self {
        self.lines.insert(item_id.into(), quantity);
        self
    }

    /// Select an item at its increment step, the default quantity the stock
    /// view offers.
    pub fn select(&mut self, item: &Item) -> &mut Self {
        self.lines.insert(item.id_typed().clone(), item.increment_step());
        self
    }

    pub fn quantity(&self, item_id: &ItemId) -> Option<u32> {
        self.lines.get(item_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.lines.iter().map(|(id, qty)| (id, *qty))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn selected(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.iter().filter(|(_, qty)| *qty > 0)
    }
}

impl FromIterator<(ItemId, u32)> for ConsumptionRequest {
    fn from_iter<T: IntoIterator<Item = (ItemId, u32)>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

/// Command: record an assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyRequest {
    pub commission: String,
    pub consumption: ConsumptionRequest,
    pub occurred_at: DateTime<Utc>,
}

impl AssemblyRequest {
    /// Request stamped with the current time.
    pub fn new(commission: impl Into<String>, consumption: ConsumptionRequest) -> Self {
        Self {
            commission: commission.into(),
            consumption,
            occurred_at: Utc::now(),
        }
    }

    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }
}

/// What to do with a line whose quantity exceeds the available stock.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortfallPolicy {
    /// Leave the line out and commit the rest (fails only if nothing is left).
    #[default]
    ExcludeLine,
    /// Fail the whole call on the first shortfall.
    #[serde(rename = "abort")]
    AbortTransaction,
}

impl FromStr for ShortfallPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude-line" | "exclude" => Ok(Self::ExcludeLine),
            "abort" | "abort-transaction" => Ok(Self::AbortTransaction),
            other => Err(DomainError::validation(format!(
                "unknown shortfall policy '{other}' (expected 'exclude-line' or 'abort')"
            ))),
        }
    }
}

/// A requested line that could not be served from stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockShortfall {
    pub item_id: ItemId,
    pub name: String,
    pub available: u32,
    pub requested: u32,
}

impl core::fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "only {} of '{}' available ({} requested)",
            self.available, self.name, self.requested
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("commission must not be blank")]
    InvalidCommission,

    /// Nothing to commit: no positive quantity, or every such line fell short.
    #[error("assembly consumes nothing ({} line(s) excluded for insufficient stock)", .shortfalls.len())]
    EmptyTransaction { shortfalls: Vec<StockShortfall> },

    #[error("item {0} not found in catalog")]
    ItemNotFound(ItemId),

    #[error("insufficient stock for item {item_id}: {available} available, {requested} requested")]
    InsufficientStock {
        item_id: ItemId,
        available: u32,
        requested: u32,
    },

    #[error("quantity must be positive")]
    InvalidQuantity,
}

impl From<StockShortfall> for ApplyError {
    fn from(value: StockShortfall) -> Self {
        ApplyError::InsufficientStock {
            item_id: value.item_id,
            available: value.available,
            requested: value.requested,
        }
    }
}

/// Result of a successful apply: the committed assembly plus the lines that
/// were left out for lack of stock (empty under `AbortTransaction`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReceipt {
    pub assembly: Assembly,
    pub shortfalls: Vec<StockShortfall>,
}

/// Validated, not yet committed assembly.
struct AssemblyPlan {
    receipt: AssemblyReceipt,
    updated_items: Vec<Item>,
}

/// Applies consumption and receipts to a catalog.
///
/// Owns no data: catalog and ledger are passed in on every call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StockLedgerEngine {
    policy: ShortfallPolicy,
}

impl StockLedgerEngine {
    pub fn new(policy: ShortfallPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ShortfallPolicy {
        self.policy
    }

    /// Validate a request and show what `apply_assembly` would commit, without
    /// writing anything.
    pub fn plan_assembly<C>(&self, request: &AssemblyRequest, catalog: &C) -> Result<AssemblyReceipt, ApplyError>
    where
        C: CatalogStore + ?Sized,
    {
        self.plan(request, catalog).map(|plan| plan.receipt)
    }

    /// Apply an assembly: decrement stock for every committed line and append
    /// one assembly to the ledger. All-or-nothing per line, and nothing at all
    /// when the call fails.
    pub fn apply_assembly<C, L>(
        &self,
        request: &AssemblyRequest,
        catalog: &mut C,
        ledger: &mut L,
    ) -> Result<AssemblyReceipt, ApplyError>
    where
        C: CatalogStore + ?Sized,
        L: AssemblyLedger + ?Sized,
    {
        let AssemblyPlan { receipt, updated_items } = self.plan(request, catalog)?;

        for item in updated_items {
            catalog.upsert(item);
        }
        ledger.append(receipt.assembly.clone());

        Ok(receipt)
    }

    /// Book a delivery: increase an item's stock by `quantity`.
    pub fn receive_stock<C>(&self, item_id: &ItemId, quantity: u32, catalog: &mut C) -> Result<Item, ApplyError>
    where
        C: CatalogStore + ?Sized,
    {
        if quantity == 0 {
            return Err(ApplyError::InvalidQuantity);
        }
        let mut item = catalog
            .get(item_id)
            .ok_or_else(|| ApplyError::ItemNotFound(item_id.clone()))?;
        item.restock(quantity).map_err(|_| ApplyError::InvalidQuantity)?;
        catalog.upsert(item.clone());
        Ok(item)
    }

    fn plan<C>(&self, request: &AssemblyRequest, catalog: &C) -> Result<AssemblyPlan, ApplyError>
    where
        C: CatalogStore + ?Sized,
    {
        let commission = request.commission.trim();
        if commission.is_empty() {
            return Err(ApplyError::InvalidCommission);
        }

        if request.consumption.selected().next().is_none() {
            return Err(ApplyError::EmptyTransaction { shortfalls: Vec::new() });
        }

        // A missing item means the selection is out of sync with the catalog:
        // abort before looking at stock, whatever the line order.
        let mut resolved: Vec<(Item, u32)> = Vec::new();
        for (item_id, quantity) in request.consumption.selected() {
            let item = catalog
                .get(item_id)
                .ok_or_else(|| ApplyError::ItemNotFound(item_id.clone()))?;
            resolved.push((item, quantity));
        }

        let mut lines = Vec::with_capacity(resolved.len());
        let mut updated_items = Vec::with_capacity(resolved.len());
        let mut shortfalls = Vec::new();

        for (mut item, quantity) in resolved {
            if quantity > item.current_stock() {
                let shortfall = StockShortfall {
                    item_id: item.id_typed().clone(),
                    name: item.name().to_string(),
                    available: item.current_stock(),
                    requested: quantity,
                };
                match self.policy {
                    ShortfallPolicy::AbortTransaction => return Err(shortfall.into()),
                    ShortfallPolicy::ExcludeLine => {
                        shortfalls.push(shortfall);
                        continue;
                    }
                }
            }

            lines.push(AssemblyLineItem::snapshot(&item, quantity));
            item.withdraw(quantity).map_err(|_| ApplyError::InsufficientStock {
                item_id: item.id_typed().clone(),
                available: item.current_stock(),
                requested: quantity,
            })?;
            updated_items.push(item);
        }

        if lines.is_empty() {
            return Err(ApplyError::EmptyTransaction { shortfalls });
        }

        let assembly = Assembly::new(
            AssemblyId::new(),
            commission.to_string(),
            request.occurred_at,
            lines,
        );

        Ok(AssemblyPlan {
            receipt: AssemblyReceipt { assembly, shortfalls },
            updated_items,
        })
    }
}
