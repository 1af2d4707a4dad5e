use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use vanstock_core::{DomainError, DomainResult, Entity, ItemId};

use crate::price::Price;

/// Stock ratio below which an item is flagged as running low.
pub const LOW_STOCK_RATIO: f64 = 0.5;

/// Catalog entry: one type of stocked part or tool carried in the vehicle.
///
/// `current_stock` is unsigned, so negative stock is unrepresentable. There is
/// no setter: an existing item's stock moves only through the engine
/// (`withdraw` / `restock` are crate-private). `restore` sets an absolute
/// level and is meant for loading seed data and persisted records.
///
/// Deserialization runs the same draft validation as `create` and `revise`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ItemRecord")]
pub struct Item {
    id: ItemId,
    name: String,
    article_number: String,
    list_price: Price,
    current_stock: u32,
    target_stock: u32,
    increment_step: NonZeroU32,
}

/// Stored shape of an item, before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
    id: ItemId,
    name: String,
    article_number: String,
    list_price: Price,
    current_stock: u32,
    target_stock: u32,
    increment_step: u32,
}

impl TryFrom<ItemRecord> for Item {
    type Error = DomainError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        let draft = ItemDraft {
            name: record.name,
            article_number: record.article_number,
            list_price: record.list_price,
            target_stock: record.target_stock,
            increment_step: record.increment_step,
        };
        let id = record.id;
        let label = id.to_string();
        Item::restore(id, &draft, record.current_stock)
            .map_err(|e| match e {
                DomainError::Validation(msg) => DomainError::validation(format!("item {label}: {msg}")),
                other => other,
            })
    }
}

/// Editable fields of an item, as entered in the catalog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    pub article_number: String,
    pub list_price: Price,
    pub target_stock: u32,
    pub increment_step: u32,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            article_number: String::new(),
            list_price: Price::ZERO,
            target_stock: 10,
            increment_step: 1,
        }
    }
}

/// Validated draft fields.
struct ValidDraft {
    name: String,
    article_number: String,
    list_price: Price,
    target_stock: u32,
    increment_step: NonZeroU32,
}

impl ItemDraft {
    fn validate(&self) -> DomainResult<ValidDraft> {
        let name = self.name.trim();
        if name.chars().count() < 2 {
            return Err(DomainError::validation("name must be at least 2 characters"));
        }

        let article_number = self.article_number.trim();
        if article_number.is_empty() {
            return Err(DomainError::validation("article number is required"));
        }

        let increment_step = NonZeroU32::new(self.increment_step)
            .ok_or_else(|| DomainError::validation("increment step must be positive"))?;

        Ok(ValidDraft {
            name: name.to_string(),
            article_number: article_number.to_string(),
            list_price: self.list_price,
            target_stock: self.target_stock,
            increment_step,
        })
    }
}

impl Item {
    /// Create a new catalog item. New items start with zero stock.
    pub fn create(id: ItemId, draft: &ItemDraft) -> DomainResult<Self> {
        Self::restore(id, draft, 0)
    }

    /// Rebuild an item with a known stock level (seed data, persisted records).
    pub fn restore(id: ItemId, draft: &ItemDraft, current_stock: u32) -> DomainResult<Self> {
        let valid = draft.validate()?;
        Ok(Self {
            id,
            name: valid.name,
            article_number: valid.article_number,
            list_price: valid.list_price,
            current_stock,
            target_stock: valid.target_stock,
            increment_step: valid.increment_step,
        })
    }

    /// Replace the descriptive and target fields. Stock is left untouched.
    pub fn revise(&mut self, draft: &ItemDraft) -> DomainResult<()> {
        let valid = draft.validate()?;
        self.name = valid.name;
        self.article_number = valid.article_number;
        self.list_price = valid.list_price;
        self.target_stock = valid.target_stock;
        self.increment_step = valid.increment_step;
        Ok(())
    }

    pub fn id_typed(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn article_number(&self) -> &str {
        &self.article_number
    }

    pub fn list_price(&self) -> Price {
        self.list_price
    }

    pub fn current_stock(&self) -> u32 {
        self.current_stock
    }

    pub fn target_stock(&self) -> u32 {
        self.target_stock
    }

    /// Default quantity offered when the item is selected for an assembly.
    pub fn increment_step(&self) -> u32 {
        self.increment_step.get()
    }

    /// Current editable fields, e.g. to prefill an edit form.
    pub fn draft(&self) -> ItemDraft {
        ItemDraft {
            name: self.name.clone(),
            article_number: self.article_number.clone(),
            list_price: self.list_price,
            target_stock: self.target_stock,
            increment_step: self.increment_step.get(),
        }
    }

    /// Fill level relative to target; items without a target count as full.
    pub fn stock_ratio(&self) -> f64 {
        if self.target_stock == 0 {
            return 1.0;
        }
        f64::from(self.current_stock) / f64::from(self.target_stock)
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_ratio() < LOW_STOCK_RATIO
    }

    /// Case-insensitive match on name or article number.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.article_number.to_lowercase().contains(&term)
    }

    pub(crate) fn withdraw(&mut self, quantity: u32) -> DomainResult<()> {
        self.current_stock = self
            .current_stock
            .checked_sub(quantity)
            .ok_or_else(|| DomainError::invariant("stock cannot go negative"))?;
        Ok(())
    }

    pub(crate) fn restock(&mut self, quantity: u32) -> DomainResult<()> {
        self.current_stock = self
            .current_stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("stock overflow"))?;
        Ok(())
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, article: &str) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            article_number: article.to_string(),
            list_price: Price::from_cents(4550),
            target_stock: 10,
            increment_step: 1,
        }
    }

    #[test]
    fn create_starts_with_zero_stock_and_trims_fields() {
        let item = Item::create(ItemId::from("1"), &draft("  Rollenbock SPU ", " 63637 ")).unwrap();
        assert_eq!(item.current_stock(), 0);
        assert_eq!(item.name(), "Rollenbock SPU");
        assert_eq!(item.article_number(), "63637");
    }

    #[test]
    fn stored_records_are_validated_on_load() {
        let item = Item::restore(ItemId::from("5"), &draft("Garagentor-Feder L700", "FDR-L700"), 1).unwrap();
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(serde_json::from_str::<Item>(&json).unwrap(), item);

        let blank_name = json.replace("Garagentor-Feder L700", " ");
        let err = serde_json::from_str::<Item>(&blank_name).unwrap_err();
        assert!(err.to_string().contains("item 5"));

        let zero_step = json.replace("\"incrementStep\":1", "\"incrementStep\":0");
        assert!(serde_json::from_str::<Item>(&zero_step).is_err());
    }

    #[test]
    fn draft_validation_rejects_bad_fields() {
        let id = ItemId::from("1");

        let err = Item::create(id.clone(), &draft("X", "63637")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("name")));

        let err = Item::create(id.clone(), &draft("Rollenbock", "  ")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("article")));

        let mut zero_step = draft("Rollenbock", "63637");
        zero_step.increment_step = 0;
        let err = Item::create(id, &zero_step).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("increment")));
    }

    #[test]
    fn revise_keeps_stock() {
        let mut item = Item::restore(ItemId::from("1"), &draft("Rollenbock", "63637"), 8).unwrap();
        let mut changed = item.draft();
        changed.name = "Rollenbock SPU 2".to_string();
        changed.target_stock = 12;

        item.revise(&changed).unwrap();

        assert_eq!(item.current_stock(), 8);
        assert_eq!(item.target_stock(), 12);
        assert_eq!(item.name(), "Rollenbock SPU 2");
    }

    #[test]
    fn failed_revise_leaves_item_unchanged() {
        let mut item = Item::restore(ItemId::from("1"), &draft("Rollenbock", "63637"), 8).unwrap();
        let before = item.clone();

        assert!(item.revise(&draft("", "63637")).is_err());
        assert_eq!(item, before);
    }

    #[test]
    fn withdraw_never_goes_below_zero() {
        let mut item = Item::restore(ItemId::from("1"), &draft("Rollenbock", "63637"), 2).unwrap();
        assert!(item.withdraw(3).is_err());
        assert_eq!(item.current_stock(), 2);

        item.withdraw(2).unwrap();
        assert_eq!(item.current_stock(), 0);
    }

    #[test]
    fn low_stock_uses_half_target_threshold() {
        let low = Item::restore(ItemId::from("5"), &draft("Feder L700", "FDR-L700"), 4).unwrap();
        assert!(low.is_low_stock());

        let fine = Item::restore(ItemId::from("1"), &draft("Rollenbock", "63637"), 5).unwrap();
        assert!(!fine.is_low_stock());

        let mut no_target = draft("Akkuschrauber", "AS-18V");
        no_target.target_stock = 0;
        let tool = Item::restore(ItemId::from("tool-1"), &no_target, 0).unwrap();
        assert!(!tool.is_low_stock());
    }

    #[test]
    fn matches_name_or_article_number_case_insensitively() {
        let item = Item::restore(ItemId::from("3"), &draft("Schrauben-Set TX-30", "SML-484"), 45).unwrap();
        assert!(item.matches("schrauben"));
        assert!(item.matches("sml"));
        assert!(item.matches(""));
        assert!(!item.matches("dübel"));
    }

    #[test]
    fn zero_increment_step_is_rejected_on_deserialize() {
        let json = r#"{"id":"1","name":"Rollenbock","articleNumber":"63637","listPrice":4550,
            "currentStock":8,"targetStock":10,"incrementStep":0}"#;
        assert!(serde_json::from_str::<Item>(json).is_err());
    }
}
