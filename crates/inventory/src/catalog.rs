//! Item catalog: the store that owns item records, plus the editing and query
//! operations the settings and stock views need.

use core::cmp::Ordering;

use indexmap::IndexMap;

use vanstock_core::{DomainError, DomainResult, Entity, ItemId};

use crate::item::{Item, ItemDraft};

/// Read/write handle to an item catalog.
///
/// Implementations keep insertion order in `list`. `upsert` stores whatever
/// item it is given; the stock ledger engine and the editing functions below
/// read an item, change it through its own methods and write it back.
pub trait CatalogStore {
    fn get(&self, id: &ItemId) -> Option<Item>;
    fn list(&self) -> Vec<Item>;
    fn upsert(&mut self, item: Item);
    fn remove(&mut self, id: &ItemId) -> Option<Item>;

    fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }
}

impl<S> CatalogStore for &mut S
where
    S: CatalogStore + ?Sized,
{
    fn get(&self, id: &ItemId) -> Option<Item> {
        (**self).get(id)
    }

    fn list(&self) -> Vec<Item> {
        (**self).list()
    }

    fn upsert(&mut self, item: Item) {
        (**self).upsert(item)
    }

    fn remove(&mut self, id: &ItemId) -> Option<Item> {
        (**self).remove(id)
    }
}

/// In-memory catalog (one section of the vehicle stock).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryCatalog {
    items: IndexMap<ItemId, Item>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from loaded records, rejecting duplicate ids.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> DomainResult<Self> {
        let mut map = IndexMap::new();
        for item in items {
            let id = item.id().clone();
            if map.insert(id.clone(), item).is_some() {
                return Err(DomainError::conflict(format!("duplicate item id {id}")));
            }
        }
        Ok(Self { items: map })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items.into_values().collect()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn get(&self, id: &ItemId) -> Option<Item> {
        self.items.get(id).cloned()
    }

    fn list(&self) -> Vec<Item> {
        self.items.values().cloned().collect()
    }

    fn upsert(&mut self, item: Item) {
        // Existing keys keep their position.
        self.items.insert(item.id().clone(), item);
    }

    fn remove(&mut self, id: &ItemId) -> Option<Item> {
        self.items.shift_remove(id)
    }

    fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }
}

/// Add a new item with a generated id and zero stock.
pub fn create_item<C>(catalog: &mut C, draft: &ItemDraft) -> DomainResult<Item>
where
    C: CatalogStore + ?Sized,
{
    let id = ItemId::generate();
    if catalog.contains(&id) {
        return Err(DomainError::conflict(format!("item id {id} already taken")));
    }
    let item = Item::create(id, draft)?;
    catalog.upsert(item.clone());
    Ok(item)
}

/// Update an item's descriptive fields and targets. Stock is not touched.
pub fn revise_item<C>(catalog: &mut C, id: &ItemId, draft: &ItemDraft) -> DomainResult<Item>
where
    C: CatalogStore + ?Sized,
{
    let mut item = catalog
        .get(id)
        .ok_or_else(|| DomainError::not_found(format!("item {id}")))?;
    item.revise(draft)?;
    catalog.upsert(item.clone());
    Ok(item)
}

/// Delete an item. Ledger lines that reference it keep their snapshot fields.
pub fn remove_item<C>(catalog: &mut C, id: &ItemId) -> DomainResult<Item>
where
    C: CatalogStore + ?Sized,
{
    catalog
        .remove(id)
        .ok_or_else(|| DomainError::not_found(format!("item {id}")))
}

/// Items matching `term`, emptiest first (stock view ordering).
pub fn stock_view<C>(catalog: &C, term: &str) -> Vec<Item>
where
    C: CatalogStore + ?Sized,
{
    let mut items: Vec<Item> = catalog.list().into_iter().filter(|i| i.matches(term)).collect();
    items.sort_by(|a, b| {
        a.stock_ratio()
            .partial_cmp(&b.stock_ratio())
            .unwrap_or(Ordering::Equal)
    });
    items
}

/// Items matching `term`, by name (settings view ordering).
pub fn settings_view<C>(catalog: &C, term: &str) -> Vec<Item>
where
    C: CatalogStore + ?Sized,
{
    let mut items: Vec<Item> = catalog.list().into_iter().filter(|i| i.matches(term)).collect();
    items.sort_by(|a, b| {
        a.name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name()))
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::Price;

    fn draft(name: &str, article: &str, target: u32) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            article_number: article.to_string(),
            list_price: Price::from_cents(1500),
            target_stock: target,
            increment_step: 1,
        }
    }

    fn seeded() -> InMemoryCatalog {
        InMemoryCatalog::from_items([
            Item::restore(ItemId::from("1"), &draft("Rollenbock SPU", "63637", 10), 8).unwrap(),
            Item::restore(ItemId::from("3"), &draft("Schrauben-Set TX-30", "SML-484", 100), 45).unwrap(),
            Item::restore(ItemId::from("5"), &draft("Garagentor-Feder L700", "FDR-L700", 4), 1).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn from_items_rejects_duplicate_ids() {
        let a = Item::restore(ItemId::from("1"), &draft("Rollenbock", "63637", 10), 1).unwrap();
        let err = InMemoryCatalog::from_items([a.clone(), a]).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn create_item_generates_id_and_zero_stock() {
        let mut catalog = seeded();
        let item = create_item(&mut catalog, &draft("Dübel 10mm", "DBL-10", 200)).unwrap();

        assert_eq!(item.current_stock(), 0);
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get(item.id()), Some(item));
    }

    #[test]
    fn create_item_with_invalid_draft_adds_nothing() {
        let mut catalog = seeded();
        assert!(create_item(&mut catalog, &draft("D", "DBL-10", 200)).is_err());
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn revise_item_keeps_position_and_stock() {
        let mut catalog = seeded();
        let id = ItemId::from("3");

        let revised = revise_item(&mut catalog, &id, &draft("Schrauben-Set TX-40", "SML-485", 80)).unwrap();

        assert_eq!(revised.current_stock(), 45);
        assert_eq!(catalog.list()[1].name(), "Schrauben-Set TX-40");
    }

    #[test]
    fn revise_and_remove_unknown_item_is_not_found() {
        let mut catalog = seeded();
        let missing = ItemId::from("Z");

        let err = revise_item(&mut catalog, &missing, &draft("Dübel", "DBL", 1)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = remove_item(&mut catalog, &missing).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn remove_item_preserves_order_of_the_rest() {
        let mut catalog = seeded();
        remove_item(&mut catalog, &ItemId::from("1")).unwrap();

        let ids: Vec<_> = catalog.list().iter().map(|i| i.id().to_string()).collect();
        assert_eq!(ids, vec!["3", "5"]);
    }

    #[test]
    fn stock_view_sorts_emptiest_first_and_filters() {
        let catalog = seeded();

        let ids: Vec<_> = stock_view(&catalog, "").iter().map(|i| i.id().to_string()).collect();
        assert_eq!(ids, vec!["5", "3", "1"]);

        let hits = stock_view(&catalog, "feder");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].article_number(), "FDR-L700");
    }

    #[test]
    fn settings_view_sorts_by_name() {
        let catalog = seeded();
        let names: Vec<_> = settings_view(&catalog, "").iter().map(|i| i.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["Garagentor-Feder L700", "Rollenbock SPU", "Schrauben-Set TX-30"]
        );
    }
}
