//! Reorder calculator.
//!
//! The deterministic formula `max(0, target - current)` is authoritative. An
//! advisory estimator may propose other quantities, but every proposal is
//! clamped so that:
//! - no quantity is ever negative
//! - an item at or above target always gets exactly `0`
//! - no item gets more than it takes to refill to target

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use vanstock_core::{Entity, ItemId};

use crate::item::Item;
use crate::ledger::HistoricalConsumption;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSuggestion {
    pub item_id: ItemId,
    pub reorder_quantity: u32,
}

impl ReorderSuggestion {
    pub fn needs_reorder(&self) -> bool {
        self.reorder_quantity > 0
    }
}

/// Untrusted quantity proposed by an advisory estimator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisedQuantity {
    pub item_id: ItemId,
    pub quantity: i64,
}

/// Current stock against target, as handed to an advisory estimator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub item_id: ItemId,
    pub quantity: u32,
    pub target_level: u32,
}

/// Units needed to bring `item` back to its target.
pub fn replenishment_quantity(item: &Item) -> u32 {
    item.target_stock().saturating_sub(item.current_stock())
}

/// Clamp an advisory proposal into `0..=replenishment_quantity(item)`.
pub fn clamp_advised(item: &Item, advised: i64) -> u32 {
    let ceiling = replenishment_quantity(item);
    if ceiling == 0 || advised <= 0 {
        return 0;
    }
    u32::try_from(advised).map_or(ceiling, |q| q.min(ceiling))
}

/// One suggestion per item, in input order, from the deterministic formula.
pub fn compute_reorder_quantities(items: &[Item], history: &[HistoricalConsumption]) -> Vec<ReorderSuggestion> {
    ReorderContext::new(items, history).suggestions()
}

/// Inputs of one reorder calculation.
#[derive(Debug, Clone, Copy)]
pub struct ReorderContext<'a> {
    items: &'a [Item],
    history: &'a [HistoricalConsumption],
}

impl<'a> ReorderContext<'a> {
    pub fn new(items: &'a [Item], history: &'a [HistoricalConsumption]) -> Self {
        Self { items, history }
    }

    pub fn items(&self) -> &'a [Item] {
        self.items
    }

    /// Stock levels in item order, for the advisory estimator.
    pub fn stock_levels(&self) -> Vec<StockLevel> {
        self.items
            .iter()
            .map(|item| StockLevel {
                item_id: item.id().clone(),
                quantity: item.current_stock(),
                target_level: item.target_stock(),
            })
            .collect()
    }

    /// History restricted to items in this calculation with a positive
    /// quantity. Everything else is dropped, not reported.
    pub fn usable_history(&self) -> Vec<HistoricalConsumption> {
        let known: HashSet<&ItemId> = self.items.iter().map(|i| i.id()).collect();
        self.history
            .iter()
            .filter(|h| h.quantity_consumed > 0 && known.contains(&h.item_id))
            .cloned()
            .collect()
    }

    pub fn suggestions(&self) -> Vec<ReorderSuggestion> {
        self.items
            .iter()
            .map(|item| ReorderSuggestion {
                item_id: item.id().clone(),
                reorder_quantity: replenishment_quantity(item),
            })
            .collect()
    }

    /// Suggestions using advisory proposals where present (first proposal per
    /// item wins), the formula elsewhere. Proposals for unknown items are
    /// ignored.
    pub fn suggestions_with_advice(&self, advice: &[AdvisedQuantity]) -> Vec<ReorderSuggestion> {
        let mut by_item: HashMap<&ItemId, i64> = HashMap::with_capacity(advice.len());
        for a in advice {
            by_item.entry(&a.item_id).or_insert(a.quantity);
        }

        self.items
            .iter()
            .map(|item| {
                let reorder_quantity = match by_item.get(item.id()) {
                    Some(advised) => clamp_advised(item, *advised),
                    None => replenishment_quantity(item),
                };
                ReorderSuggestion {
                    item_id: item.id().clone(),
                    reorder_quantity,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;

    use super::*;
    use crate::item::ItemDraft;
    use crate::price::Price;

    fn item(id: &str, stock: u32, target: u32) -> Item {
        Item::restore(
            ItemId::from(id),
            &ItemDraft {
                name: format!("Item {id}"),
                article_number: format!("ART-{id}"),
                list_price: Price::from_cents(100),
                target_stock: target,
                increment_step: 1,
            },
            stock,
        )
        .unwrap()
    }

    fn advised(id: &str, quantity: i64) -> AdvisedQuantity {
        AdvisedQuantity {
            item_id: ItemId::from(id),
            quantity,
        }
    }

    #[test]
    fn formula_replenishes_to_target() {
        let items = vec![item("1", 8, 10), item("3", 45, 100), item("tool-1", 1, 1), item("x", 7, 3)];
        let quantities: Vec<u32> = compute_reorder_quantities(&items, &[])
            .iter()
            .map(|s| s.reorder_quantity)
            .collect();
        assert_eq!(quantities, vec![2, 55, 0, 0]);
    }

    #[test]
    fn empty_items_give_empty_result() {
        assert!(compute_reorder_quantities(&[], &[]).is_empty());
    }

    #[test]
    fn advice_is_clamped_to_floor_and_ceiling() {
        let items = vec![item("a", 2, 10), item("b", 2, 10), item("c", 10, 10), item("d", 2, 10), item("e", 0, 4)];
        let advice = vec![advised("a", 5), advised("b", -3), advised("c", 7), advised("d", 500), advised("e", i64::MAX)];

        let quantities: Vec<u32> = ReorderContext::new(&items, &[])
            .suggestions_with_advice(&advice)
            .iter()
            .map(|s| s.reorder_quantity)
            .collect();

        assert_eq!(quantities, vec![5, 0, 0, 8, 4]);
    }

    #[test]
    fn items_without_advice_fall_back_to_formula() {
        let items = vec![item("a", 2, 10), item("b", 1, 4)];
        let advice = vec![advised("a", 3), advised("unknown", 9), advised("a", 1)];

        let suggestions = ReorderContext::new(&items, &[]).suggestions_with_advice(&advice);

        assert_eq!(suggestions[0].reorder_quantity, 3);
        assert_eq!(suggestions[1].reorder_quantity, 3);
    }

    #[test]
    fn usable_history_drops_unknown_items_and_zero_quantities() {
        let items = vec![item("1", 8, 10)];
        let now = Utc::now();
        let history = vec![
            HistoricalConsumption { item_id: ItemId::from("1"), quantity_consumed: 2, date: now },
            HistoricalConsumption { item_id: ItemId::from("1"), quantity_consumed: 0, date: now },
            HistoricalConsumption { item_id: ItemId::from("gone"), quantity_consumed: 4, date: now },
        ];

        let usable = ReorderContext::new(&items, &history).usable_history();
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].quantity_consumed, 2);
    }

    #[test]
    fn stock_levels_mirror_items() {
        let items = vec![item("1", 8, 10)];
        let levels = ReorderContext::new(&items, &[]).stock_levels();
        assert_eq!(
            levels,
            vec![StockLevel {
                item_id: ItemId::from("1"),
                quantity: 8,
                target_level: 10,
            }]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: without advice the result is exactly max(0, target - current),
        /// and computing twice gives the same answer.
        #[test]
        fn formula_holds_and_is_repeatable(
            levels in prop::collection::vec((0u32..1_000, 0u32..1_000), 0..20)
        ) {
            let items: Vec<Item> = levels
                .iter()
                .enumerate()
                .map(|(i, (stock, target))| item(&i.to_string(), *stock, *target))
                .collect();

            let first = compute_reorder_quantities(&items, &[]);
            let second = compute_reorder_quantities(&items, &[]);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), items.len());

            for (suggestion, (stock, target)) in first.iter().zip(levels.iter()) {
                let expected = if target > stock { target - stock } else { 0 };
                prop_assert_eq!(suggestion.reorder_quantity, expected);
            }
        }

        /// Property: whatever the advisor says, items at or above target get 0
        /// and nobody gets more than the refill quantity.
        #[test]
        fn clamp_law_holds_for_any_advice(
            stock in 0u32..1_000,
            target in 0u32..1_000,
            advice in any::<i64>(),
        ) {
            let it = item("x", stock, target);
            let q = clamp_advised(&it, advice);
            if stock >= target {
                prop_assert_eq!(q, 0);
            }
            prop_assert!(q <= replenishment_quantity(&it));
        }
    }
}
