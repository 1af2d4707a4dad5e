//! Built-in demo catalog, used when a section has never been saved.

use vanstock_core::{DomainResult, ItemId};
use vanstock_inventory::{Item, ItemDraft, Price};

use crate::section::Section;

struct SeedRow {
    id: &'static str,
    name: &'static str,
    article_number: &'static str,
    price_cents: u64,
    current_stock: u32,
    target_stock: u32,
    increment_step: u32,
}

const ASSEMBLY_MATERIAL: &[SeedRow] = &[
    SeedRow { id: "1", name: "Rollenbock SPU", article_number: "63637", price_cents: 4550, current_stock: 8, target_stock: 10, increment_step: 1 },
    SeedRow { id: "2", name: "Rollenhalter unten LPU", article_number: "74746", price_cents: 2200, current_stock: 4, target_stock: 5, increment_step: 1 },
    SeedRow { id: "3", name: "Schrauben-Set TX-30", article_number: "SML-484", price_cents: 1500, current_stock: 45, target_stock: 100, increment_step: 10 },
    SeedRow { id: "4", name: "Dübel 10mm", article_number: "DBL-10", price_cents: 875, current_stock: 120, target_stock: 200, increment_step: 10 },
    SeedRow { id: "5", name: "Garagentor-Feder L700", article_number: "FDR-L700", price_cents: 12000, current_stock: 1, target_stock: 4, increment_step: 1 },
];

const SPARE_PARTS: &[SeedRow] = &[
    SeedRow { id: "sp-1", name: "Handsender 4-Befehl", article_number: "HS-4", price_cents: 5500, current_stock: 3, target_stock: 5, increment_step: 1 },
    SeedRow { id: "sp-2", name: "Lichtschranke Universal", article_number: "LS-UNI", price_cents: 7500, current_stock: 2, target_stock: 3, increment_step: 1 },
];

const TOOLS: &[SeedRow] = &[
    SeedRow { id: "tool-1", name: "Akkuschrauber", article_number: "AS-18V", price_cents: 25000, current_stock: 1, target_stock: 1, increment_step: 1 },
    SeedRow { id: "tool-2", name: "Schlagbohrmaschine", article_number: "SBM-1", price_cents: 18000, current_stock: 1, target_stock: 1, increment_step: 1 },
];

/// Seed items for a section, in display order.
pub fn seed_items(section: Section) -> DomainResult<Vec<Item>> {
    let rows = match section {
        Section::AssemblyMaterial => ASSEMBLY_MATERIAL,
        Section::SpareParts => SPARE_PARTS,
        Section::Tools => TOOLS,
    };

    rows.iter()
        .map(|row| {
            Item::restore(
                ItemId::from(row.id),
                &ItemDraft {
                    name: row.name.to_string(),
                    article_number: row.article_number.to_string(),
                    list_price: Price::from_cents(row.price_cents),
                    target_stock: row.target_stock,
                    increment_step: row.increment_step,
                },
                row.current_stock,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_section_seeds_valid_items() {
        for section in Section::ALL {
            assert!(!seed_items(section).unwrap().is_empty(), "{section} is empty");
        }
    }

    #[test]
    fn material_seed_matches_demo_vehicle() {
        let items = seed_items(Section::AssemblyMaterial).unwrap();
        let spring = &items[4];
        assert_eq!(spring.name(), "Garagentor-Feder L700");
        assert_eq!(spring.list_price().to_string(), "120,00 €");
        assert_eq!((spring.current_stock(), spring.target_stock()), (1, 4));
        assert_eq!(items[2].increment_step(), 10);
    }
}
