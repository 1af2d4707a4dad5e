use core::str::FromStr;

use serde::{Deserialize, Serialize};

use vanstock_core::DomainError;

/// One of the vehicle's independent catalogs.
///
/// All sections share a single assembly ledger.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    /// Material used up on the job (rollers, screws, springs).
    #[default]
    AssemblyMaterial,
    SpareParts,
    Tools,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::AssemblyMaterial, Section::SpareParts, Section::Tools];

    /// Key under which the section's catalog is persisted.
    pub fn storage_key(self) -> &'static str {
        match self {
            Section::AssemblyMaterial => "items",
            Section::SpareParts => "spare_parts_items",
            Section::Tools => "tool_items",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::AssemblyMaterial => "Montagematerial",
            Section::SpareParts => "Ersatzteile",
            Section::Tools => "Werkzeug",
        }
    }
}

impl core::fmt::Display for Section {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Section {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "items" | "material" | "assembly-material" => Ok(Section::AssemblyMaterial),
            "spare-parts" | "spare_parts_items" | "spare-parts-items" | "parts" => Ok(Section::SpareParts),
            "tools" | "tool_items" | "tool-items" => Ok(Section::Tools),
            other => Err(DomainError::validation(format!(
                "unknown section '{other}' (expected material, spare-parts or tools)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_are_distinct() {
        let keys: Vec<_> = Section::ALL.iter().map(|s| s.storage_key()).collect();
        assert_eq!(keys, vec!["items", "spare_parts_items", "tool_items"]);
    }

    #[test]
    fn parses_cli_names_and_storage_keys() {
        assert_eq!("Material".parse::<Section>().unwrap(), Section::AssemblyMaterial);
        assert_eq!("spare_parts_items".parse::<Section>().unwrap(), Section::SpareParts);
        assert_eq!("tools".parse::<Section>().unwrap(), Section::Tools);
        assert!("kitchen".parse::<Section>().is_err());
    }
}
