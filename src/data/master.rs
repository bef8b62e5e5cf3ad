//! Master record table: identifier -> reusable effect/skill/familiar
//! definition, plus the set of type keywords that have extra-description
//! tooltips in the language table.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::data::language::LanguageTable;
use crate::data::DataError;

#[derive(Debug, Clone, Default)]
pub struct MasterTable {
    pub records: Map<String, Value>,
    /// Lowercased type keywords eligible for an extra-description lookup.
    pub extra_description_keys: HashSet<String>,
}

impl MasterTable {
    pub fn has_extra_description(&self, type_keyword: &str) -> bool {
        !type_keyword.is_empty() && self.extra_description_keys.contains(type_keyword)
    }
}

/// Load the master table and derive the extra-description keyword set from
/// the language table: for every key shaped `...<name>.extra...`, the
/// segment before `.extra` is eligible.
pub fn load_master_table(path: &Path, languages: &LanguageTable) -> Result<MasterTable, DataError> {
    let raw = fs::read_to_string(path)?;
    let records: Map<String, Value> = serde_json::from_str(&raw)?;
    Ok(MasterTable {
        records,
        extra_description_keys: derive_extra_description_keys(languages),
    })
}

/// Load a plain id -> record map (the hero entity file shares the master
/// table's shape).
pub fn load_entity_map(path: &Path) -> Result<Map<String, Value>, DataError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn derive_extra_description_keys(languages: &LanguageTable) -> HashSet<String> {
    let mut keys = HashSet::new();
    for lang_id in languages.keys_containing(".extra") {
        if let Some(position) = lang_id.find(".extra") {
            if let Some(segment) = lang_id[..position].rsplit('.').next() {
                if !segment.is_empty() {
                    keys.insert(segment.to_lowercase());
                }
            }
        }
    }
    keys
}
