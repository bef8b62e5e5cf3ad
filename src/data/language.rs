//! Localized template table: dotted template id -> per-language template
//! string. Loaded from `languages.json`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::data::DataError;

pub const DEFAULT_LANGUAGES: [&str; 2] = ["en", "ja"];

#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    entries: HashMap<String, HashMap<String, String>>,
    /// Language codes the table renders, sorted. Defaults to en/ja when the
    /// data names no others.
    pub languages: Vec<String>,
}

impl LanguageTable {
    pub fn from_entries(entries: HashMap<String, HashMap<String, String>>) -> Self {
        let mut languages: Vec<String> = entries
            .values()
            .flat_map(|texts| texts.keys().cloned())
            .collect();
        languages.sort();
        languages.dedup();
        if languages.is_empty() {
            languages = DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect();
        }
        LanguageTable { entries, languages }
    }

    pub fn contains(&self, lang_id: &str) -> bool {
        self.entries.contains_key(lang_id)
    }

    pub fn template(&self, lang_id: &str, language: &str) -> Option<&str> {
        self.entries.get(lang_id)?.get(language).map(String::as_str)
    }

    /// The English template text, used for placeholder discovery. Empty
    /// when the id or language is absent.
    pub fn primary_text(&self, lang_id: &str) -> &str {
        self.template(lang_id, "en").unwrap_or("")
    }

    /// All per-language texts behind one template id.
    pub fn entry(&self, lang_id: &str) -> Option<&HashMap<String, String>> {
        self.entries.get(lang_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted template ids starting with `prefix`.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Sorted template ids containing `fragment`.
    pub fn keys_containing(&self, fragment: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.contains(fragment))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

pub fn load_language_table(path: &Path) -> Result<LanguageTable, DataError> {
    let raw = fs::read_to_string(path)?;
    let entries: HashMap<String, HashMap<String, String>> = serde_json::from_str(&raw)?;
    Ok(LanguageTable::from_entries(entries))
}
