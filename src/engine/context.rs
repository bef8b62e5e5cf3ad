//! Per-run parse context: the diagnostics sink plus the cross-cutting
//! parameters every parser needs (current hero's max level, mana-speed
//! classification, precomputed language-key subsets). Constructed once per
//! run and passed down explicitly; never a process-wide singleton.

use std::collections::HashSet;

use crate::data::language::LanguageTable;

pub const DEFAULT_MAX_LEVEL: i64 = 8;

pub const PROPERTY_LANG_PREFIX: &str = "specials.v2.property.";
pub const STATUS_EFFECT_LANG_PREFIX: &str = "specials.v2.statuseffect.";
pub const FAMILIAR_LANG_PREFIX: &str = "specials.v2.familiar.";
pub const PASSIVE_TITLE_PREFIX: &str = "herocard.passive_skill.title.";
pub const PASSIVE_DESCRIPTION_PREFIX: &str = "herocard.passive_skill.description.";

#[derive(Debug, Default)]
pub struct ParseContext {
    /// Unique warnings in first-seen order.
    pub warnings: Vec<String>,
    /// Total number of reported warnings, duplicates included.
    pub total_warnings: usize,
    seen: HashSet<String>,
    /// Max level of the special currently being parsed.
    pub main_max_level: i64,
    /// The current hero's mana-speed id (drives container properties).
    pub hero_mana_speed: Option<String>,
    /// Sorted subsets of the language table, computed once per run.
    pub prop_lang_subset: Vec<String>,
    pub status_lang_subset: Vec<String>,
    pub familiar_lang_subset: Vec<String>,
    pub extra_lang_ids: Vec<String>,
}

impl ParseContext {
    pub fn new(table: &LanguageTable) -> Self {
        ParseContext {
            main_max_level: DEFAULT_MAX_LEVEL,
            prop_lang_subset: table.keys_with_prefix(PROPERTY_LANG_PREFIX),
            status_lang_subset: table.keys_with_prefix(STATUS_EFFECT_LANG_PREFIX),
            familiar_lang_subset: table.keys_with_prefix(FAMILIAR_LANG_PREFIX),
            extra_lang_ids: table.keys_containing(".extra"),
            ..ParseContext::default()
        }
    }

    /// Report a warning. The ordered list holds each distinct message once;
    /// the total count keeps track of repeats.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.total_warnings += 1;
        if self.seen.insert(message.clone()) {
            self.warnings.push(message);
        }
    }

    pub fn unique_warning_count(&self) -> usize {
        self.warnings.len()
    }
}
