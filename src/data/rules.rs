//! Layered override rules, loaded from CSV: `hero_rules.csv` maps a
//! placeholder name to a fixed value or a flattened-key name to read;
//! `lang_overrides.csv` maps an effect id directly to a template id. Rows
//! with hero id `common` form the common layer; anything else is
//! hero-specific. A present override always wins over heuristic resolution.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::data::DataError;

pub const COMMON_LAYER: &str = "common";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueRule {
    /// Literal value, tried as int, then float, then raw string.
    Fixed(String),
    /// Name of the flattened key to read; must match exactly one key.
    Key(String),
}

#[derive(Debug, Clone)]
pub struct LayeredRules<T> {
    pub specific: HashMap<String, HashMap<String, T>>,
    pub common: HashMap<String, T>,
}

// Manual impl: a derived Default would demand `T: Default`, which rule
// types like ValueRule do not provide.
impl<T> Default for LayeredRules<T> {
    fn default() -> Self {
        LayeredRules {
            specific: HashMap::new(),
            common: HashMap::new(),
        }
    }
}

impl<T> LayeredRules<T> {
    /// Hero-specific entry first, common entry second.
    pub fn lookup(&self, hero_id: &str, key: &str) -> Option<&T> {
        self.specific
            .get(hero_id)
            .and_then(|rules| rules.get(key))
            .or_else(|| self.common.get(key))
    }

    pub fn insert(&mut self, hero_id: &str, key: String, value: T) {
        if hero_id == COMMON_LAYER {
            self.common.insert(key, value);
        } else {
            self.specific
                .entry(hero_id.to_string())
                .or_default()
                .insert(key, value);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub hero_rules: LayeredRules<ValueRule>,
    pub lang_overrides: LayeredRules<String>,
}

impl RuleSet {
    /// Template-id override for an effect id, bypassing the matcher.
    pub fn lang_override(&self, hero_id: &str, effect_id: &str) -> Option<&str> {
        self.lang_overrides
            .lookup(hero_id, effect_id)
            .map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct HeroRuleRow {
    hero_id: String,
    placeholder: String,
    calc: String,
    target: String,
}

#[derive(Debug, Deserialize)]
struct LangOverrideRow {
    hero_id: String,
    effect_id: String,
    lang_id: String,
}

/// Load both rule files from `dir`. Missing files yield empty layers: rules
/// are optional refinements, not required inputs.
pub fn load_rules(dir: &Path) -> Result<RuleSet, DataError> {
    let mut rules = RuleSet::default();

    let hero_rules_path = dir.join("hero_rules.csv");
    if hero_rules_path.exists() {
        let mut reader = csv::Reader::from_reader(File::open(&hero_rules_path)?);
        for row in reader.deserialize() {
            let row: HeroRuleRow = row?;
            let rule = if row.calc == "fixed" {
                ValueRule::Fixed(row.target)
            } else {
                ValueRule::Key(row.target)
            };
            rules
                .hero_rules
                .insert(&row.hero_id, row.placeholder.to_uppercase(), rule);
        }
    }

    let overrides_path = dir.join("lang_overrides.csv");
    if overrides_path.exists() {
        let mut reader = csv::Reader::from_reader(File::open(&overrides_path)?);
        for row in reader.deserialize() {
            let row: LangOverrideRow = row?;
            rules
                .lang_overrides
                .insert(&row.hero_id, row.effect_id, row.lang_id);
        }
    }

    Ok(rules)
}
