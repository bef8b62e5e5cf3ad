//! One parser per effect kind, all producing the same [Description] shape.
//! A failed template lookup never aborts a hero: it yields a
//! `SEARCH_FAILED` Description plus a diagnostic, and siblings continue.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::data::hero_stats::HeroStats;
use crate::data::language::LanguageTable;
use crate::data::master::MasterTable;
use crate::data::rules::RuleSet;
use crate::engine::context::ParseContext;
use crate::engine::describe::{generate_description, normalize_bullets, placeholders_in};
use crate::engine::value::find_and_calculate_value;

pub mod chain_strike;
pub mod clear_buffs;
pub mod direct_effect;
pub mod familiars;
pub mod passive_skills;
pub mod properties;
pub mod status_effects;

/// Sentinel lang_id marking an effect no template could be determined for.
pub const SEARCH_FAILED: &str = "SEARCH_FAILED";

/// The engine's uniform output unit. Descriptions form a tree via
/// `nested_effects`; once a parser returns one it is never mutated again.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Description {
    pub id: String,
    pub lang_id: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    /// Rendered text per language code.
    pub text: BTreeMap<String, String>,
    /// Passive skills carry a separate title text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested_effects: Vec<Description>,
    /// Extra-description tooltip, when one exists for the effect's type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Box<Description>>,
}

/// Read-only tables plus the current hero, shared by every parser call.
#[derive(Debug, Clone, Copy)]
pub struct ParseInput<'a> {
    pub lang: &'a LanguageTable,
    pub master: &'a MasterTable,
    pub rules: &'a RuleSet,
    pub hero_id: &'a str,
    pub hero_stats: &'a HeroStats,
}

impl<'a> ParseInput<'a> {
    /// A well-formed failure record: the diagnostic text stands in for the
    /// game text in every language.
    pub fn failure(&self, id: impl Into<String>, text: impl Into<String>) -> Description {
        let text = text.into();
        Description {
            id: id.into(),
            lang_id: SEARCH_FAILED.to_string(),
            text: self
                .lang
                .languages
                .iter()
                .map(|language| (language.clone(), text.clone()))
                .collect(),
            ..Description::default()
        }
    }

    /// Render a template and flag any placeholder left unresolved in the
    /// output as a diagnostic (the literal token stays in the text so the
    /// output remains inspectable).
    pub fn render(
        &self,
        lang_id: &str,
        params: &Map<String, Value>,
        ctx: &mut ParseContext,
    ) -> BTreeMap<String, String> {
        let texts = generate_description(lang_id, params, self.lang);
        for text in texts.values() {
            for name in placeholders_in(text) {
                ctx.warn(format!(
                    "unresolved placeholder '{{{name}}}' in template '{lang_id}'"
                ));
            }
        }
        texts
    }
}

/// Max level for a block: its own `maxLevel` field, else the run default.
pub(crate) fn max_level_of(block: &Value, ctx: &ParseContext) -> i64 {
    block
        .get("maxLevel")
        .and_then(Value::as_i64)
        .unwrap_or(ctx.main_max_level)
}

/// A search context is the block plus the effective `maxLevel`, so rule
/// lookups and the value heuristic see the level they scale against.
pub(crate) fn search_context(block: &Map<String, Value>, max_level: i64) -> Value {
    let mut context = block.clone();
    context.insert("maxLevel".to_string(), Value::from(max_level));
    Value::Object(context)
}

/// Shared tooltip lookup: language keys containing both the skill name and
/// `.extra`, filtered by category substring. Placeholders already computed
/// for the main description are reused; the remainder resolves against the
/// same search context. Text is bullet-normalized.
pub(crate) fn find_extra_description(
    categories: &[&str],
    skill_name: &str,
    context: &Value,
    main_params: &Map<String, Value>,
    input: &ParseInput,
    ctx: &mut ParseContext,
) -> Option<Description> {
    if skill_name.is_empty() || categories.is_empty() {
        return None;
    }
    let skill_name_lower = skill_name.to_lowercase();
    let extra_lang_id = ctx
        .extra_lang_ids
        .iter()
        .filter(|key| key.contains(&skill_name_lower) && key.contains(".extra"))
        .find(|key| categories.iter().any(|cat| key.contains(cat)))?
        .clone();
    if !input.lang.contains(&extra_lang_id) {
        return None;
    }

    let max_level = max_level_of(context, ctx);
    let mut params = Map::new();
    let placeholders = placeholders_in(input.lang.primary_text(&extra_lang_id));
    for name in &placeholders {
        if let Some(value) = main_params.get(name) {
            params.insert(name.clone(), value.clone());
            continue;
        }
        if let Some((value, _)) = find_and_calculate_value(
            name,
            context,
            max_level,
            input.hero_id,
            input.rules,
            false,
            &[],
        ) {
            params.insert(name.clone(), value);
        }
    }

    let texts: BTreeMap<String, String> = input
        .render(&extra_lang_id, &params, ctx)
        .into_iter()
        .map(|(language, text)| (language, normalize_bullets(&text)))
        .collect();
    Some(Description {
        id: "extra".to_string(),
        lang_id: extra_lang_id,
        params,
        text: texts,
        ..Description::default()
    })
}
