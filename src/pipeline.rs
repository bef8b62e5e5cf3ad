//! Two-phase run: resolve every hero entity against the master table, then
//! walk each resolved hero and attach generated skill descriptions. One
//! shared parse context collects diagnostics for the whole run.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::data::hero_stats::HeroStatsTable;
use crate::data::language::LanguageTable;
use crate::data::master::MasterTable;
use crate::data::rules::RuleSet;
use crate::engine::context::{ParseContext, DEFAULT_MAX_LEVEL, STATUS_EFFECT_LANG_PREFIX};
use crate::engine::describe::placeholders_in;
use crate::engine::resolve::resolve_entity;
use crate::parsers::chain_strike::parse_chain_strike;
use crate::parsers::clear_buffs::parse_clear_buffs;
use crate::parsers::direct_effect::parse_direct_effect;
use crate::parsers::familiars::parse_familiars;
use crate::parsers::passive_skills::parse_passive_skills;
use crate::parsers::properties::parse_properties;
use crate::parsers::status_effects::parse_status_effects;
use crate::parsers::{Description, ParseInput};

/// Property type routed to the chain-strike parser instead of the generic
/// property parser.
const CHAIN_STRIKE_TYPE: &str = "DifferentExtraHitPowerChainStrike";

#[derive(Debug, Default)]
pub struct RunReport {
    /// Resolved hero records with `skillDescriptions` attached, in input
    /// order.
    pub heroes: Vec<(String, Value)>,
    /// Unique warnings in first-seen order.
    pub warnings: Vec<String>,
    /// Total warning count, duplicates included.
    pub total_warnings: usize,
}

/// Resolve every hero entity against the master table.
pub fn resolve_all(heroes: &Map<String, Value>, master: &MasterTable) -> Map<String, Value> {
    heroes
        .iter()
        .map(|(hero_id, entity)| (hero_id.clone(), resolve_entity(entity, &master.records)))
        .collect()
}

/// Run the full description pipeline over already-resolved hero records.
pub fn describe_all(
    resolved: &Map<String, Value>,
    lang: &LanguageTable,
    master: &MasterTable,
    rules: &RuleSet,
    stats: &HeroStatsTable,
) -> RunReport {
    let mut ctx = ParseContext::new(lang);
    let mut heroes = Vec::with_capacity(resolved.len());
    for (hero_id, entity) in resolved {
        let hero_stats = stats.final_stats(hero_id);
        let input = ParseInput {
            lang,
            master,
            rules,
            hero_id,
            hero_stats: &hero_stats,
        };
        heroes.push((hero_id.clone(), process_hero(entity, &input, &mut ctx)));
    }
    RunReport {
        heroes,
        warnings: ctx.warnings,
        total_warnings: ctx.total_warnings,
    }
}

fn process_hero(entity: &Value, input: &ParseInput, ctx: &mut ParseContext) -> Value {
    let mut processed = match entity {
        Value::Object(map) => map.clone(),
        other => {
            ctx.warn(format!("hero '{}' is not an object record", input.hero_id));
            return other.clone();
        }
    };
    processed.insert("name".to_string(), Value::from(input.hero_stats.name.clone()));

    ctx.hero_mana_speed = processed
        .get("manaSpeedId")
        .and_then(Value::as_str)
        .map(str::to_string);
    ctx.main_max_level = DEFAULT_MAX_LEVEL;

    let mut sections: Map<String, Value> = Map::new();
    if let Some(special) = processed.get("specialId_details").cloned() {
        if let Some(max_level) = special.get("maxLevel").and_then(Value::as_i64) {
            ctx.main_max_level = max_level;
        }

        let all_properties = special
            .get("properties")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let mut property_descs: Vec<Description> = Vec::new();
        let mut standard_properties = Vec::new();
        for prop in all_properties {
            if prop.get("propertyType").and_then(Value::as_str) == Some(CHAIN_STRIKE_TYPE) {
                property_descs.extend(parse_chain_strike(&prop, &special, input, ctx));
            } else {
                standard_properties.push(prop);
            }
        }

        insert_section(
            &mut sections,
            "directEffect",
            vec![parse_direct_effect(&special, input, ctx)],
        );
        if let Some(cleared) = parse_clear_buffs(&special, input, ctx) {
            insert_section(&mut sections, "clear_buffs", vec![cleared]);
        }
        property_descs.extend(parse_properties(&standard_properties, &special, input, ctx));
        insert_section(&mut sections, "properties", property_descs);

        if let Some(effects) = special.get("statusEffects").and_then(Value::as_array) {
            insert_section(
                &mut sections,
                "statusEffects",
                parse_status_effects(effects, &special, input, ctx, STATUS_EFFECT_LANG_PREFIX),
            );
        }
        if let Some(familiars) = special.get("summonedFamiliars").and_then(Value::as_array) {
            insert_section(
                &mut sections,
                "familiars",
                parse_familiars(familiars, &special, input, ctx),
            );
        }
    }

    let mut passives = processed
        .get("passiveSkills")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if let Some(costume_passives) = processed
        .get("costumeBonusesId_details")
        .and_then(|bonuses| bonuses.get("passiveSkills"))
        .and_then(Value::as_array)
    {
        passives.extend(costume_passives.iter().cloned());
    }
    insert_section(
        &mut sections,
        "passiveSkills",
        parse_passive_skills(&passives, input, ctx),
    );

    processed.insert("skillDescriptions".to_string(), Value::Object(sections));
    Value::Object(processed)
}

fn insert_section(sections: &mut Map<String, Value>, name: &str, descs: Vec<Description>) {
    if descs.is_empty() {
        return;
    }
    let value = serde_json::to_value(&descs).unwrap_or(Value::Null);
    sections.insert(name.to_string(), value);
}

/// Placeholder tokens still literal in the final texts, with occurrence
/// counts. Run over the processed heroes as a post-generation audit.
pub fn unresolved_placeholders(heroes: &[(String, Value)]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for (_, hero) in heroes {
        if let Some(sections) = hero.get("skillDescriptions") {
            collect_unresolved(sections, &mut counts);
        }
    }
    counts
}

fn collect_unresolved(node: &Value, counts: &mut BTreeMap<String, usize>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "text" || key == "title" {
                    collect_from_texts(child, counts);
                } else {
                    collect_unresolved(child, counts);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_unresolved(item, counts);
            }
        }
        _ => {}
    }
}

fn collect_from_texts(texts: &Value, counts: &mut BTreeMap<String, usize>) {
    if let Some(map) = texts.as_object() {
        for text in map.values().filter_map(Value::as_str) {
            for name in placeholders_in(text) {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
    }
}

/// Convenience wrapper: resolve, then describe.
pub fn run(
    heroes: &Map<String, Value>,
    lang: &LanguageTable,
    master: &MasterTable,
    rules: &RuleSet,
    stats: &HeroStatsTable,
) -> (Map<String, Value>, RunReport) {
    let resolved = resolve_all(heroes, master);
    let report = describe_all(&resolved, lang, master, rules, stats);
    (resolved, report)
}
