//! The special's direct effect (damage, heal, mana). Its template id is
//! fully determined by the effect's own classification fields, so no
//! heuristic matching is involved.

use serde_json::{Map, Value};

use crate::engine::context::ParseContext;
use crate::parsers::{max_level_of, Description, ParseInput};

pub fn parse_direct_effect(
    special: &Value,
    input: &ParseInput,
    ctx: &mut ParseContext,
) -> Description {
    let Some(effect) = special.get("directEffect").and_then(Value::as_object) else {
        return empty_direct_effect();
    };
    let Some(effect_type) = effect.get("effectType").and_then(Value::as_str) else {
        return empty_direct_effect();
    };

    let mut parts = vec!["specials.v2.directeffect".to_string(), effect_type.to_lowercase()];
    if let Some(target) = effect.get("typeOfTarget").and_then(Value::as_str) {
        parts.push(target.to_lowercase());
    }
    if let Some(side) = effect.get("sideAffected").and_then(Value::as_str) {
        parts.push(side.to_lowercase());
    }
    let mut lang_id = parts.join(".");

    let base = number_field(effect, "powerMultiplierPerMil");
    let increment = number_field(effect, "powerMultiplierIncrementPerLevelPerMil");
    if effect_type == "AddMana" {
        if base > 0.0 {
            lang_id.push_str(".increment");
        } else if base < 0.0 {
            lang_id.push_str(".decrement");
        }
    }
    let has_fixed_power = effect
        .get("hasFixedPower")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if has_fixed_power {
        lang_id.push_str(".fixedpower");
    }

    let max_level = max_level_of(special, ctx);
    let total = base + increment * (max_level - 1).max(0) as f64;

    let placeholder = match effect_type {
        "Damage" | "Heal" => "HEALTH",
        "HealthBoost" => "HEALTHBOOST",
        "AddMana" => "MANA",
        _ => "VALUE",
    };
    let mut params = Map::new();
    if base > 0.0 || increment > 0.0 {
        // Mana is stored in centi-units; everything else is permil.
        let value = if has_fixed_power {
            total.round() as i64
        } else if effect_type == "AddMana" {
            (total / 100.0).round() as i64
        } else {
            (total / 10.0).round() as i64
        };
        params.insert(placeholder.to_string(), Value::from(value));
    } else if base < 0.0 || increment < 0.0 {
        // Reductions use the coarser unit: an absolute value divided by 100.
        params.insert(
            placeholder.to_string(),
            Value::from((total / 100.0).round().abs() as i64),
        );
    }

    let text = input.render(&lang_id, &params, ctx);
    Description {
        id: effect
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("direct_effect")
            .to_string(),
        lang_id,
        params,
        text,
        ..Description::default()
    }
}

fn empty_direct_effect() -> Description {
    Description {
        id: "direct_effect_no_type".to_string(),
        lang_id: "N/A".to_string(),
        ..Description::default()
    }
}

fn number_field(map: &Map<String, Value>, key: &str) -> f64 {
    map.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::parse_direct_effect;
    use crate::data::hero_stats::HeroStats;
    use crate::data::language::LanguageTable;
    use crate::data::master::MasterTable;
    use crate::data::rules::RuleSet;
    use crate::engine::context::ParseContext;
    use crate::parsers::ParseInput;
    use serde_json::json;
    use std::collections::HashMap;

    fn lang_table() -> LanguageTable {
        let mut entries = HashMap::new();
        for (key, en) in [
            ("specials.v2.directeffect.damage.all.enemies", "Deals {HEALTH}% damage to all enemies."),
            ("specials.v2.directeffect.addmana.all.allies.increment", "All allies gain {MANA}% mana."),
        ] {
            let mut texts = HashMap::new();
            texts.insert("en".to_string(), en.to_string());
            texts.insert("ja".to_string(), en.to_string());
            entries.insert(key.to_string(), texts);
        }
        LanguageTable::from_entries(entries)
    }

    fn with_input<R>(f: impl FnOnce(&ParseInput, &mut ParseContext) -> R) -> R {
        let lang = lang_table();
        let master = MasterTable::default();
        let rules = RuleSet::default();
        let stats = HeroStats::default();
        let input = ParseInput {
            lang: &lang,
            master: &master,
            rules: &rules,
            hero_id: "hero.x",
            hero_stats: &stats,
        };
        let mut ctx = ParseContext::new(&lang);
        f(&input, &mut ctx)
    }

    #[test]
    fn damage_effect_builds_deterministic_id_and_scales_permil() {
        with_input(|input, ctx| {
            let special = json!({
                "maxLevel": 8,
                "directEffect": {
                    "effectType": "Damage",
                    "typeOfTarget": "All",
                    "sideAffected": "Enemies",
                    "powerMultiplierPerMil": 1000
                }
            });
            let desc = parse_direct_effect(&special, input, ctx);
            assert_eq!(desc.lang_id, "specials.v2.directeffect.damage.all.enemies");
            assert_eq!(desc.params["HEALTH"], json!(100));
            assert_eq!(desc.text["en"], "Deals 100% damage to all enemies.");
        });
    }

    #[test]
    fn add_mana_uses_sign_suffix_and_centi_units() {
        with_input(|input, ctx| {
            let special = json!({
                "maxLevel": 1,
                "directEffect": {
                    "effectType": "AddMana",
                    "typeOfTarget": "All",
                    "sideAffected": "Allies",
                    "powerMultiplierPerMil": 2400
                }
            });
            let desc = parse_direct_effect(&special, input, ctx);
            assert_eq!(
                desc.lang_id,
                "specials.v2.directeffect.addmana.all.allies.increment"
            );
            assert_eq!(desc.params["MANA"], json!(24));
        });
    }

    #[test]
    fn negative_power_renders_absolute_decrement() {
        with_input(|input, ctx| {
            let special = json!({
                "maxLevel": 1,
                "directEffect": {
                    "effectType": "AddMana",
                    "typeOfTarget": "All",
                    "sideAffected": "Enemies",
                    "powerMultiplierPerMil": -2400
                }
            });
            let desc = parse_direct_effect(&special, input, ctx);
            assert!(desc.lang_id.ends_with(".decrement"));
            assert_eq!(desc.params["MANA"], json!(24));
        });
    }

    #[test]
    fn missing_effect_type_yields_empty_record() {
        with_input(|input, ctx| {
            let desc = parse_direct_effect(&json!({}), input, ctx);
            assert_eq!(desc.id, "direct_effect_no_type");
            assert_eq!(desc.lang_id, "N/A");
        });
    }
}
