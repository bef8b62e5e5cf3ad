//! Buff/debuff removal declared at the top level of a special. The
//! template id is constructed outright; the affected side is inferred from
//! the buff name first, then from the explicit side fields in priority
//! order.

use serde_json::Value;

use crate::engine::context::ParseContext;
use crate::parsers::{Description, ParseInput};

pub fn parse_clear_buffs(
    special: &Value,
    input: &ParseInput,
    ctx: &mut ParseContext,
) -> Option<Description> {
    let buff = special
        .get("buffToRemove")
        .and_then(Value::as_str)?
        .to_lowercase();
    let target_type = special
        .get("buffToRemoveTargetType")
        .and_then(Value::as_str)
        .unwrap_or("all")
        .to_lowercase();

    // Dispelling a debuff helps your own side; dispelling a buff hits the
    // other one. Explicit side fields only apply when the name is neutral.
    let side = infer_side(special, &buff);

    let mut lang_id = format!("specials.v2.clearbuffs.{buff}.{target_type}.{side}");
    if !input.lang.contains(&lang_id) {
        let latest = format!("{lang_id}.latest");
        if input.lang.contains(&latest) {
            lang_id = latest;
        } else {
            let warning = format!("[parse_clear_buffs]: lang_id '{lang_id}' not found");
            ctx.warn(warning.clone());
            return Some(input.failure("clear_buffs_effect", warning));
        }
    }

    let text = input.render(&lang_id, &Default::default(), ctx);
    Some(Description {
        id: "clear_buffs_effect".to_string(),
        lang_id,
        text,
        ..Description::default()
    })
}

fn infer_side(special: &Value, buff: &str) -> String {
    if buff.contains("debuff") {
        return "allies".to_string();
    }
    if buff.contains("buff") {
        return "enemies".to_string();
    }
    for side in [
        special.get("buffToRemoveSideAffected"),
        special.get("sideAffected"),
        special.get("directEffect").and_then(|d| d.get("sideAffected")),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    {
        if !side.is_empty() {
            return side.to_lowercase();
        }
    }
    "enemies".to_string()
}

#[cfg(test)]
mod tests {
    use super::parse_clear_buffs;
    use crate::data::hero_stats::HeroStats;
    use crate::data::language::LanguageTable;
    use crate::data::master::MasterTable;
    use crate::data::rules::RuleSet;
    use crate::engine::context::ParseContext;
    use crate::parsers::{ParseInput, SEARCH_FAILED};
    use serde_json::json;
    use std::collections::HashMap;

    fn lang_table() -> LanguageTable {
        let mut entries = HashMap::new();
        for key in [
            "specials.v2.clearbuffs.alldebuffs.all.allies",
            "specials.v2.clearbuffs.allbuffs.all.enemies.latest",
        ] {
            let mut texts = HashMap::new();
            texts.insert("en".to_string(), "Removes effects.".to_string());
            texts.insert("ja".to_string(), "効果を解除。".to_string());
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
    fn debuff_name_implies_allies() {
        with_input(|input, ctx| {
            let special = json!({ "buffToRemove": "AllDebuffs", "buffToRemoveTargetType": "All" });
            let desc = parse_clear_buffs(&special, input, ctx).expect("clear buffs present");
            assert_eq!(desc.lang_id, "specials.v2.clearbuffs.alldebuffs.all.allies");
        });
    }

    #[test]
    fn falls_back_to_latest_suffix() {
        with_input(|input, ctx| {
            let special = json!({ "buffToRemove": "AllBuffs", "buffToRemoveTargetType": "All" });
            let desc = parse_clear_buffs(&special, input, ctx).expect("clear buffs present");
            assert_eq!(
                desc.lang_id,
                "specials.v2.clearbuffs.allbuffs.all.enemies.latest"
            );
        });
    }

    #[test]
    fn absent_field_yields_none() {
        with_input(|input, ctx| {
            assert!(parse_clear_buffs(&json!({}), input, ctx).is_none());
        });
    }

    #[test]
    fn unknown_template_yields_failure_record_and_warning() {
        with_input(|input, ctx| {
            let special = json!({ "buffToRemove": "Stacks", "buffToRemoveTargetType": "Single" });
            let desc = parse_clear_buffs(&special, input, ctx).expect("failure record expected");
            assert_eq!(desc.lang_id, SEARCH_FAILED);
            assert_eq!(ctx.unique_warning_count(), 1);
        });
    }
}
