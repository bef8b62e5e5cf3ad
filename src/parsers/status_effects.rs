//! Status effects applied by a special (or nested inside another effect).
//! Self-recursive through `statusEffectsToAdd` so chained effects keep the
//! same search prefix they were reached through.

use serde_json::{Map, Value};

use crate::engine::context::{ParseContext, STATUS_EFFECT_LANG_PREFIX};
use crate::engine::matcher::find_best_lang_id;
use crate::engine::value::find_and_calculate_value;
use crate::parsers::{
    find_extra_description, max_level_of, search_context, Description, ParseInput,
};

pub fn parse_status_effects(
    effects: &[Value],
    special: &Value,
    input: &ParseInput,
    ctx: &mut ParseContext,
    search_prefix: &str,
) -> Vec<Description> {
    if effects.is_empty() {
        return Vec::new();
    }
    let max_level = max_level_of(special, ctx);
    let subset = if search_prefix == STATUS_EFFECT_LANG_PREFIX {
        ctx.status_lang_subset.clone()
    } else {
        input.lang.keys_with_prefix(search_prefix)
    };

    let mut parsed = Vec::new();
    for effect in effects {
        let Some(block) = effect.as_object() else { continue };
        let Some(effect_id) = block.get("id").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        let status_type = block
            .get("statusEffect")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let lang_id = match input.rules.lang_override(input.hero_id, &effect_id) {
            Some(id) => Some(id.to_string()),
            None => {
                let (found, warning) =
                    find_best_lang_id(block, &subset, special.as_object());
                if let Some(warning) = warning {
                    ctx.warn(warning);
                }
                found
            }
        };
        let Some(lang_id) = lang_id else {
            parsed.push(input.failure(
                &effect_id,
                format!("FAIL_LANG_ID: type='{status_type}', id='{effect_id}'"),
            ));
            continue;
        };

        let context = search_context(block, max_level);
        let mut params = Map::new();
        let turns = block.get("turns").and_then(Value::as_i64).unwrap_or(0);
        if turns > 0 {
            params.insert("TURNS".to_string(), Value::from(turns));
        }

        let template_text = input.lang.primary_text(&lang_id).to_string();
        let is_modifier = status_type.to_lowercase().contains("modifier");
        for name in crate::engine::describe::placeholders_in(&template_text) {
            if params.contains_key(&name) {
                continue;
            }
            let Some((value, found_key)) = find_and_calculate_value(
                &name,
                &context,
                max_level,
                input.hero_id,
                input.rules,
                is_modifier,
                &[],
            ) else {
                continue;
            };
            if name.to_uppercase() == "DAMAGE" && found_key.to_lowercase().contains("permil") {
                let per_turn = damage_from_attack(&value, input.hero_stats.max_attack);
                // "over {TURNS} turns" marks a duration total rather than
                // per-turn damage.
                let total = if template_text.contains("over {TURNS} turns") {
                    per_turn * turns.max(1)
                } else {
                    per_turn
                };
                params.insert(name, Value::from(total));
            } else {
                params.insert(name, value);
            }
        }

        let text = input.render(&lang_id, &params, ctx);

        let mut nested = Vec::new();
        if let Some(children) = block.get("statusEffectsToAdd").and_then(Value::as_array) {
            nested.extend(parse_status_effects(children, special, input, ctx, search_prefix));
        }

        let extra = if input.master.has_extra_description(&status_type.to_lowercase()) {
            find_extra_description(
                &["statuseffect"],
                &status_type.to_lowercase(),
                &context,
                &params,
                input,
                ctx,
            )
        } else {
            None
        };

        parsed.push(Description {
            id: effect_id,
            lang_id,
            params,
            text,
            nested_effects: nested,
            extra: extra.map(Box::new),
            ..Description::default()
        });
    }
    parsed
}

/// Permil damage values describe a share of the hero's max attack.
pub(crate) fn damage_from_attack(value: &Value, max_attack: i64) -> i64 {
    let percent = value.as_f64().unwrap_or(0.0);
    ((percent / 100.0) * max_attack as f64).floor() as i64
}
