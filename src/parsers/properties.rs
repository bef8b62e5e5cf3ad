//! Special properties. Most resolve through the keyword matcher; heroes
//! with charged or rotating mana speeds instead carry a container property
//! whose `specialIds` hold full sub-specials, each rendered under its own
//! heading.

use serde_json::{Map, Value};

use crate::engine::context::ParseContext;
use crate::engine::describe::placeholders_in;
use crate::engine::matcher::find_best_lang_id;
use crate::engine::value::find_and_calculate_value;
use crate::parsers::direct_effect::parse_direct_effect;
use crate::parsers::status_effects::parse_status_effects;
use crate::parsers::{
    find_extra_description, search_context, Description, ParseInput,
};

/// Mana speeds whose specials are wrapped in a container property, with the
/// property type that marks the container.
const CONTAINER_TYPES: [(&str, &str); 3] = [
    ("changing_tides", "RotatingSpecial"),
    ("charge_ninja", "ChargedSpecial"),
    ("charge_magic", "ChargedSpecial"),
];

const CONTAINER_LANG_IDS: [(&str, &str); 3] = [
    ("changing_tides", "specials.v2.property.evolving_special"),
    ("charge_ninja", "specials.v2.property.chargedspecial.3"),
    ("charge_magic", "specials.v2.property.chargedspecial.2"),
];

fn container_headings(mana_speed: &str) -> (&'static [&'static str], &'static [&'static str]) {
    match mana_speed {
        "changing_tides" => (&["1st:", "2nd:"], &["第1:", "第2:"]),
        "charge_ninja" => (
            &["x1 Mana Charge:", "x2 Mana Charge:", "x3 Mana Charge:"],
            &["x1マナチャージ:", "x2マナチャージ:", "x3マナチャージ:"],
        ),
        "charge_magic" => (
            &["x1 Mana Charge:", "x2 Mana Charge:"],
            &["x1マナチャージ:", "x2マナチャージ:"],
        ),
        _ => (&[], &[]),
    }
}

pub fn parse_properties(
    properties: &[Value],
    special: &Value,
    input: &ParseInput,
    ctx: &mut ParseContext,
) -> Vec<Description> {
    if properties.is_empty() {
        return Vec::new();
    }
    if let Some(max_level) = special.get("maxLevel").and_then(Value::as_i64) {
        ctx.main_max_level = max_level;
    }
    let max_level = ctx.main_max_level;

    let mut parsed = Vec::new();
    for prop in properties {
        let Some(block) = prop.as_object() else { continue };
        let prop_id = block
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let property_type = block
            .get("propertyType")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        if is_container(ctx.hero_mana_speed.as_deref(), &property_type) {
            parsed.push(parse_container(&prop_id, block, input, ctx));
            continue;
        }

        let lang_id = match input.rules.lang_override(input.hero_id, &prop_id) {
            Some(id) => Some(id.to_string()),
            None => {
                let (found, warning) =
                    find_best_lang_id(block, &ctx.prop_lang_subset, special.as_object());
                if let Some(warning) = warning {
                    ctx.warn(format!("[parse_properties]: {warning}"));
                }
                found
            }
        };
        let Some(lang_id) = lang_id else {
            parsed.push(input.failure(
                &prop_id,
                format!("FAIL_LANG_ID: type='{property_type}', id='{prop_id}'"),
            ));
            continue;
        };

        let context = search_context(block, max_level);
        let is_modifier = property_type.to_lowercase().contains("modifier");
        let mut params = Map::new();
        for name in placeholders_in(input.lang.primary_text(&lang_id)) {
            if let Some((value, _)) = find_and_calculate_value(
                &name,
                &context,
                max_level,
                input.hero_id,
                input.rules,
                is_modifier,
                &[],
            ) {
                params.insert(name, value);
            }
        }
        let text = input.render(&lang_id, &params, ctx);

        let mut nested = Vec::new();
        if let Some(effects) = block.get("statusEffects").and_then(Value::as_array) {
            nested.extend(parse_status_effects(
                effects,
                special,
                input,
                ctx,
                crate::engine::context::STATUS_EFFECT_LANG_PREFIX,
            ));
        }

        let type_lower = property_type.to_lowercase();
        let extra = if input.master.has_extra_description(&type_lower) {
            find_extra_description(
                &["specialproperty", "property"],
                &type_lower,
                &context,
                &params,
                input,
                ctx,
            )
        } else {
            None
        };

        parsed.push(Description {
            id: prop_id,
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

fn is_container(mana_speed: Option<&str>, property_type: &str) -> bool {
    let Some(mana_speed) = mana_speed else { return false };
    CONTAINER_TYPES
        .iter()
        .any(|(speed, kind)| *speed == mana_speed && *kind == property_type)
}

/// A container property renders its own template plus one heading and one
/// parsed body per sub-special.
fn parse_container(
    prop_id: &str,
    block: &Map<String, Value>,
    input: &ParseInput,
    ctx: &mut ParseContext,
) -> Description {
    let mana_speed = ctx.hero_mana_speed.clone().unwrap_or_default();
    let lang_id = CONTAINER_LANG_IDS
        .iter()
        .find(|(speed, _)| *speed == mana_speed)
        .map(|(_, id)| id.to_string())
        .unwrap_or_default();
    let text = input.render(&lang_id, &Map::new(), ctx);
    let (headings_en, headings_ja) = container_headings(&mana_speed);

    let mut nested = Vec::new();
    let sub_specials = block
        .get("specialIds")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    for (index, sub_special) in sub_specials.iter().enumerate() {
        let Some(sub_block) = sub_special.as_object() else { continue };
        if sub_block.is_empty() {
            continue;
        }
        nested.push(heading(index, headings_en, headings_ja));
        if sub_block.contains_key("directEffect") {
            nested.push(parse_direct_effect(sub_special, input, ctx));
        }
        if let Some(props) = sub_block.get("properties").and_then(Value::as_array) {
            nested.extend(parse_properties(props, sub_special, input, ctx));
        }
        if let Some(effects) = sub_block.get("statusEffects").and_then(Value::as_array) {
            nested.extend(parse_status_effects(
                effects,
                sub_special,
                input,
                ctx,
                crate::engine::context::STATUS_EFFECT_LANG_PREFIX,
            ));
        }
    }

    Description {
        id: prop_id.to_string(),
        lang_id,
        text,
        nested_effects: nested,
        ..Description::default()
    }
}

fn heading(index: usize, en: &[&str], ja: &[&str]) -> Description {
    let mut text = std::collections::BTreeMap::new();
    text.insert(
        "en".to_string(),
        en.get(index)
            .map(|h| h.to_string())
            .unwrap_or_else(|| format!("Level {}:", index + 1)),
    );
    text.insert(
        "ja".to_string(),
        ja.get(index)
            .map(|h| h.to_string())
            .unwrap_or_else(|| format!("レベル {}:", index + 1)),
    );
    Description {
        id: "heading".to_string(),
        lang_id: "N/A".to_string(),
        text,
        ..Description::default()
    }
}
