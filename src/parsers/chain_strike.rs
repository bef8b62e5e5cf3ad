//! Chain-strike properties. These never go through the keyword matcher for
//! the chain hit: the template id is assembled from the property's modifier
//! fields, most specific form first.

use serde_json::{Map, Value};

use crate::engine::context::ParseContext;
use crate::engine::describe::placeholders_in;
use crate::engine::matcher::find_best_lang_id;
use crate::parsers::{find_extra_description, search_context, Description, ParseInput};

pub fn parse_chain_strike(
    prop: &Value,
    special: &Value,
    input: &ParseInput,
    ctx: &mut ParseContext,
) -> Vec<Description> {
    let Some(block) = prop.as_object() else { return Vec::new() };
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
    let max_level = special
        .get("maxLevel")
        .and_then(Value::as_i64)
        .unwrap_or(ctx.main_max_level);
    let context = search_context(block, max_level);

    let mut parsed = Vec::new();
    if block.contains_key("powerMultiplierPerMil") {
        parsed.push(parse_initial_hit(block, &prop_id, max_level, input, ctx));
    }
    parsed.push(parse_chain_hit(
        block,
        &prop_id,
        &property_type,
        &context,
        max_level,
        input,
        ctx,
    ));
    parsed
}

/// The optional opening hit reuses the generic property templates, matched
/// on the chain's effect type alone.
fn parse_initial_hit(
    block: &Map<String, Value>,
    prop_id: &str,
    max_level: i64,
    input: &ParseInput,
    ctx: &mut ParseContext,
) -> Description {
    let effect_type = block
        .get("chainEffectType")
        .and_then(Value::as_str)
        .unwrap_or("Damage");
    let mut probe = Map::new();
    probe.insert("propertyType".to_string(), Value::from(effect_type));
    let (lang_id, warning) = find_best_lang_id(&probe, &ctx.prop_lang_subset, None);
    if let Some(warning) = warning {
        ctx.warn(format!(
            "[parse_chain_strike]: Initial hit warning for '{prop_id}': {warning}"
        ));
    }
    let Some(lang_id) = lang_id else {
        ctx.warn(format!(
            "[parse_chain_strike]: Could not determine initial hit lang_id for {prop_id}"
        ));
        return input.failure(
            format!("{prop_id}_initial"),
            format!("FAIL_LANG_ID: ChainStrike Initial Hit '{prop_id}'"),
        );
    };

    let base = number_field(block, "powerMultiplierPerMil");
    let increment = number_field(block, "powerMultiplierIncrementPerLevelPerMil");
    let mut params = Map::new();
    params.insert(
        "HEALTH".to_string(),
        Value::from((base + increment * (max_level - 1).max(0) as f64) / 10.0),
    );
    let text = input.render(&lang_id, &params, ctx);
    Description {
        id: format!("{prop_id}_initial"),
        lang_id,
        params,
        text,
        ..Description::default()
    }
}

fn parse_chain_hit(
    block: &Map<String, Value>,
    prop_id: &str,
    property_type: &str,
    context: &Value,
    max_level: i64,
    input: &ParseInput,
    ctx: &mut ParseContext,
) -> Description {
    let base_name = property_type.to_lowercase();
    let mut modifiers = Vec::new();
    if block.get("maxExtraHits").and_then(Value::as_i64) == Some(1) {
        modifiers.push("onehit".to_string());
    }
    if block.contains_key("extraHitChancePerMil") {
        modifiers.push("with_chance".to_string());
    }
    if let Some(element) = block.get("strongAttackElement").and_then(Value::as_str) {
        modifiers.push(format!("strong_against_{}", element.to_lowercase()));
    }
    if block
        .get("allowMainTargetInRandomTargets")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        modifiers.push("allowmaintargetinrandomtargets".to_string());
    }

    let mut lang_id = None;
    if !modifiers.is_empty() {
        let specific = format!("specials.v2.property.{base_name}.{}", modifiers.join("."));
        if input.lang.contains(&specific) {
            lang_id = Some(specific);
        }
    }
    if lang_id.is_none() {
        let simple = format!("specials.v2.property.{base_name}");
        if input.lang.contains(&simple) {
            lang_id = Some(simple);
        }
    }
    let Some(lang_id) = lang_id else {
        ctx.warn(format!(
            "[parse_chain_strike]: Could not construct or find any lang_id for property '{prop_id}'"
        ));
        return input.failure(
            format!("{prop_id}_chain"),
            format!("FAIL_LANG_ID: ChainStrike Chain Hit '{prop_id}'"),
        );
    };

    let levels = (max_level - 1).max(0) as f64;
    let mut params = Map::new();
    for name in placeholders_in(input.lang.primary_text(&lang_id)) {
        let value = match name.as_str() {
            "CHANCE" => number_field(block, "extraHitChancePerMil") / 10.0,
            "DAMAGE" => {
                (number_field(block, "additionalHitDamagePerMil")
                    + number_field(block, "additionalHitDamageIncrementPerLevelPerMil") * levels)
                    / 10.0
            }
            _ => 0.0,
        };
        params.insert(name, Value::from(value));
    }
    let text = input.render(&lang_id, &params, ctx);
    let extra = find_extra_description(
        &["specialproperty", "property"],
        &base_name,
        context,
        &params,
        input,
        ctx,
    );
    Description {
        id: format!("{prop_id}_chain"),
        lang_id,
        params,
        text,
        extra: extra.map(Box::new),
        ..Description::default()
    }
}

fn number_field(map: &Map<String, Value>, key: &str) -> f64 {
    map.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}
