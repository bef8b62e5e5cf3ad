//! Passive skills from the hero card. Titles and bodies live under
//! separate key prefixes; the body id is derived from the chosen title id
//! where possible so the pair stays consistent.

use serde_json::{Map, Value};

use crate::engine::context::{
    ParseContext, PASSIVE_DESCRIPTION_PREFIX, PASSIVE_TITLE_PREFIX,
};
use crate::engine::describe::placeholders_in;
use crate::engine::matcher::collect_block_keywords;
use crate::engine::value::find_and_calculate_value;
use crate::parsers::status_effects::damage_from_attack;
use crate::parsers::{search_context, Description, ParseInput};

pub fn parse_passive_skills(
    skills: &[Value],
    input: &ParseInput,
    ctx: &mut ParseContext,
) -> Vec<Description> {
    if skills.is_empty() {
        return Vec::new();
    }
    let max_level = ctx.main_max_level;
    let title_subset = input.lang.keys_with_prefix(PASSIVE_TITLE_PREFIX);
    let desc_subset = input.lang.keys_with_prefix(PASSIVE_DESCRIPTION_PREFIX);

    let mut parsed = Vec::new();
    for skill in skills {
        let Some(block) = skill.as_object() else { continue };
        let Some(skill_id) = block.get("id").and_then(Value::as_str).map(str::to_string)
        else {
            continue;
        };
        let skill_type = block
            .get("passiveSkillType")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase();
        if skill_type.is_empty() {
            continue;
        }

        let title_lang_id = best_title(block, &skill_type, &title_subset);
        let desc_lang_id = title_lang_id
            .as_deref()
            .and_then(|title| matching_description(block, title, &skill_type, &desc_subset, input));

        let (Some(title_lang_id), Some(desc_lang_id)) = (title_lang_id, desc_lang_id) else {
            ctx.warn(format!(
                "Could not resolve passive lang_ids for skill '{skill_id}'"
            ));
            let mut failure = input.failure(&skill_id, "lang_id resolution failed.");
            failure.title = Some(
                input
                    .lang
                    .languages
                    .iter()
                    .map(|language| (language.clone(), format!("FAILED: {skill_id}")))
                    .collect(),
            );
            parsed.push(failure);
            continue;
        };

        let context = search_context(block, max_level);
        let mut params = Map::new();
        let combined = format!(
            "{}{}",
            input.lang.primary_text(&title_lang_id),
            input.lang.primary_text(&desc_lang_id)
        );
        for name in placeholders_in(&combined) {
            let Some((value, found_key)) = find_and_calculate_value(
                &name,
                &context,
                max_level,
                input.hero_id,
                input.rules,
                false,
                &[],
            ) else {
                continue;
            };
            if name.to_uppercase() == "DAMAGE" && found_key.to_lowercase().contains("permil") {
                params.insert(
                    name,
                    Value::from(damage_from_attack(&value, input.hero_stats.max_attack)),
                );
            } else {
                params.insert(name, value);
            }
        }

        let title = input.render(&title_lang_id, &params, ctx);
        let text = input.render(&desc_lang_id, &params, ctx);
        parsed.push(Description {
            id: skill_id,
            lang_id: desc_lang_id,
            params,
            text,
            title: Some(title),
            ..Description::default()
        });
    }
    parsed
}

/// Title candidates under the skill-type prefix, scored by how many of the
/// skill's keywords appear among the candidate's dot-parts.
fn best_title(
    block: &Map<String, Value>,
    skill_type: &str,
    title_subset: &[String],
) -> Option<String> {
    let prefix = format!("{PASSIVE_TITLE_PREFIX}{skill_type}");
    let candidates: Vec<&String> =
        title_subset.iter().filter(|key| key.starts_with(&prefix)).collect();
    if candidates.is_empty() {
        return None;
    }
    let keywords = collect_block_keywords(block, None);
    let mut scored: Vec<(usize, &String)> = candidates
        .into_iter()
        .map(|candidate| {
            let parts: Vec<&str> = candidate.split('.').collect();
            let score = keywords
                .keys()
                .filter(|kw| parts.contains(&kw.as_str()))
                .count();
            (score, candidate)
        })
        .collect();
    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.len().cmp(&b.1.len()))
            .then_with(|| a.1.cmp(b.1))
    });
    scored.first().map(|(_, key)| (*key).clone())
}

/// The body id for a chosen title: the direct `.title.` to `.description.`
/// substitution when that key exists, else the shortest keyword-refined
/// candidate, else the shortest candidate overall.
fn matching_description(
    block: &Map<String, Value>,
    title_lang_id: &str,
    skill_type: &str,
    desc_subset: &[String],
    input: &ParseInput,
) -> Option<String> {
    let ideal = title_lang_id.replacen(".title.", ".description.", 1);
    if input.lang.contains(&ideal) {
        return Some(ideal);
    }
    let prefix = format!("{PASSIVE_DESCRIPTION_PREFIX}{skill_type}");
    let candidates: Vec<&String> =
        desc_subset.iter().filter(|key| key.starts_with(&prefix)).collect();
    if candidates.is_empty() {
        return None;
    }
    let keywords = collect_block_keywords(block, None);
    let refined: Vec<&&String> = candidates
        .iter()
        .filter(|candidate| {
            let parts: Vec<&str> = candidate.split('.').collect();
            keywords.keys().any(|kw| parts.contains(&kw.as_str()))
        })
        .collect();
    let pool: Vec<&String> = if refined.is_empty() {
        candidates.clone()
    } else {
        refined.into_iter().copied().collect()
    };
    pool.into_iter()
        .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
        .cloned()
}
