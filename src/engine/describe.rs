//! Fills localized templates with formatted parameter values. Substitution
//! is literal `{NAME}` token replacement; the only extra transformation
//! offered is bullet/blank-line normalization for tooltip text.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::data::language::LanguageTable;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\*\]|\n\s*\n").expect("bullet pattern"))
}

/// Render the template behind `lang_id` for every configured language.
/// A missing template id yields `NO_TEMPLATE_FOR_<id>` instead of failing.
pub fn generate_description(
    lang_id: &str,
    params: &Map<String, Value>,
    table: &LanguageTable,
) -> BTreeMap<String, String> {
    let mut texts = BTreeMap::new();
    for language in &table.languages {
        let mut text = table
            .template(lang_id, language)
            .map(str::to_string)
            .unwrap_or_else(|| format!("NO_TEMPLATE_FOR_{lang_id}"));
        for (name, value) in params {
            text = text.replace(&format!("{{{name}}}"), &format_param(value));
        }
        texts.insert(language.clone(), text);
    }
    texts
}

/// Display formatting: integral floats drop the decimal point, other floats
/// render to one decimal place, everything else as-is.
pub fn format_param(value: &Value) -> String {
    match value {
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                int.to_string()
            } else if let Some(float) = n.as_f64() {
                if float.fract() == 0.0 {
                    format!("{}", float as i64)
                } else {
                    format!("{float:.1}")
                }
            } else {
                n.to_string()
            }
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Placeholder names referenced by `text`.
pub fn placeholders_in(text: &str) -> BTreeSet<String> {
    placeholder_re()
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Collapse literal `[*]` list markers and blank lines into single
/// bullet-prefixed line breaks.
pub fn normalize_bullets(text: &str) -> String {
    bullet_re().replace_all(text, "\n・").trim().to_string()
}
