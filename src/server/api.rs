//! Payload builders for the query service. The generated output file is
//! read per request so a re-run of the generator is picked up without a
//! server restart; a missing file behaves as an empty hero set.

use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::data::language::{load_language_table, LanguageTable};
use crate::data::DataError;

pub const DEFAULT_OUTPUT_JSON_PATH: &str = "output/hero_data.json";
pub const DEFAULT_LANGUAGES_PATH: &str = "data/languages.json";

#[derive(Debug)]
pub enum ApiError {
    Data(DataError),
    Json(serde_json::Error),
    MissingParameter(&'static str),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Data(err) => write!(f, "{err}"),
            ApiError::Json(err) => write!(f, "{err}"),
            ApiError::MissingParameter(name) => {
                write!(f, "missing required query parameter '{name}'")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        ApiError::Data(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Json(err)
    }
}

fn load_hero_output() -> Result<Map<String, Value>, ApiError> {
    let path = Path::new(DEFAULT_OUTPUT_JSON_PATH);
    if !path.exists() {
        return Ok(Map::new());
    }
    let raw = fs::read_to_string(path).map_err(DataError::from)?;
    Ok(serde_json::from_str(&raw)?)
}

fn load_languages() -> Result<LanguageTable, ApiError> {
    Ok(load_language_table(Path::new(DEFAULT_LANGUAGES_PATH))?)
}

pub fn root_payload() -> Result<String, ApiError> {
    Ok(json!({ "message": "grimoire hero description service" }).to_string())
}

pub fn health_payload() -> Result<String, ApiError> {
    Ok(json!({
        "status": "ok",
        "service": "grimoire-api",
        "version": env!("CARGO_PKG_VERSION")
    })
    .to_string())
}

pub fn heroes_payload() -> Result<String, ApiError> {
    let heroes = load_hero_output()?;
    let mut ids: Vec<&String> = heroes.keys().collect();
    ids.sort();
    Ok(json!({ "hero_ids": ids }).to_string())
}

pub fn hero_payload(hero_id: &str) -> Result<Option<String>, ApiError> {
    let heroes = load_hero_output()?;
    Ok(heroes
        .get(hero_id)
        .map(|data| json!({ "hero_id": hero_id, "data": data }).to_string()))
}

/// `GET /api/query?key=...&keyword=...`: every object block under any
/// hero's resolved special data where `block[key]` is a string containing
/// `keyword` (case-insensitive).
pub fn query_payload(path: &str) -> Result<Option<String>, ApiError> {
    let key = query_param(path, "key").ok_or(ApiError::MissingParameter("key"))?;
    let keyword = query_param(path, "keyword").ok_or(ApiError::MissingParameter("keyword"))?;

    let heroes = load_hero_output()?;
    let mut results = Vec::new();
    for (hero_id, hero) in &heroes {
        if let Some(special) = hero.get("specialId_details") {
            let mut blocks = Vec::new();
            find_nested_blocks(special, &key, &keyword, &mut blocks);
            for block in blocks {
                results.push(json!({ "hero_id": hero_id, "property_block": block }));
            }
        }
    }
    if results.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        json!({
            "query": { "key": key, "keyword": keyword },
            "count": results.len(),
            "results": results
        })
        .to_string(),
    ))
}

pub fn language_payload(lang_id: &str) -> Result<Option<String>, ApiError> {
    let table = load_languages()?;
    Ok(table
        .entry(lang_id)
        .map(|texts| json!({ "lang_id": lang_id, "texts": texts }).to_string()))
}

pub fn find_nested_blocks<'a>(
    node: &'a Value,
    key: &str,
    keyword: &str,
    results: &mut Vec<&'a Value>,
) {
    match node {
        Value::Object(map) => {
            if map
                .get(key)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&keyword.to_lowercase()))
            {
                results.push(node);
            }
            for child in map.values() {
                find_nested_blocks(child, key, keyword, results);
            }
        }
        Value::Array(items) => {
            for item in items {
                find_nested_blocks(item, key, keyword, results);
            }
        }
        _ => {}
    }
}

fn query_param(path: &str, name: &str) -> Option<String> {
    let query = path.split('?').nth(1)?;
    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        if parts.next() == Some(name) {
            let value = parts.next().unwrap_or("");
            if !value.is_empty() {
                return Some(value.replace("%20", " ").replace('+', " "));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{find_nested_blocks, query_param};
    use serde_json::json;

    #[test]
    fn nested_block_search_matches_case_insensitively() {
        let special = json!({
            "properties": [
                { "propertyType": "AttackBoost" },
                { "propertyType": "Frost", "statusEffects": [
                    { "statusEffect": "FrostBite" }
                ]}
            ]
        });
        let mut results = Vec::new();
        find_nested_blocks(&special, "propertyType", "frost", &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["propertyType"], json!("Frost"));

        let mut nested = Vec::new();
        find_nested_blocks(&special, "statusEffect", "bite", &mut nested);
        assert_eq!(nested.len(), 1);
    }

    #[test]
    fn query_params_are_extracted_and_decoded() {
        let path = "/api/query?key=propertyType&keyword=chain+strike";
        assert_eq!(query_param(path, "key").as_deref(), Some("propertyType"));
        assert_eq!(query_param(path, "keyword").as_deref(), Some("chain strike"));
        assert_eq!(query_param(path, "missing"), None);
    }
}
