//! Output writers for a finished run: the full JSON record per hero, a
//! readable per-hero summary CSV, and a per-description debug CSV.

use std::fmt;
use std::fs::{self, File};
use std::path::Path;

use serde_json::{Map, Value};

/// Section order for the flattened summary text.
const SECTION_ORDER: [&str; 6] = [
    "directEffect",
    "clear_buffs",
    "properties",
    "statusEffects",
    "familiars",
    "passiveSkills",
];

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "output I/O error: {err}"),
            ExportError::Csv(err) => write!(f, "CSV write error: {err}"),
            ExportError::Json(err) => write!(f, "JSON write error: {err}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Json(err)
    }
}

/// Write the full processed hero map as pretty JSON.
pub fn write_output_json(path: &Path, heroes: &[(String, Value)]) -> Result<(), ExportError> {
    let map: Map<String, Value> = heroes
        .iter()
        .map(|(hero_id, hero)| (hero_id.clone(), hero.clone()))
        .collect();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&Value::Object(map))?)?;
    Ok(())
}

/// One row per hero: the concatenated description text per language.
pub fn write_skills_csv(path: &Path, heroes: &[(String, Value)]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    writer.write_record(["hero_id", "name", "description_en", "description_ja"])?;
    for (hero_id, hero) in heroes {
        let name = hero.get("name").and_then(Value::as_str).unwrap_or("N/A");
        writer.write_record([
            hero_id.as_str(),
            name,
            &summary_text(hero, "en"),
            &summary_text(hero, "ja"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per description, nested records included, with their depth.
pub fn write_debug_csv(path: &Path, heroes: &[(String, Value)]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    writer.write_record([
        "hero_id", "section", "depth", "id", "lang_id", "text_en", "text_ja", "params",
    ])?;
    for (hero_id, hero) in heroes {
        let Some(sections) = hero.get("skillDescriptions").and_then(Value::as_object) else {
            continue;
        };
        for section in SECTION_ORDER {
            let Some(descs) = sections.get(section).and_then(Value::as_array) else {
                continue;
            };
            for desc in descs {
                write_debug_rows(&mut writer, hero_id, section, desc, 0)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_debug_rows(
    writer: &mut csv::Writer<File>,
    hero_id: &str,
    section: &str,
    desc: &Value,
    depth: usize,
) -> Result<(), ExportError> {
    let text = |lang: &str| -> String {
        desc.get("text")
            .and_then(|t| t.get(lang))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };
    let params = desc
        .get("params")
        .map(|p| p.to_string())
        .unwrap_or_else(|| "{}".to_string());
    writer.write_record([
        hero_id,
        section,
        &depth.to_string(),
        desc.get("id").and_then(Value::as_str).unwrap_or(""),
        desc.get("lang_id").and_then(Value::as_str).unwrap_or(""),
        &text("en"),
        &text("ja"),
        &params,
    ])?;
    if let Some(extra) = desc.get("extra") {
        write_debug_rows(writer, hero_id, section, extra, depth + 1)?;
    }
    if let Some(nested) = desc.get("nested_effects").and_then(Value::as_array) {
        for child in nested {
            write_debug_rows(writer, hero_id, section, child, depth + 1)?;
        }
    }
    Ok(())
}

/// Flatten a hero's description tree into one text block for `lang`:
/// sections in fixed order, titles before bodies, nested lines after their
/// parent.
pub fn summary_text(hero: &Value, lang: &str) -> String {
    let Some(sections) = hero.get("skillDescriptions").and_then(Value::as_object) else {
        return String::new();
    };
    let mut lines = Vec::new();
    for section in SECTION_ORDER {
        if let Some(descs) = sections.get(section).and_then(Value::as_array) {
            for desc in descs {
                collect_lines(desc, lang, &mut lines);
            }
        }
    }
    lines.join("\n")
}

fn collect_lines(desc: &Value, lang: &str, lines: &mut Vec<String>) {
    if let Some(title) = desc
        .get("title")
        .and_then(|t| t.get(lang))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
    {
        lines.push(title.to_string());
    }
    if let Some(text) = desc
        .get("text")
        .and_then(|t| t.get(lang))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
    {
        lines.push(text.to_string());
    }
    if let Some(extra) = desc.get("extra") {
        collect_lines(extra, lang, lines);
    }
    if let Some(nested) = desc.get("nested_effects").and_then(Value::as_array) {
        for child in nested {
            collect_lines(child, lang, lines);
        }
    }
}
