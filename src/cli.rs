use std::env;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::data::hero_stats::load_hero_stats;
use crate::data::language::load_language_table;
use crate::data::master::{load_entity_map, load_master_table};
use crate::data::rules::load_rules;
use crate::data::{DEFAULT_DATA_DIR, DEFAULT_OUTPUT_DIR};
use crate::export::{write_debug_csv, write_output_json, write_skills_csv};
use crate::pipeline::{self, unresolved_placeholders};
use crate::server::{self, api};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Generate,
    Serve,
    Extract,
    Report,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("generate") => Some(Command::Generate),
        Some("serve") => Some(Command::Serve),
        Some("extract") => Some(Command::Extract),
        Some("report") => Some(Command::Report),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Generate) => handle_generate(args),
        Some(Command::Serve) => handle_serve(),
        Some(Command::Extract) => handle_extract(args),
        Some(Command::Report) => handle_report(),
        None => {
            eprintln!("usage: grimoire <generate|serve|extract|report>");
            2
        }
    }
}

fn handle_generate(args: &[String]) -> i32 {
    let data_dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let out_dir = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let lang = match load_language_table(&data_dir.join("languages.json")) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("failed to load language table: {err}");
            return 1;
        }
    };
    let master = match load_master_table(&data_dir.join("master.json"), &lang) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("failed to load master table: {err}");
            return 1;
        }
    };
    let heroes = match load_entity_map(&data_dir.join("heroes.json")) {
        Ok(map) => map,
        Err(err) => {
            eprintln!("failed to load hero entities: {err}");
            return 1;
        }
    };
    let rules = match load_rules(&data_dir) {
        Ok(rules) => rules,
        Err(err) => {
            eprintln!("failed to load rules: {err}");
            return 1;
        }
    };
    let stats = match load_hero_stats(&data_dir.join("hero_stats.csv")) {
        Ok(stats) => stats,
        Err(err) => {
            eprintln!("failed to load hero stats: {err}");
            return 1;
        }
    };

    println!(
        "loaded {} heroes, {} master records, {} language keys, {} stat rows",
        heroes.len(),
        master.records.len(),
        lang.len(),
        stats.len()
    );

    let (_, report) = pipeline::run(&heroes, &lang, &master, &rules, &stats);

    let outputs = [
        write_output_json(&out_dir.join("hero_data.json"), &report.heroes),
        write_skills_csv(&out_dir.join("hero_skills.csv"), &report.heroes),
        write_debug_csv(&out_dir.join("hero_skills_debug.csv"), &report.heroes),
    ];
    for result in outputs {
        if let Err(err) = result {
            eprintln!("{err}");
            return 1;
        }
    }

    println!("described {} heroes -> {}", report.heroes.len(), out_dir.display());
    if report.total_warnings > 0 {
        println!(
            "{} lang_id search failures ({} unique):",
            report.total_warnings,
            report.warnings.len()
        );
        for warning in &report.warnings {
            eprintln!("  {warning}");
        }
    }
    let unresolved = unresolved_placeholders(&report.heroes);
    if !unresolved.is_empty() {
        println!("unresolved placeholders left in output:");
        for (name, count) in &unresolved {
            println!("  {{{name}}}: {count}");
        }
    }
    0
}

fn handle_serve() -> i32 {
    let bind_addr = env::var("GRIMOIRE_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    match server::run_server(&bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_extract(args: &[String]) -> i32 {
    let key = flag_value(args, "--key");
    let keyword = flag_value(args, "--keyword");
    let (Some(key), Some(keyword)) = (key, keyword) else {
        eprintln!("usage: grimoire extract --key <field> --keyword <text>");
        return 2;
    };

    let heroes = match load_generated_output() {
        Ok(map) => map,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let mut results = Vec::new();
    for (hero_id, hero) in &heroes {
        if let Some(special) = hero.get("specialId_details") {
            let mut blocks = Vec::new();
            api::find_nested_blocks(special, &key, &keyword, &mut blocks);
            for block in blocks {
                results.push(serde_json::json!({
                    "hero_id": hero_id,
                    "property_block": block
                }));
            }
        }
    }
    println!(
        "{}",
        serde_json::json!({
            "query": { "key": key, "keyword": keyword },
            "count": results.len(),
            "results": results
        })
    );
    0
}

fn handle_report() -> i32 {
    let heroes = match load_generated_output() {
        Ok(map) => map,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let listed: Vec<(String, Value)> =
        heroes.iter().map(|(id, hero)| (id.clone(), hero.clone())).collect();

    let mut failed = 0usize;
    for (_, hero) in &listed {
        failed += count_search_failures(hero.get("skillDescriptions").unwrap_or(&Value::Null));
    }
    println!("{} heroes in generated output", listed.len());
    println!("{failed} descriptions with failed template resolution");

    let unresolved = unresolved_placeholders(&listed);
    if unresolved.is_empty() {
        println!("no unresolved placeholders");
    } else {
        println!("unresolved placeholders:");
        for (name, count) in &unresolved {
            println!("  {{{name}}}: {count}");
        }
    }
    0
}

fn count_search_failures(node: &Value) -> usize {
    match node {
        Value::Object(map) => {
            let own = usize::from(
                map.get("lang_id").and_then(Value::as_str) == Some(crate::parsers::SEARCH_FAILED),
            );
            own + map.values().map(count_search_failures).sum::<usize>()
        }
        Value::Array(items) => items.iter().map(count_search_failures).sum(),
        _ => 0,
    }
}

fn load_generated_output() -> Result<Map<String, Value>, String> {
    let path = Path::new(api::DEFAULT_OUTPUT_JSON_PATH);
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read {} (run `grimoire generate` first): {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("malformed {}: {err}", path.display()))
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .cloned()
}
