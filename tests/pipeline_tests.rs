use std::collections::HashMap;

use serde_json::{json, Map, Value};

use grimoire::data::hero_stats::HeroStatsTable;
use grimoire::data::language::LanguageTable;
use grimoire::data::master::MasterTable;
use grimoire::data::rules::RuleSet;
use grimoire::export::summary_text;
use grimoire::pipeline::{describe_all, resolve_all};

fn lang_entries() -> HashMap<String, HashMap<String, String>> {
    let mut entries = HashMap::new();
    for (key, en, ja) in [
        (
            "specials.v2.directeffect.damage.all.enemies",
            "Deals {HEALTH}% damage to all enemies.",
            "全ての敵に{HEALTH}%のダメージ。",
        ),
        (
            "specials.v2.property.attackboost.allies",
            "Boosts attack by {VALUE}%.",
            "攻撃力が{VALUE}%上昇。",
        ),
        (
            "specials.v2.statuseffect.major.burn.all.enemies",
            "Burns all enemies for {DAMAGE} damage over {TURNS} turns.",
            "{TURNS}ターンの間、{DAMAGE}の炎上ダメージ。",
        ),
        (
            "specials.v2.clearbuffs.alldebuffs.all.allies",
            "Dispels debuffs from all allies.",
            "味方全体の弱体化効果を解除。",
        ),
        (
            "herocard.passive_skill.title.resist.burn",
            "Burn Resistance",
            "炎上耐性",
        ),
        (
            "herocard.passive_skill.description.resist.burn",
            "Has a {CHANCE}% chance to resist Burn effects.",
            "{CHANCE}%の確率で炎上を無効化。",
        ),
    ] {
        let mut texts = HashMap::new();
        texts.insert("en".to_string(), en.to_string());
        texts.insert("ja".to_string(), ja.to_string());
        entries.insert(key.to_string(), texts);
    }
    entries
}

fn lang_table() -> LanguageTable {
    LanguageTable::from_entries(lang_entries())
}

fn master_table() -> MasterTable {
    MasterTable {
        records: json!({
            "special.inferno": {
                "id": "special.inferno",
                "maxLevel": 8,
                "buffToRemove": "AllDebuffs",
                "buffToRemoveTargetType": "All",
                "directEffect": {
                    "id": "de.inferno",
                    "effectType": "Damage",
                    "typeOfTarget": "All",
                    "sideAffected": "Enemies",
                    "powerMultiplierPerMil": 930,
                    "powerMultiplierIncrementPerLevelPerMil": 10
                },
                "statusTargetType": "All",
                "sideAffected": "Enemies",
                "properties": ["prop.attackboost"],
                "statusEffects": ["se.burn"]
            },
            "prop.attackboost": {
                "id": "prop.attackboost",
                "propertyType": "AttackBoost",
                "sideAffected": "Allies",
                "valuePerMil": 300,
                "valueIncrementPerLevelPerMil": 20
            },
            "se.burn": {
                "id": "se.burn",
                "statusEffect": "Burn",
                "buff": "MajorDebuff",
                "turns": 3,
                "damagePerMil": 100
            },
            "passive.resist": {
                "id": "passive.resist",
                "passiveSkillType": "Resist",
                "resistedEffect": "Burn",
                "chancePerMil": 500
            }
        })
        .as_object()
        .unwrap()
        .clone(),
        ..MasterTable::default()
    }
}

fn stats_table() -> HeroStatsTable {
    let mut rows = HashMap::new();
    let mut row = HashMap::new();
    row.insert("Name".to_string(), "Ember".to_string());
    row.insert("Max level: Attack".to_string(), "800".to_string());
    rows.insert("hero.ember".to_string(), row);
    HeroStatsTable::from_rows(rows)
}

fn heroes() -> Map<String, Value> {
    json!({
        "hero.ember": {
            "specialId": "special.inferno",
            "passiveSkills": ["passive.resist"]
        }
    })
    .as_object()
    .unwrap()
    .clone()
}

#[test]
fn full_hero_pipeline_produces_every_section() {
    let lang = lang_table();
    let master = master_table();
    let resolved = resolve_all(&heroes(), &master);
    let report = describe_all(&resolved, &lang, &master, &RuleSet::default(), &stats_table());

    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    let (_, hero) = &report.heroes[0];
    let sections = hero["skillDescriptions"].as_object().unwrap();

    assert_eq!(
        sections["directEffect"][0]["text"]["en"],
        json!("Deals 100% damage to all enemies.")
    );
    assert_eq!(
        sections["clear_buffs"][0]["lang_id"],
        json!("specials.v2.clearbuffs.alldebuffs.all.allies")
    );
    assert_eq!(
        sections["properties"][0]["text"]["en"],
        json!("Boosts attack by 44%.")
    );
    assert_eq!(
        sections["statusEffects"][0]["text"]["en"],
        json!("Burns all enemies for 240 damage over 3 turns.")
    );
    assert_eq!(
        sections["passiveSkills"][0]["title"]["en"],
        json!("Burn Resistance")
    );
    assert_eq!(
        sections["passiveSkills"][0]["text"]["en"],
        json!("Has a 50% chance to resist Burn effects.")
    );
}

#[test]
fn summary_text_flattens_in_section_order() {
    let lang = lang_table();
    let master = master_table();
    let resolved = resolve_all(&heroes(), &master);
    let report = describe_all(&resolved, &lang, &master, &RuleSet::default(), &stats_table());

    let (_, hero) = &report.heroes[0];
    let summary = summary_text(hero, "en");
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "Deals 100% damage to all enemies.");
    assert_eq!(lines[1], "Dispels debuffs from all allies.");
    assert_eq!(lines[2], "Boosts attack by 44%.");
    assert!(lines.contains(&"Burn Resistance"));
}

#[test]
fn lang_override_bypasses_the_matcher() {
    // The pinned template carries none of the effect's keywords, so only
    // the override can reach it.
    let mut entries = lang_entries();
    let mut texts = HashMap::new();
    texts.insert("en".to_string(), "Scorches everything it touches.".to_string());
    texts.insert("ja".to_string(), "触れる全てを焦がす。".to_string());
    entries.insert("specials.v2.statuseffect.pinned.emberburn".to_string(), texts);
    let lang = LanguageTable::from_entries(entries);

    let master = master_table();
    let mut rules = RuleSet::default();
    rules.lang_overrides.insert(
        "hero.ember",
        "se.burn".to_string(),
        "specials.v2.statuseffect.pinned.emberburn".to_string(),
    );

    let resolved = resolve_all(&heroes(), &master);
    let report = describe_all(&resolved, &lang, &master, &rules, &stats_table());
    let (_, hero) = &report.heroes[0];
    let burn = &hero["skillDescriptions"]["statusEffects"][0];
    assert_eq!(burn["lang_id"], json!("specials.v2.statuseffect.pinned.emberburn"));
    assert_eq!(burn["text"]["en"], json!("Scorches everything it touches."));
}

#[test]
fn familiar_failure_leaves_siblings_intact() {
    let lang = lang_table();
    let mut master = master_table();
    if let Some(special) = master.records.get_mut("special.inferno") {
        special.as_object_mut().unwrap().insert(
            "summonedFamiliars".to_string(),
            json!([{ "id": "fam.ghost", "familiarType": "Spirit" }]),
        );
    }
    let resolved = resolve_all(&heroes(), &master);
    let report = describe_all(&resolved, &lang, &master, &RuleSet::default(), &stats_table());

    let (_, hero) = &report.heroes[0];
    let sections = hero["skillDescriptions"].as_object().unwrap();
    assert_eq!(sections["familiars"][0]["lang_id"], json!("SEARCH_FAILED"));
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("fam.ghost")));
    // Every other section still renders.
    assert_eq!(
        sections["directEffect"][0]["text"]["en"],
        json!("Deals 100% damage to all enemies.")
    );
    assert_eq!(
        sections["statusEffects"][0]["params"]["DAMAGE"],
        json!(240)
    );
}
