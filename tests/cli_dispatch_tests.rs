use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_grimoire")
}

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("grimoire-{name}-{stamp}"))
}

fn write_fixture_data(dir: &Path) {
    let data = dir.join("data");
    fs::create_dir_all(&data).expect("data dir should be created");

    fs::write(
        data.join("languages.json"),
        r#"{
            "specials.v2.directeffect.damage.all.enemies": {
                "en": "Deals {HEALTH}% damage to all enemies.",
                "ja": "全ての敵に{HEALTH}%のダメージ。"
            },
            "specials.v2.statuseffect.major.burn.all.enemies": {
                "en": "Burns all enemies for {DAMAGE} damage over {TURNS} turns.",
                "ja": "{TURNS}ターンの間、{DAMAGE}の炎上ダメージ。"
            }
        }"#,
    )
    .expect("languages fixture should be written");

    fs::write(
        data.join("master.json"),
        r#"{
            "special.inferno": {
                "id": "special.inferno",
                "maxLevel": 8,
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
                "statusEffects": ["se.burn"]
            },
            "se.burn": {
                "id": "se.burn",
                "statusEffect": "Burn",
                "buff": "MajorDebuff",
                "turns": 3,
                "damagePerMil": 100
            }
        }"#,
    )
    .expect("master fixture should be written");

    fs::write(
        data.join("heroes.json"),
        r#"{ "hero.ember": { "specialId": "special.inferno" } }"#,
    )
    .expect("heroes fixture should be written");

    fs::write(
        data.join("hero_stats.csv"),
        "id,Name,Max level: Attack\nhero.ember,Ember,800\n",
    )
    .expect("stats fixture should be written");
}

#[test]
fn missing_command_returns_usage() {
    let output = Command::new(bin()).output().expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: grimoire"));
}

#[test]
fn generate_command_writes_described_hero_data() {
    let dir = unique_temp_dir("generate");
    write_fixture_data(&dir);

    let output = Command::new(bin())
        .current_dir(&dir)
        .args(["generate", "data", "output"])
        .output()
        .expect("generate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("described 1 heroes"));

    let raw = fs::read_to_string(dir.join("output/hero_data.json"))
        .expect("generated json should exist");
    let payload: serde_json::Value =
        serde_json::from_str(&raw).expect("generated output should be json");
    let hero = &payload["hero.ember"];
    assert_eq!(hero["name"], serde_json::json!("Ember"));
    assert_eq!(
        hero["skillDescriptions"]["directEffect"][0]["text"]["en"],
        serde_json::json!("Deals 100% damage to all enemies.")
    );
    assert!(dir.join("output/hero_skills.csv").exists());
    assert!(dir.join("output/hero_skills_debug.csv").exists());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn extract_command_returns_usage_without_query_flags() {
    let output = Command::new(bin())
        .arg("extract")
        .output()
        .expect("extract should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: grimoire extract"));
}

#[test]
fn extract_command_finds_blocks_in_generated_output() {
    let dir = unique_temp_dir("extract");
    write_fixture_data(&dir);

    let generate = Command::new(bin())
        .current_dir(&dir)
        .args(["generate", "data", "output"])
        .output()
        .expect("generate should run");
    assert_eq!(generate.status.code(), Some(0));

    let output = Command::new(bin())
        .current_dir(&dir)
        .args(["extract", "--key", "effectType", "--keyword", "damage"])
        .output()
        .expect("extract should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("extract should emit json");
    assert_eq!(payload["count"], serde_json::json!(1));
    assert_eq!(
        payload["results"][0]["hero_id"],
        serde_json::json!("hero.ember")
    );

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn report_command_fails_without_generated_output() {
    let dir = unique_temp_dir("report");
    fs::create_dir_all(&dir).expect("temp dir should be created");

    let output = Command::new(bin())
        .current_dir(&dir)
        .arg("report")
        .output()
        .expect("report should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("run `grimoire generate` first"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn report_command_summarizes_generated_output() {
    let dir = unique_temp_dir("report-ok");
    write_fixture_data(&dir);

    let generate = Command::new(bin())
        .current_dir(&dir)
        .args(["generate", "data", "output"])
        .output()
        .expect("generate should run");
    assert_eq!(generate.status.code(), Some(0));

    let output = Command::new(bin())
        .current_dir(&dir)
        .arg("report")
        .output()
        .expect("report should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 heroes in generated output"));
    assert!(stdout.contains("0 descriptions with failed template resolution"));
    assert!(stdout.contains("no unresolved placeholders"));

    let _ = fs::remove_dir_all(dir);
}
