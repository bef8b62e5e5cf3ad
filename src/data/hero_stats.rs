//! Hero stat table from CSV: display name and max-level attack per hero,
//! with costume-bonus columns (CB4 down to CB1) preferred over the base
//! max-level column when present.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::data::DataError;

const BASE_ATTACK_COLUMN: &str = "Max level: Attack";
const NAME_COLUMN: &str = "Name";
const ID_COLUMN: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroStats {
    pub max_attack: i64,
    pub name: String,
}

impl Default for HeroStats {
    fn default() -> Self {
        HeroStats { max_attack: 0, name: "N/A".to_string() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeroStatsTable {
    rows: HashMap<String, HashMap<String, String>>,
}

impl HeroStatsTable {
    pub fn from_rows(rows: HashMap<String, HashMap<String, String>>) -> Self {
        HeroStatsTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Final stats for one hero. Unknown heroes resolve to the zero-attack
    /// placeholder rather than failing the run.
    pub fn final_stats(&self, hero_id: &str) -> HeroStats {
        let Some(row) = self.rows.get(hero_id) else {
            return HeroStats::default();
        };
        let mut attack_column = BASE_ATTACK_COLUMN.to_string();
        for costume in (1..=4).rev() {
            let column = format!("Max level CB{costume}: Attack");
            if row.get(&column).is_some_and(|cell| !cell.trim().is_empty()) {
                attack_column = column;
                break;
            }
        }
        let max_attack = row
            .get(&attack_column)
            .and_then(|cell| cell.trim().parse::<f64>().ok())
            .map(|value| value as i64)
            .unwrap_or(0);
        let name = row
            .get(NAME_COLUMN)
            .map(|cell| cell.trim().to_string())
            .filter(|cell| !cell.is_empty())
            .unwrap_or_else(|| "N/A".to_string());
        HeroStats { max_attack, name }
    }
}

pub fn load_hero_stats(path: &Path) -> Result<HeroStatsTable, DataError> {
    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = HashMap::new();
    for record in reader.records() {
        let record = record?;
        let mut row = HashMap::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            row.insert(header.clone(), cell.to_string());
        }
        if let Some(id) = row.get(ID_COLUMN).map(|cell| cell.trim().to_string()) {
            if !id.is_empty() {
                rows.insert(id, row);
            }
        }
    }
    Ok(HeroStatsTable::from_rows(rows))
}
