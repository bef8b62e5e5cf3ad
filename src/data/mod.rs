//! Thin loaders for the pre-built in-memory tables the engine consumes:
//! language templates, master records, override rules, and hero stats.

use std::fmt;

pub mod hero_stats;
pub mod language;
pub mod master;
pub mod rules;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug)]
pub enum DataError {
    Read(std::io::Error),
    Parse(serde_json::Error),
    Csv(csv::Error),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read data file: {err}"),
            Self::Parse(err) => write!(f, "failed to parse JSON: {err}"),
            Self::Csv(err) => write!(f, "failed to parse CSV: {err}"),
        }
    }
}

impl std::error::Error for DataError {}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        Self::Read(err)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}
