// Ranking list ingestion.
//
// Reads uploaded/scraped ranking CSVs (FantasyPros-style column set, with
// aliases for the common variants). Ranking entries have no stable id, only
// a free-text name; the identity index reconciles them with the catalog.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// One row of a ranking list. `value` is clamped to `>= 0` at load time so
/// downstream valuation can sum without re-checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub position: String,
    pub team: String,
    pub overall_rank: u32,
    pub position_rank: u32,
    pub tier: u32,
    pub bye_week: Option<u8>,
    pub value: f64,
}

#[derive(Debug, Error)]
pub enum RankingsError {
    #[error("failed to read rankings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Raw CSV row. Numeric fields come in as f64 because scraped sheets carry
/// fractional ranks; extra columns are absorbed by the flatten map.
#[derive(Debug, Deserialize)]
#[allow(dead_code, non_snake_case)]
struct RawRankingRow {
    #[serde(alias = "Name", alias = "Player", alias = "player_name")]
    name: String,
    #[serde(alias = "Position", alias = "Pos", default)]
    position: String,
    #[serde(alias = "Team", alias = "Tm", default)]
    team: String,
    #[serde(alias = "Rank", alias = "RK", alias = "Overall Rank", alias = "overall_rank")]
    rank: f64,
    #[serde(
        alias = "Position Rank",
        alias = "Pos Rank",
        alias = "position_rank",
        default
    )]
    pos_rank: f64,
    #[serde(alias = "Tier", default)]
    tier: f64,
    #[serde(alias = "Bye", alias = "Bye Week", alias = "bye_week", default)]
    bye: Option<f64>,
    #[serde(alias = "Value", alias = "VBD", default)]
    value: f64,
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

/// Load ranking entries from any reader (enables testing without files).
/// Malformed rows are skipped with a warning rather than failing the load;
/// negative values are clamped to zero.
pub fn load_from_reader<R: Read>(rdr: R) -> Result<Vec<RankingEntry>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut entries = Vec::new();
    for result in reader.deserialize::<RawRankingRow>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim().to_string();
                if name.is_empty() {
                    warn!("skipping ranking row with empty name");
                    continue;
                }
                if !raw.rank.is_finite() {
                    warn!("skipping ranking row '{name}': non-finite rank");
                    continue;
                }
                let value = if raw.value.is_finite() { raw.value } else { 0.0 };
                if value < 0.0 {
                    warn!("clamping negative value {} for '{name}'", value);
                }
                entries.push(RankingEntry {
                    name,
                    position: raw.position.trim().to_uppercase(),
                    team: raw.team.trim().to_uppercase(),
                    overall_rank: raw.rank.round().max(0.0) as u32,
                    position_rank: raw.pos_rank.round().max(0.0) as u32,
                    tier: raw.tier.round().max(0.0) as u32,
                    bye_week: raw
                        .bye
                        .filter(|b| b.is_finite() && *b > 0.0)
                        .map(|b| b.round() as u8),
                    value: value.max(0.0),
                });
            }
            Err(e) => {
                warn!("skipping malformed ranking row: {e}");
            }
        }
    }
    Ok(entries)
}

/// Load ranking entries from a CSV file on disk.
pub fn load_from_path(path: &Path) -> Result<Vec<RankingEntry>, RankingsError> {
    let file = File::open(path).map_err(|e| RankingsError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_from_reader(file).map_err(|e| RankingsError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}
