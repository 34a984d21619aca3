// Canonical player catalog and its disk cache.
//
// The Sleeper player dump is large (~5 MB) and changes rarely, so it is
// cached to a JSON file with a sidecar metadata file and refetched at most
// once per freshness window. A corrupt or stale cache degrades to a fresh
// fetch; it never fails the load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::sleeper::PlayerPayload;

/// Default cache freshness window. Player data only needs refetching daily.
pub const DEFAULT_MAX_AGE_HOURS: i64 = 24;

const CACHE_FILE: &str = "sleeper_players.json";
const METADATA_FILE: &str = "player_cache_metadata.json";
const CACHE_VERSION: &str = "1.0";

/// An immutable player record from the authoritative catalog. The `id` is
/// the only stable cross-reference key between data sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPlayer {
    pub id: String,
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: String,
    pub team: String,
}

impl CanonicalPlayer {
    /// Fallback record for an id the catalog cannot resolve. Players are
    /// never dropped silently; they surface as placeholders instead.
    pub fn placeholder(id: &str) -> Self {
        CanonicalPlayer {
            id: id.to_string(),
            full_name: format!("Player {id}"),
            first_name: None,
            last_name: None,
            position: "UNKNOWN".to_string(),
            team: "N/A".to_string(),
        }
    }
}

/// The full id-keyed player catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerCatalog {
    players: HashMap<String, CanonicalPlayer>,
}

impl PlayerCatalog {
    /// Convert the raw Sleeper player dump. Entries with no usable name
    /// (team defenses keyed by abbreviation sometimes lack one) fall back
    /// to first+last, then to the raw id.
    pub fn from_payloads(payloads: &HashMap<String, PlayerPayload>) -> Self {
        let mut players = HashMap::with_capacity(payloads.len());
        for (id, p) in payloads {
            let joined = match (&p.first_name, &p.last_name) {
                (Some(first), Some(last)) => format!("{first} {last}").trim().to_string(),
                (Some(first), None) => first.clone(),
                (None, Some(last)) => last.clone(),
                (None, None) => String::new(),
            };
            let full_name = p
                .full_name
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or(joined);
            let full_name = if full_name.is_empty() {
                id.clone()
            } else {
                full_name
            };

            players.insert(
                id.clone(),
                CanonicalPlayer {
                    id: id.clone(),
                    full_name,
                    first_name: p.first_name.clone(),
                    last_name: p.last_name.clone(),
                    position: p.position.clone().unwrap_or_else(|| "UNKNOWN".to_string()),
                    team: p.team.clone().unwrap_or_else(|| "N/A".to_string()),
                },
            );
        }
        PlayerCatalog { players }
    }

    pub fn get(&self, id: &str) -> Option<&CanonicalPlayer> {
        self.players.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalPlayer> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to access cache file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to encode catalog cache: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheMetadata {
    last_updated: i64,
    player_count: usize,
    version: String,
}

/// File-backed cache for the player catalog.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    cache_file: PathBuf,
    metadata_file: PathBuf,
}

impl CatalogCache {
    pub fn new(dir: &Path) -> Self {
        CatalogCache {
            cache_file: dir.join(CACHE_FILE),
            metadata_file: dir.join(METADATA_FILE),
        }
    }

    /// Platform data directory for the tracker, when one can be determined.
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "drafttrack")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Load the cached catalog if it is younger than `max_age_hours`.
    /// Missing files, unreadable JSON, and stale timestamps all return
    /// `None` so the caller falls back to a live fetch.
    pub fn load_if_fresh(&self, max_age_hours: i64) -> Option<PlayerCatalog> {
        let metadata: CacheMetadata = match fs::read_to_string(&self.metadata_file) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(m) => m,
                Err(e) => {
                    warn!("unreadable catalog cache metadata: {e}");
                    return None;
                }
            },
            Err(_) => return None,
        };

        let age_hours = (Utc::now().timestamp() - metadata.last_updated) / 3600;
        if age_hours >= max_age_hours {
            info!(age_hours, max_age_hours, "player catalog cache is stale");
            return None;
        }

        match fs::read_to_string(&self.cache_file) {
            Ok(text) => match serde_json::from_str::<PlayerCatalog>(&text) {
                Ok(catalog) => {
                    info!(
                        players = catalog.len(),
                        age_hours, "loaded player catalog from cache"
                    );
                    Some(catalog)
                }
                Err(e) => {
                    warn!("corrupt catalog cache, refetching: {e}");
                    None
                }
            },
            Err(e) => {
                warn!("failed to read catalog cache, refetching: {e}");
                None
            }
        }
    }

    /// Persist the catalog and its metadata sidecar.
    pub fn save(&self, catalog: &PlayerCatalog) -> Result<(), CatalogError> {
        if let Some(parent) = self.cache_file.parent() {
            fs::create_dir_all(parent).map_err(|e| CatalogError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let body = serde_json::to_string(catalog)?;
        fs::write(&self.cache_file, body).map_err(|e| CatalogError::Io {
            path: self.cache_file.display().to_string(),
            source: e,
        })?;

        let metadata = CacheMetadata {
            last_updated: Utc::now().timestamp(),
            player_count: catalog.len(),
            version: CACHE_VERSION.to_string(),
        };
        let meta_body = serde_json::to_string_pretty(&metadata)?;
        fs::write(&self.metadata_file, meta_body).map_err(|e| CatalogError::Io {
            path: self.metadata_file.display().to_string(),
            source: e,
        })?;

        info!(players = catalog.len(), "saved player catalog cache");
        Ok(())
    }
}
