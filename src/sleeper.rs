// Sleeper public API client.
//
// Thin typed wrapper over the read-only Sleeper HTTP endpoints the tracker
// consumes. Every call carries a bounded timeout; a 404 is "not found", not
// an error. The `DraftSource` trait is the seam the refresh driver polls
// through, so tests can substitute an in-memory source.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.sleeper.app/v1";

/// Default per-request timeout. The player dump is the slowest endpoint and
/// comfortably fits in this window.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SleeperError {
    #[error("timeout while fetching {endpoint}")]
    Timeout { endpoint: String },

    #[error("unable to connect to Sleeper API")]
    Connect(#[source] reqwest::Error),

    #[error("rate limited by Sleeper API")]
    RateLimited,

    #[error("Sleeper API error: HTTP {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("request error for {endpoint}: {source}")]
    Request {
        endpoint: String,
        source: reqwest::Error,
    },
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

/// Draft metadata. `slot_to_roster_id` keys arrive as JSON object keys, i.e.
/// strings; the resolution context parses them into slot numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftInfo {
    pub draft_id: String,
    #[serde(rename = "type")]
    pub draft_type: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub settings: DraftSettings,
    #[serde(default)]
    pub slot_to_roster_id: Option<HashMap<String, u64>>,
    #[serde(default)]
    pub draft_order: Option<HashMap<String, u32>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftSettings {
    #[serde(default)]
    pub teams: u32,
    #[serde(default)]
    pub rounds: u32,
}

/// One pick from the draft pick list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickPayload {
    #[serde(default)]
    pub pick_no: u32,
    #[serde(default)]
    pub round: u32,
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub draft_slot: u32,
    #[serde(default)]
    pub picked_by: Option<String>,
    #[serde(default)]
    pub roster_id: Option<u64>,
    #[serde(default)]
    pub metadata: Option<PickMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickMetadata {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

impl PickPayload {
    /// Display name assembled from pick metadata, if any was supplied.
    pub fn display_name(&self) -> Option<String> {
        let meta = self.metadata.as_ref()?;
        let joined = match (&meta.first_name, &meta.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}").trim().to_string(),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => return None,
        };
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// A standing traded-pick record for a league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradedPickPayload {
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub round: u32,
    /// Original owner of the pick.
    #[serde(default)]
    pub roster_id: u64,
    /// Current owner of the pick.
    #[serde(default)]
    pub owner_id: u64,
}

/// A league roster with its pre-draft holdings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueRoster {
    #[serde(default)]
    pub roster_id: u64,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub players: Option<Vec<String>>,
    #[serde(default)]
    pub taxi: Option<Vec<String>>,
    #[serde(default)]
    pub reserve: Option<Vec<String>>,
}

/// A user participating in a league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// League summary, as returned by the league and user-league endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub league_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub draft_id: Option<String>,
}

/// One entry of the full player dump. Only the identity fields matter here;
/// the rest of the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPayload {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SleeperClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl SleeperClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Custom base URL and timeout, used by configuration overrides and by
    /// tests pointed at a local server.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        SleeperClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// GET an endpoint and decode JSON. A 404 returns `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Option<T>, SleeperError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "sleeper request");

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SleeperError::Timeout {
                        endpoint: endpoint.to_string(),
                    }
                } else if e.is_connect() {
                    SleeperError::Connect(e)
                } else {
                    SleeperError::Request {
                        endpoint: endpoint.to_string(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if status.as_u16() == 429 {
            return Err(SleeperError::RateLimited);
        }
        if !status.is_success() {
            return Err(SleeperError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| SleeperError::Decode {
                endpoint: endpoint.to_string(),
                source: e,
            })
    }

    /// Like `get_json` for list endpoints, where "not found" means empty.
    async fn get_list<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, SleeperError> {
        Ok(self.get_json::<Vec<T>>(endpoint).await?.unwrap_or_default())
    }

    pub async fn get_league(&self, league_id: &str) -> Result<Option<LeagueInfo>, SleeperError> {
        self.get_json(&format!("/league/{league_id}")).await
    }

    pub async fn get_league_rosters(
        &self,
        league_id: &str,
    ) -> Result<Vec<LeagueRoster>, SleeperError> {
        self.get_list(&format!("/league/{league_id}/rosters")).await
    }

    pub async fn get_league_users(
        &self,
        league_id: &str,
    ) -> Result<Vec<LeagueUser>, SleeperError> {
        self.get_list(&format!("/league/{league_id}/users")).await
    }

    pub async fn get_draft(&self, draft_id: &str) -> Result<Option<DraftInfo>, SleeperError> {
        self.get_json(&format!("/draft/{draft_id}")).await
    }

    pub async fn get_draft_picks(&self, draft_id: &str) -> Result<Vec<PickPayload>, SleeperError> {
        self.get_list(&format!("/draft/{draft_id}/picks")).await
    }

    pub async fn get_traded_picks(
        &self,
        draft_id: &str,
    ) -> Result<Vec<TradedPickPayload>, SleeperError> {
        self.get_list(&format!("/draft/{draft_id}/traded_picks"))
            .await
    }

    /// The full NFL player dump. Large; callers cache it on disk.
    pub async fn get_players(&self) -> Result<HashMap<String, PlayerPayload>, SleeperError> {
        Ok(self
            .get_json::<HashMap<String, PlayerPayload>>("/players/nfl")
            .await?
            .unwrap_or_default())
    }
}

impl Default for SleeperClient {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// DraftSource
// ---------------------------------------------------------------------------

/// The three fetches a refresh cycle performs, abstracted so the driver can
/// run against a mock in tests.
#[async_trait]
pub trait DraftSource: Send + Sync {
    async fn fetch_picks(&self) -> Result<Vec<PickPayload>, SleeperError>;
    async fn fetch_traded_picks(&self) -> Result<Vec<TradedPickPayload>, SleeperError>;
    async fn fetch_rosters(&self) -> Result<Vec<LeagueRoster>, SleeperError>;
}

/// Live source bound to one draft and its league.
pub struct LiveDraftSource {
    client: SleeperClient,
    draft_id: String,
    league_id: String,
}

impl LiveDraftSource {
    pub fn new(client: SleeperClient, draft_id: String, league_id: String) -> Self {
        LiveDraftSource {
            client,
            draft_id,
            league_id,
        }
    }
}

#[async_trait]
impl DraftSource for LiveDraftSource {
    async fn fetch_picks(&self) -> Result<Vec<PickPayload>, SleeperError> {
        self.client.get_draft_picks(&self.draft_id).await
    }

    async fn fetch_traded_picks(&self) -> Result<Vec<TradedPickPayload>, SleeperError> {
        self.client.get_traded_picks(&self.draft_id).await
    }

    async fn fetch_rosters(&self) -> Result<Vec<LeagueRoster>, SleeperError> {
        self.client.get_league_rosters(&self.league_id).await
    }
}
