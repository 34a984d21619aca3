// Published output types for the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::draft::ownership::Pick;
use crate::draft::roster::OwnerAggregate;
use crate::pool::LeaderboardRow;
use crate::rankings::RankingEntry;

/// One complete, immutable refresh result. The driver publishes whole
/// snapshots atomically; consumers never observe a partially updated state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    /// Monotonic refresh sequence number. Consumers (and the driver itself)
    /// use it to discard results that lost the race to a newer cycle.
    pub sequence: u64,
    pub generated_at: DateTime<Utc>,
    /// All picks with ownership resolved.
    pub picks: Vec<Pick>,
    /// Per-owner combined rosters with totals applied.
    pub owners: Vec<OwnerAggregate>,
    /// Owners ranked by total roster value.
    pub leaderboard: Vec<LeaderboardRow>,
    /// Ranking entries not yet claimed by any owner.
    pub available: Vec<RankingEntry>,
}
