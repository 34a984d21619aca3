// Valuation and available-pool filtering.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::draft::ownership::Pick;
use crate::draft::roster::{OwnerAggregate, RosterSnapshot};
use crate::identity::{Hint, IdentityIndex};
use crate::names::normalize;
use crate::rankings::RankingEntry;

/// Canonical id -> clamped ranking value. Built once per refresh from the
/// ranking list; players the rankings don't cover simply have no entry and
/// contribute zero.
#[derive(Debug, Clone, Default)]
pub struct PlayerValues {
    by_id: HashMap<String, f64>,
}

impl PlayerValues {
    /// Resolve every ranking entry to a canonical identity and record its
    /// value. Entries that fail to resolve are skipped (they cannot be
    /// attributed to a rostered player anyway); when two entries resolve to
    /// the same id the first wins.
    pub fn build(rankings: &[RankingEntry], index: &IdentityIndex) -> Self {
        let mut by_id = HashMap::new();
        for entry in rankings {
            let hint = Hint {
                position: non_empty(&entry.position),
                team: non_empty(&entry.team),
            };
            match index.lookup(&entry.name, hint) {
                Some(player) => {
                    by_id
                        .entry(player.id.clone())
                        .or_insert_with(|| entry.value.max(0.0));
                }
                None => {
                    debug!(name = %entry.name, "ranking entry did not resolve to catalog");
                }
            }
        }
        PlayerValues { by_id }
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Sum an owner's player values. A player with no known value contributes
/// zero, and every contribution is clamped non-negative, so the total can
/// never go below zero.
pub fn owner_value(owner: &OwnerAggregate, values: &PlayerValues) -> f64 {
    owner
        .players
        .iter()
        .map(|p| values.get(&p.player.id).unwrap_or(0.0).max(0.0))
        .sum()
}

/// Fill in `total_value` on each aggregate.
pub fn apply_values(owners: &mut [OwnerAggregate], values: &PlayerValues) {
    for owner in owners.iter_mut() {
        owner.total_value = owner_value(owner, values);
    }
}

/// A leaderboard row for the standings view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub roster_id: u64,
    pub user_id: Option<String>,
    pub total_value: f64,
}

/// Rank owners by total roster value, descending. Ties break on roster id
/// so repeated refreshes render identically.
pub fn leaderboard(owners: &[OwnerAggregate]) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = owners
        .iter()
        .map(|o| LeaderboardRow {
            roster_id: o.roster_id,
            user_id: o.user_id.clone(),
            total_value: o.total_value,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_value
            .partial_cmp(&a.total_value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.roster_id.cmp(&b.roster_id))
    });
    rows
}

/// The union of every drafted player id and every dynasty-held id across
/// the league. Dynasty holdings count as claimed even when never drafted.
pub fn claimed_ids(picks: &[Pick], rosters: &[RosterSnapshot]) -> HashSet<String> {
    let mut claimed: HashSet<String> = picks
        .iter()
        .filter(|p| !p.player_id.is_empty())
        .map(|p| p.player_id.clone())
        .collect();
    for roster in rosters {
        claimed.extend(roster.player_ids.iter().cloned());
    }
    claimed
}

/// Normalized display names of drafted players, for the last-resort name
/// fallback when a ranking entry cannot be resolved to a canonical id.
pub fn drafted_names(picks: &[Pick]) -> HashSet<String> {
    picks
        .iter()
        .filter_map(|p| p.player_name.as_deref())
        .map(normalize)
        .filter(|n| !n.is_empty())
        .collect()
}

/// Remove claimed players from the available pool.
///
/// An entry is removed iff its resolved canonical id is in `claimed`. When
/// id resolution fails entirely, the entry's normalized name is compared
/// against the drafted display names instead. Filtering an already-filtered
/// list with the same claimed set is a no-op.
pub fn filter_available(
    rankings: &[RankingEntry],
    claimed: &HashSet<String>,
    index: &IdentityIndex,
    drafted: &HashSet<String>,
) -> Vec<RankingEntry> {
    rankings
        .iter()
        .filter(|entry| {
            let hint = Hint {
                position: non_empty(&entry.position),
                team: non_empty(&entry.team),
            };
            match index.lookup(&entry.name, hint) {
                Some(player) => !claimed.contains(&player.id),
                None => !drafted.contains(&normalize(&entry.name)),
            }
        })
        .cloned()
        .collect()
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
