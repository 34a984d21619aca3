// Per-owner roster aggregation: drafted picks merged with dynasty holdings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::CanonicalPlayer;
use crate::draft::ownership::Pick;
use crate::identity::IdentityIndex;
use crate::sleeper::LeagueRoster;

/// Dynasty holdings for one roster, captured before the draft. Main roster,
/// taxi squad, and injured reserve all count as held players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub roster_id: u64,
    pub owner_id: Option<String>,
    pub player_ids: Vec<String>,
}

impl RosterSnapshot {
    /// Merge a league roster payload's player, taxi, and reserve lists into
    /// one deduplicated holding set.
    pub fn from_payload(payload: &LeagueRoster) -> Self {
        let mut player_ids: Vec<String> = Vec::new();
        for id in payload
            .players
            .iter()
            .flatten()
            .chain(payload.taxi.iter().flatten())
            .chain(payload.reserve.iter().flatten())
        {
            if !player_ids.contains(id) {
                player_ids.push(id.clone());
            }
        }
        RosterSnapshot {
            roster_id: payload.roster_id,
            owner_id: payload.owner_id.clone(),
            player_ids,
        }
    }
}

/// How a player ended up on an owner's aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Acquisition {
    /// Held before the draft (keeper/dynasty carryover).
    Dynasty,
    /// Selected in the tracked draft.
    Drafted { round: u32, pick_number: u32 },
}

/// A player on an owner's combined roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedPlayer {
    pub player: CanonicalPlayer,
    pub acquired: Acquisition,
}

/// One owner's combined, deduplicated roster. Recomputed whenever picks or
/// dynasty rosters change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerAggregate {
    pub roster_id: u64,
    pub user_id: Option<String>,
    pub players: Vec<OwnedPlayer>,
    /// Sum of clamped player values; filled in by the valuation pass.
    pub total_value: f64,
}

impl OwnerAggregate {
    fn new(roster_id: u64) -> Self {
        OwnerAggregate {
            roster_id,
            user_id: None,
            players: Vec::new(),
            total_value: 0.0,
        }
    }

    pub fn has_player(&self, id: &str) -> bool {
        self.players.iter().any(|p| p.player.id == id)
    }
}

/// Merge resolved picks and dynasty roster snapshots into per-owner
/// aggregates.
///
/// Every held or drafted player id is resolved through the index's direct
/// id map; unresolvable ids become placeholder records rather than being
/// dropped. Within an owner, a player appearing as both a dynasty holding
/// and a drafted pick keeps the drafted version, which carries round and
/// pick metadata the dynasty record lacks. Output is ordered by roster id.
pub fn aggregate(
    picks: &[Pick],
    rosters: &[RosterSnapshot],
    index: &IdentityIndex,
) -> Vec<OwnerAggregate> {
    let mut owners: BTreeMap<u64, OwnerAggregate> = BTreeMap::new();

    for roster in rosters {
        let owner = owners
            .entry(roster.roster_id)
            .or_insert_with(|| OwnerAggregate::new(roster.roster_id));
        if owner.user_id.is_none() {
            owner.user_id = roster.owner_id.clone();
        }
        for id in &roster.player_ids {
            if owner.has_player(id) {
                continue;
            }
            let player = resolve_or_placeholder(id, index);
            owner.players.push(OwnedPlayer {
                player,
                acquired: Acquisition::Dynasty,
            });
        }
    }

    for pick in picks {
        let roster_id = match pick.roster_id {
            Some(id) => id,
            None => {
                warn!(
                    pick_number = pick.pick_number,
                    "pick has no resolved owner; excluded from aggregates"
                );
                continue;
            }
        };
        if pick.player_id.is_empty() {
            continue;
        }

        let owner = owners
            .entry(roster_id)
            .or_insert_with(|| OwnerAggregate::new(roster_id));
        if owner.user_id.is_none() {
            owner.user_id = pick.user_id.clone();
        }

        let drafted = OwnedPlayer {
            player: resolve_or_placeholder(&pick.player_id, index),
            acquired: Acquisition::Drafted {
                round: pick.round,
                pick_number: pick.pick_number,
            },
        };

        match owner.players.iter_mut().find(|p| p.player.id == pick.player_id) {
            Some(existing) => {
                if matches!(existing.acquired, Acquisition::Dynasty) {
                    // The drafted record is the more specific one.
                    *existing = drafted;
                }
            }
            None => owner.players.push(drafted),
        }
    }

    owners.into_values().collect()
}

fn resolve_or_placeholder(id: &str, index: &IdentityIndex) -> CanonicalPlayer {
    match index.by_id(id) {
        Some(player) => player.clone(),
        None => {
            debug!(id, "player id not in catalog; using placeholder");
            CanonicalPlayer::placeholder(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlayerCatalog;
    use crate::sleeper::PlayerPayload;
    use std::collections::HashMap;

    fn index_of(ids: &[(&str, &str)]) -> IdentityIndex {
        let mut raw = HashMap::new();
        for &(id, name) in ids {
            let mut parts = name.splitn(2, ' ');
            let first = parts.next().unwrap_or_default().to_string();
            let last = parts.next().unwrap_or_default().to_string();
            raw.insert(
                id.to_string(),
                PlayerPayload {
                    first_name: Some(first),
                    last_name: Some(last),
                    full_name: Some(name.to_string()),
                    position: Some("RB".to_string()),
                    team: Some("SF".to_string()),
                },
            );
        }
        IdentityIndex::build(&PlayerCatalog::from_payloads(&raw))
    }

    fn pick(number: u32, round: u32, player_id: &str, roster_id: u64) -> Pick {
        Pick {
            pick_number: number,
            round,
            player_id: player_id.to_string(),
            player_name: None,
            draft_slot: 1,
            roster_id: Some(roster_id),
            user_id: Some(format!("user_{roster_id}")),
        }
    }

    fn snapshot(roster_id: u64, ids: &[&str]) -> RosterSnapshot {
        RosterSnapshot {
            roster_id,
            owner_id: Some(format!("user_{roster_id}")),
            player_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn from_payload_merges_taxi_and_reserve() {
        let payload = LeagueRoster {
            roster_id: 3,
            owner_id: Some("user_3".to_string()),
            players: Some(vec!["100".to_string(), "101".to_string()]),
            taxi: Some(vec!["102".to_string()]),
            reserve: Some(vec!["103".to_string(), "100".to_string()]),
        };
        let snap = RosterSnapshot::from_payload(&payload);
        assert_eq!(snap.player_ids, vec!["100", "101", "102", "103"]);
    }

    #[test]
    fn from_payload_tolerates_missing_lists() {
        let payload = LeagueRoster {
            roster_id: 3,
            owner_id: None,
            players: None,
            taxi: None,
            reserve: None,
        };
        let snap = RosterSnapshot::from_payload(&payload);
        assert!(snap.player_ids.is_empty());
    }

    #[test]
    fn dynasty_and_picks_produce_one_aggregate_per_owner() {
        let index = index_of(&[("100", "Christian McCaffrey"), ("200", "Bijan Robinson")]);
        let picks = vec![pick(1, 1, "200", 2)];
        let rosters = vec![snapshot(1, &["100"])];
        let owners = aggregate(&picks, &rosters, &index);
        assert_eq!(owners.len(), 2);
        assert_eq!(owners[0].roster_id, 1);
        assert_eq!(owners[1].roster_id, 2);
        assert!(owners[0].has_player("100"));
        assert!(owners[1].has_player("200"));
    }

    #[test]
    fn drafted_version_wins_on_dedup() {
        let index = index_of(&[("100", "Christian McCaffrey")]);
        let picks = vec![pick(13, 2, "100", 1)];
        let rosters = vec![snapshot(1, &["100"])];
        let owners = aggregate(&picks, &rosters, &index);
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].players.len(), 1);
        assert_eq!(
            owners[0].players[0].acquired,
            Acquisition::Drafted {
                round: 2,
                pick_number: 13
            }
        );
    }

    #[test]
    fn drafted_then_dynasty_still_keeps_drafted() {
        // Same dedup invariant regardless of source ordering: the dynasty
        // pass runs first, so feed the pick for a roster that also appears
        // later in the snapshot list.
        let index = index_of(&[("100", "Christian McCaffrey")]);
        let picks = vec![pick(5, 1, "100", 4)];
        let rosters = vec![snapshot(4, &["100"])];
        let owners = aggregate(&picks, &rosters, &index);
        assert_eq!(owners[0].players.len(), 1);
        assert!(matches!(
            owners[0].players[0].acquired,
            Acquisition::Drafted { .. }
        ));
    }

    #[test]
    fn unresolvable_id_becomes_placeholder() {
        let index = index_of(&[]);
        let rosters = vec![snapshot(1, &["9999"])];
        let owners = aggregate(&[], &rosters, &index);
        let p = &owners[0].players[0].player;
        assert_eq!(p.full_name, "Player 9999");
        assert_eq!(p.position, "UNKNOWN");
    }

    #[test]
    fn unowned_pick_is_excluded() {
        let index = index_of(&[("100", "Christian McCaffrey")]);
        let mut unowned = pick(1, 1, "100", 1);
        unowned.roster_id = None;
        let owners = aggregate(&[unowned], &[], &index);
        assert!(owners.is_empty());
    }

    #[test]
    fn user_id_comes_from_roster_or_pick() {
        let index = index_of(&[("100", "Christian McCaffrey"), ("200", "Bijan Robinson")]);
        let mut anon_roster = snapshot(1, &["100"]);
        anon_roster.owner_id = None;
        let owners = aggregate(&[pick(1, 1, "200", 2)], &[anon_roster], &index);
        assert_eq!(owners[0].user_id, None);
        assert_eq!(owners[1].user_id, Some("user_2".to_string()));
    }

    #[test]
    fn duplicate_dynasty_ids_not_double_counted() {
        let index = index_of(&[("100", "Christian McCaffrey")]);
        let rosters = vec![snapshot(1, &["100", "100"])];
        let owners = aggregate(&[], &rosters, &index);
        assert_eq!(owners[0].players.len(), 1);
    }
}
