// Pick ownership resolution: who controls each pick once trades apply.
//
// All lookups go through an explicit, immutable `ResolutionContext` built
// once per draft load. Resolution is a pure function of its inputs; rerunning
// it over the same pick list always yields the same output.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::draft::slot::{linear_slot, snake_slot};
use crate::sleeper::{DraftInfo, PickPayload, TradedPickPayload};

/// How pick numbers map to board slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftType {
    Snake,
    Linear,
}

impl DraftType {
    /// Parse the Sleeper `type` field. Anything that isn't "snake" runs
    /// linear; auction drafts have no slot math and are rejected upstream.
    pub fn from_api(s: &str) -> Self {
        if s.eq_ignore_ascii_case("snake") {
            DraftType::Snake
        } else {
            DraftType::Linear
        }
    }
}

/// A standing transfer of one round's draft rights between rosters.
/// Independent of any specific pick number; multiple may exist per league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradedPick {
    pub season: String,
    pub round: u32,
    /// The roster whose original pick this is.
    pub roster_id: u64,
    /// The roster currently holding the pick.
    pub owner_id: u64,
}

impl From<&TradedPickPayload> for TradedPick {
    fn from(p: &TradedPickPayload) -> Self {
        TradedPick {
            season: p.season.clone(),
            round: p.round,
            roster_id: p.roster_id,
            owner_id: p.owner_id,
        }
    }
}

/// Bijection between league users and the rosters they control, valid for one
/// draft context. Built when draft data loads and never mutated afterward: a
/// draft does not change its team roster mid-event.
#[derive(Debug, Clone, Default)]
pub struct DraftOrderMap {
    user_to_roster: HashMap<String, u64>,
    roster_to_user: HashMap<u64, String>,
}

impl DraftOrderMap {
    /// Build the bijection from the draft's `draft_order` (user -> seed slot)
    /// and `slot_to_roster` tables. Users whose slot has no roster mapping are
    /// skipped with a warning.
    pub fn new(draft_order: &HashMap<String, u32>, slot_to_roster: &HashMap<u32, u64>) -> Self {
        let mut map = DraftOrderMap::default();
        for (user_id, slot) in draft_order {
            match slot_to_roster.get(slot) {
                Some(&roster_id) => {
                    map.user_to_roster.insert(user_id.clone(), roster_id);
                    map.roster_to_user.insert(roster_id, user_id.clone());
                }
                None => {
                    warn!(user_id = %user_id, slot = *slot, "draft order slot has no roster mapping");
                }
            }
        }
        map
    }

    pub fn roster_for(&self, user_id: &str) -> Option<u64> {
        self.user_to_roster.get(user_id).copied()
    }

    pub fn user_for(&self, roster_id: u64) -> Option<&str> {
        self.roster_to_user.get(&roster_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.user_to_roster.is_empty()
    }
}

/// Everything ownership resolution needs, as one immutable value. Replaces
/// the ambient draft/user globals the rest of the system used to reach for.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub season: String,
    pub team_count: u32,
    pub draft_type: DraftType,
    /// Seed slot (1..=team_count) -> roster originally occupying it.
    pub slot_to_roster: HashMap<u32, u64>,
    pub draft_order: DraftOrderMap,
    pub traded_picks: Vec<TradedPick>,
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("draft {draft_id} reports a team count of zero")]
    NoTeams { draft_id: String },

    #[error("draft {draft_id} is an auction draft; pick slots do not apply")]
    Auction { draft_id: String },
}

impl ResolutionContext {
    pub fn new(
        season: String,
        team_count: u32,
        draft_type: DraftType,
        slot_to_roster: HashMap<u32, u64>,
        draft_order: DraftOrderMap,
        traded_picks: Vec<TradedPick>,
    ) -> Self {
        assert!(team_count >= 1, "team_count must be >= 1");
        ResolutionContext {
            season,
            team_count,
            draft_type,
            slot_to_roster,
            draft_order,
            traded_picks,
        }
    }

    /// Assemble a context from the Sleeper draft payload plus the league's
    /// traded-pick records. Missing `slot_to_roster_id` / `draft_order`
    /// tables degrade to empty maps (unknown owners), not errors; a zero
    /// team count or an auction draft is unusable and is rejected.
    pub fn from_draft(
        draft: &DraftInfo,
        traded: &[TradedPickPayload],
    ) -> Result<Self, ContextError> {
        if draft.draft_type.eq_ignore_ascii_case("auction") {
            return Err(ContextError::Auction {
                draft_id: draft.draft_id.clone(),
            });
        }
        if draft.settings.teams == 0 {
            return Err(ContextError::NoTeams {
                draft_id: draft.draft_id.clone(),
            });
        }

        let slot_to_roster: HashMap<u32, u64> = draft
            .slot_to_roster_id
            .as_ref()
            .map(|m| {
                m.iter()
                    .filter_map(|(slot, &roster)| match slot.parse::<u32>() {
                        Ok(n) => Some((n, roster)),
                        Err(_) => {
                            warn!(slot = %slot, "unparseable draft slot key");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let draft_order = draft
            .draft_order
            .as_ref()
            .map(|order| DraftOrderMap::new(order, &slot_to_roster))
            .unwrap_or_default();

        if slot_to_roster.is_empty() {
            warn!(
                draft_id = %draft.draft_id,
                "draft has no slot-to-roster table; owners will be unknown"
            );
        }

        Ok(ResolutionContext::new(
            draft.season.clone(),
            draft.settings.teams,
            DraftType::from_api(&draft.draft_type),
            slot_to_roster,
            draft_order,
            traded.iter().map(TradedPick::from).collect(),
        ))
    }

    fn slot_for(&self, pick_number: u32) -> u32 {
        match self.draft_type {
            DraftType::Snake => snake_slot(pick_number, self.team_count).slot,
            DraftType::Linear => linear_slot(pick_number, self.team_count).slot,
        }
    }
}

/// The owner a pick resolved to. Both fields degrade to `None` when a
/// mapping is missing; the presentation layer renders that as "unknown
/// owner" rather than the core raising an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOwner {
    pub roster_id: Option<u64>,
    pub user_id: Option<String>,
}

impl ResolvedOwner {
    pub const UNKNOWN: ResolvedOwner = ResolvedOwner {
        roster_id: None,
        user_id: None,
    };
}

/// A resolved draft pick. Derived on every refresh, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub pick_number: u32,
    pub round: u32,
    pub player_id: String,
    /// Display name from the pick metadata, when the API supplied one.
    pub player_name: Option<String>,
    pub draft_slot: u32,
    pub roster_id: Option<u64>,
    pub user_id: Option<String>,
}

/// Determine the current controlling owner of a pick.
///
/// Slot assignment comes from the draft-type formula, the original roster
/// from `slot_to_roster`, and a single matching traded-pick record (same
/// season, round, and original roster) reassigns it. Only one trade
/// application is considered: a pick traded twice in the same round is not
/// chained further.
pub fn resolve_owner(pick_number: u32, round: u32, ctx: &ResolutionContext) -> ResolvedOwner {
    let slot = ctx.slot_for(pick_number);

    let original = match ctx.slot_to_roster.get(&slot) {
        Some(&roster_id) => roster_id,
        None => {
            debug!(pick_number, slot, "no roster mapped to slot");
            return ResolvedOwner::UNKNOWN;
        }
    };

    let resolved = ctx
        .traded_picks
        .iter()
        .find(|t| t.season == ctx.season && t.round == round && t.roster_id == original)
        .map(|t| t.owner_id)
        .filter(|&owner| owner != original)
        .unwrap_or(original);

    ResolvedOwner {
        roster_id: Some(resolved),
        user_id: ctx.draft_order.user_for(resolved).map(str::to_string),
    }
}

/// Resolve ownership for a full pick list. This is the only resolution path;
/// every refresh cycle calls it exactly once.
///
/// Payload rows with a zero pick number are unusable and skipped with a
/// warning. A missing round is recomputed from the pick number.
pub fn resolve_picks(payloads: &[PickPayload], ctx: &ResolutionContext) -> Vec<Pick> {
    let mut picks = Vec::with_capacity(payloads.len());
    for payload in payloads {
        if payload.pick_no == 0 {
            warn!(player_id = ?payload.player_id, "skipping pick with no pick number");
            continue;
        }

        let assignment = match ctx.draft_type {
            DraftType::Snake => snake_slot(payload.pick_no, ctx.team_count),
            DraftType::Linear => linear_slot(payload.pick_no, ctx.team_count),
        };
        let round = if payload.round > 0 {
            payload.round
        } else {
            assignment.round
        };

        let owner = resolve_owner(payload.pick_no, round, ctx);

        picks.push(Pick {
            pick_number: payload.pick_no,
            round,
            player_id: payload.player_id.clone().unwrap_or_default(),
            player_name: payload.display_name(),
            draft_slot: assignment.slot,
            roster_id: owner.roster_id,
            user_id: owner.user_id,
        });
    }
    picks
}
