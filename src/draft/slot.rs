// Pick-number to draft-slot math.

use serde::{Deserialize, Serialize};

/// Where a pick number lands on the draft board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    /// 1-indexed round.
    pub round: u32,
    /// 1-indexed position within the round, in pick order.
    pub position_in_round: u32,
    /// The seed slot (1..=team_count) whose roster originally owns the pick.
    pub slot: u32,
}

/// Map a pick number to its snake-draft slot.
///
/// `round = ceil(pick_number / team_count)`; odd rounds run 1..T, even
/// rounds reverse to T..1. Stateless, so it must never be cached across
/// league sizes.
///
/// # Panics
/// Panics if `pick_number` or `team_count` is zero (programmer error; data
/// from upstream is validated before it reaches here).
pub fn snake_slot(pick_number: u32, team_count: u32) -> SlotAssignment {
    assert!(pick_number >= 1, "pick_number must be >= 1");
    assert!(team_count >= 1, "team_count must be >= 1");

    let round = (pick_number - 1) / team_count + 1;
    let position_in_round = (pick_number - 1) % team_count + 1;
    let slot = if round % 2 == 1 {
        position_in_round
    } else {
        team_count - position_in_round + 1
    };

    SlotAssignment {
        round,
        position_in_round,
        slot,
    }
}

/// Map a pick number to its slot in a linear (non-reversing) draft.
///
/// # Panics
/// Same input validation as [`snake_slot`].
pub fn linear_slot(pick_number: u32, team_count: u32) -> SlotAssignment {
    assert!(pick_number >= 1, "pick_number must be >= 1");
    assert!(team_count >= 1, "team_count must be >= 1");

    let round = (pick_number - 1) / team_count + 1;
    let position_in_round = (pick_number - 1) % team_count + 1;

    SlotAssignment {
        round,
        position_in_round,
        slot: position_in_round,
    }
}
