use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single user's vote on a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum VoteValue {
    Down,
    #[default]
    None,
    Up,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("vote value must be -1, 0 or 1, got {0}")]
pub struct InvalidVoteValue(pub i16);

impl TryFrom<i16> for VoteValue {
    type Error = InvalidVoteValue;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(VoteValue::Down),
            0 => Ok(VoteValue::None),
            1 => Ok(VoteValue::Up),
            other => Err(InvalidVoteValue(other)),
        }
    }
}

impl From<VoteValue> for i16 {
    fn from(value: VoteValue) -> Self {
        match value {
            VoteValue::Down => -1,
            VoteValue::None => 0,
            VoteValue::Up => 1,
        }
    }
}

/// Signed changes to a content item's aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDeltas {
    pub score_delta: i32,
    pub upvotes_delta: i32,
    pub downvotes_delta: i32,
}

impl VoteDeltas {
    pub fn has_changes(&self) -> bool {
        self.score_delta != 0 || self.upvotes_delta != 0 || self.downvotes_delta != 0
    }
}

/// Deltas caused by moving a vote from `old` to `new`.
///
/// The old vote's contribution is reversed first, then the new one is applied,
/// so `calculate_vote_deltas(a, b)` followed by `calculate_vote_deltas(b, a)`
/// always nets out to zero.
pub fn calculate_vote_deltas(old: VoteValue, new: VoteValue) -> VoteDeltas {
    let mut deltas = VoteDeltas::default();

    if old == new {
        return deltas;
    }

    match old {
        VoteValue::Up => {
            deltas.score_delta -= 1;
            deltas.upvotes_delta -= 1;
        }
        VoteValue::Down => {
            deltas.score_delta += 1;
            deltas.downvotes_delta -= 1;
        }
        VoteValue::None => {}
    }

    match new {
        VoteValue::Up => {
            deltas.score_delta += 1;
            deltas.upvotes_delta += 1;
        }
        VoteValue::Down => {
            deltas.score_delta -= 1;
            deltas.downvotes_delta += 1;
        }
        VoteValue::None => {}
    }

    deltas
}

/// Clicking the vote you already have removes it.
pub fn resolve_vote_value(requested: VoteValue, existing: VoteValue) -> VoteValue {
    if requested == existing {
        VoteValue::None
    } else {
        requested
    }
}
