pub mod delta;
mod routes;

pub use delta::{InvalidVoteValue, VoteDeltas, VoteValue, calculate_vote_deltas, resolve_vote_value};
pub use routes::{GuideVoteRequest, GuideVoteResponse, list_guides, vote_on_guide};
