use crate::votes::VoteValue;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

pub const GUIDE_STATUS_PUBLISHED: &str = "published";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GuideSummary {
    pub id: Uuid,
    pub champion_id: String,
    pub title: String,
    pub score: i32,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct VoteCounters {
    pub score: i32,
    pub upvotes: i32,
    pub downvotes: i32,
}

/// State of a guide after a vote was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideVoteOutcome {
    pub counters: VoteCounters,
    pub viewer_vote: VoteValue,
}
