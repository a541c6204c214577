use crate::db::connection::DbPool;
use crate::db::models::{GUIDE_STATUS_PUBLISHED, GuideVoteOutcome, VoteCounters};
use crate::votes::{VoteDeltas, VoteValue, calculate_vote_deltas, resolve_vote_value};
use sqlx::{Error, Row};
use uuid::Uuid;

/// What happens to the voter's row in `champion_guide_votes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteWrite {
    Insert(VoteValue),
    Update(VoteValue),
    Delete,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideVotePlan {
    pub desired: VoteValue,
    pub deltas: VoteDeltas,
    pub write: VoteWrite,
}

pub fn guide_accepts_votes(status: &str) -> bool {
    status == GUIDE_STATUS_PUBLISHED
}

/// Resolves `requested` against the stored vote (`None` when the user has no
/// row yet) into the row write and counter deltas to apply.
pub fn plan_guide_vote(stored: Option<VoteValue>, requested: VoteValue) -> GuideVotePlan {
    let existing = stored.unwrap_or_default();
    let desired = resolve_vote_value(requested, existing);

    let write = match (stored, desired) {
        (Some(_), VoteValue::None) => VoteWrite::Delete,
        (Some(_), value) => VoteWrite::Update(value),
        (None, VoteValue::None) => VoteWrite::Keep,
        (None, value) => VoteWrite::Insert(value),
    };

    GuideVotePlan {
        desired,
        deltas: calculate_vote_deltas(existing, desired),
        write,
    }
}

/// Applies `requested` as `user_id`'s vote on a published guide.
///
/// Reads the stored vote, resolves toggle-off, writes the vote row and the
/// guide's counters in one transaction. Returns `None` when the guide does not
/// exist or is not published.
pub async fn apply_guide_vote(
    pool: &DbPool,
    guide_id: Uuid,
    user_id: &str,
    requested: VoteValue,
) -> Result<Option<GuideVoteOutcome>, Error> {
    let mut tx = pool.begin().await?;

    let guide = sqlx::query(
        "SELECT status, score, upvotes, downvotes FROM champion_guides WHERE id = $1 FOR UPDATE",
    )
    .bind(guide_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(guide) = guide else {
        tx.rollback().await?;
        return Ok(None);
    };
    if !guide_accepts_votes(guide.get::<&str, _>("status")) {
        tx.rollback().await?;
        return Ok(None);
    }

    let existing_row = sqlx::query(
        "SELECT id, value FROM champion_guide_votes WHERE guide_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(guide_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let stored = match &existing_row {
        Some(row) => Some(
            VoteValue::try_from(row.get::<i16, _>("value"))
                .map_err(|e| Error::Decode(Box::new(e)))?,
        ),
        None => None,
    };

    let plan = plan_guide_vote(stored, requested);
    let row_id = existing_row.as_ref().map(|row| row.get::<Uuid, _>("id"));

    match (plan.write, row_id) {
        (VoteWrite::Delete, Some(id)) => {
            sqlx::query("DELETE FROM champion_guide_votes WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        (VoteWrite::Update(value), Some(id)) => {
            sqlx::query(
                "UPDATE champion_guide_votes SET value = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
            )
            .bind(i16::from(value))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }
        (VoteWrite::Insert(value), _) => {
            sqlx::query(
                "INSERT INTO champion_guide_votes (id, guide_id, user_id, value) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(guide_id)
            .bind(user_id)
            .bind(i16::from(value))
            .execute(&mut *tx)
            .await?;
        }
        _ => {}
    }

    let counters = if plan.deltas.has_changes() {
        sqlx::query_as::<_, VoteCounters>(
            r#"
            UPDATE champion_guides
            SET score = score + $1, upvotes = upvotes + $2, downvotes = downvotes + $3
            WHERE id = $4
            RETURNING score, upvotes, downvotes
            "#,
        )
        .bind(plan.deltas.score_delta)
        .bind(plan.deltas.upvotes_delta)
        .bind(plan.deltas.downvotes_delta)
        .bind(guide_id)
        .fetch_one(&mut *tx)
        .await?
    } else {
        VoteCounters {
            score: guide.get("score"),
            upvotes: guide.get("upvotes"),
            downvotes: guide.get("downvotes"),
        }
    };

    tx.commit().await?;

    Ok(Some(GuideVoteOutcome {
        counters,
        viewer_vote: plan.desired,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deltas(score: i32, up: i32, down: i32) -> VoteDeltas {
        VoteDeltas {
            score_delta: score,
            upvotes_delta: up,
            downvotes_delta: down,
        }
    }

    #[test]
    fn first_vote_inserts_row() {
        let plan = plan_guide_vote(None, VoteValue::Up);
        assert_eq!(plan.write, VoteWrite::Insert(VoteValue::Up));
        assert_eq!(plan.desired, VoteValue::Up);
        assert_eq!(plan.deltas, deltas(1, 1, 0));

        let plan = plan_guide_vote(None, VoteValue::Down);
        assert_eq!(plan.write, VoteWrite::Insert(VoteValue::Down));
        assert_eq!(plan.deltas, deltas(-1, 0, 1));
    }

    #[test]
    fn repeating_a_vote_deletes_row() {
        let plan = plan_guide_vote(Some(VoteValue::Up), VoteValue::Up);
        assert_eq!(plan.write, VoteWrite::Delete);
        assert_eq!(plan.desired, VoteValue::None);
        assert_eq!(plan.deltas, deltas(-1, -1, 0));
    }

    #[test]
    fn explicit_clear_deletes_row() {
        let plan = plan_guide_vote(Some(VoteValue::Down), VoteValue::None);
        assert_eq!(plan.write, VoteWrite::Delete);
        assert_eq!(plan.deltas, deltas(1, 0, -1));
    }

    #[test]
    fn switching_sides_updates_row() {
        let plan = plan_guide_vote(Some(VoteValue::Up), VoteValue::Down);
        assert_eq!(plan.write, VoteWrite::Update(VoteValue::Down));
        assert_eq!(plan.desired, VoteValue::Down);
        assert_eq!(plan.deltas, deltas(-2, -1, 1));
    }

    #[test]
    fn clearing_without_a_row_writes_nothing() {
        let plan = plan_guide_vote(None, VoteValue::None);
        assert_eq!(plan.write, VoteWrite::Keep);
        assert_eq!(plan.desired, VoteValue::None);
        assert!(!plan.deltas.has_changes());
    }

    #[test]
    fn only_published_guides_take_votes() {
        assert!(guide_accepts_votes("published"));
        assert!(!guide_accepts_votes("draft"));
        assert!(!guide_accepts_votes("archived"));
        assert!(!guide_accepts_votes(""));
    }
}
