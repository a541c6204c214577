use crate::db::connection::DbPool;
use crate::db::models::{GUIDE_STATUS_PUBLISHED, GuideSummary};
use sqlx::Error;

pub async fn list_published_guides(
    pool: &DbPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<GuideSummary>, Error> {
    let rows = sqlx::query_as::<_, GuideSummary>(
        r#"
        SELECT id, champion_id, title, score, upvotes, downvotes, created_at
        FROM champion_guides
        WHERE status = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(GUIDE_STATUS_PUBLISHED)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_published_guides(pool: &DbPool) -> Result<i64, Error> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM champion_guides WHERE status = $1")
        .bind(GUIDE_STATUS_PUBLISHED)
        .fetch_one(pool)
        .await?;

    Ok(total)
}
