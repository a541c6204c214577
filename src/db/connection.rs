use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tokio::time::interval;
use tracing::error;

pub type DbPool = Pool<Postgres>;

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(60);

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .max_lifetime(Duration::from_secs(30 * 60))
        .idle_timeout(Duration::from_secs(10 * 60))
        .connect(database_url)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS champion_guides (
            id UUID PRIMARY KEY,
            champion_id VARCHAR(64) NOT NULL,
            title VARCHAR(255) NOT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'draft',
            score INT NOT NULL DEFAULT 0,
            upvotes INT NOT NULL DEFAULT 0,
            downvotes INT NOT NULL DEFAULT 0,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS champion_guide_votes (
            id UUID PRIMARY KEY,
            guide_id UUID NOT NULL REFERENCES champion_guides(id) ON DELETE CASCADE,
            user_id VARCHAR(64) NOT NULL,
            value SMALLINT NOT NULL CHECK (value IN (-1, 1)),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(guide_id, user_id)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_champion_guides_status_created
            ON champion_guides(status, created_at DESC)
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_champion_guide_votes_user_id ON champion_guide_votes(user_id)
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

/// Periodically checks a connection out of the pool so a dead database shows
/// up in the logs before the next request hits it.
pub fn spawn_pool_health_check(pool: DbPool) {
    tokio::spawn(async move {
        let mut ticker = interval(HEALTH_CHECK_INTERVAL);
        loop {
            ticker.tick().await;
            match pool.acquire().await {
                Ok(conn) => drop(conn),
                Err(e) => error!("Database connection health check failed: {}", e),
            }
        }
    });
}
