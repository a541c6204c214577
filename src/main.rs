use axum::http::HeaderValue;
use riftwatch::config::Config;
use riftwatch::routes::build_router;
use riftwatch::startup::AppState;
use riftwatch::db;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::init_db(&config.database_url, config.db_max_connections).await?;
    db::spawn_pool_health_check(pool.clone());

    let app_state = AppState::new(pool, config.jwt_secret.as_bytes());

    let allowed_origin = config
        .cors_allowed_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()?;

    let app = build_router(app_state, allowed_origin);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
