use crate::notifications::Audience;
use crate::startup::AppState;
use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// GET /api/health
///
/// Always answers 200; a failed database probe is reported in the body.
pub async fn health(Extension(app_state): Extension<AppState>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&app_state.db).await {
        Ok(_) => "up",
        Err(e) => {
            warn!("health check database probe failed: {}", e);
            "down"
        }
    };

    let size = app_state.db.size();
    let idle = app_state.db.num_idle() as u32;

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "database": database,
            "pool": {
                "size": size,
                "idle": idle,
            },
            "connections": {
                "admin": app_state.hub.connection_count(Audience::Admin),
                "general": app_state.hub.connection_count(Audience::General),
            }
        })),
    )
}
