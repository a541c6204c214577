use crate::auth::AuthUser;
use crate::db;
use crate::error::VoteError;
use crate::pagination::{PaginatedResponse, PaginationParams, PaginationQuery};
use crate::startup::AppState;
use crate::votes::VoteValue;
use axum::{
    extract::{Extension, Json, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideVoteRequest {
    pub guide_id: Uuid,
    pub value: VoteValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideVoteResponse {
    pub guide_id: Uuid,
    pub score: i32,
    pub upvotes: i32,
    pub downvotes: i32,
    pub viewer_vote: Option<VoteValue>,
}

/// POST /api/guides/vote
pub async fn vote_on_guide(
    AuthUser(claims): AuthUser,
    Extension(app_state): Extension<AppState>,
    body: Result<Json<GuideVoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, VoteError> {
    let Json(payload) = body.map_err(|rejection| VoteError::InvalidRequest(rejection.body_text()))?;

    let outcome = db::apply_guide_vote(&app_state.db, payload.guide_id, &claims.user_id, payload.value)
        .await
        .inspect_err(|e| error!(guide_id = %payload.guide_id, "guide vote failed: {e}"))?
        .ok_or(VoteError::GuideNotFound)?;

    let viewer_vote = match outcome.viewer_vote {
        VoteValue::None => None,
        value => Some(value),
    };

    let response = GuideVoteResponse {
        guide_id: payload.guide_id,
        score: outcome.counters.score,
        upvotes: outcome.counters.upvotes,
        downvotes: outcome.counters.downvotes,
        viewer_vote,
    };

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": response
        })),
    ))
}

/// GET /api/guides
pub async fn list_guides(
    Extension(app_state): Extension<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, VoteError> {
    let params = PaginationParams::from(query);

    let total = db::count_published_guides(&app_state.db).await?;
    let guides = db::list_published_guides(&app_state.db, params.limit, params.skip()).await?;

    Ok((StatusCode::OK, Json(PaginatedResponse::new(guides, total, params))))
}
