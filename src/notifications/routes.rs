use super::hub::{Audience, NotificationHub};
use super::jobs::{JobEvent, notify_job};
use super::models::SendNotificationRequest;
use crate::auth::{AdminUser, Claims};
use crate::error::NotificationError;
use crate::startup::AppState;
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};

/// POST /api/notifications/send
pub async fn send_notification(
    AdminUser(claims): AdminUser,
    Extension(app_state): Extension<AppState>,
    body: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, NotificationError> {
    dispatch(&app_state.hub, Audience::General, &claims, body)
}

/// POST /api/admin/notifications/send
pub async fn send_admin_notification(
    AdminUser(claims): AdminUser,
    Extension(app_state): Extension<AppState>,
    body: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, NotificationError> {
    dispatch(&app_state.hub, Audience::Admin, &claims, body)
}

/// POST /api/admin/notifications/jobs
pub async fn report_job_event(
    AdminUser(claims): AdminUser,
    Extension(app_state): Extension<AppState>,
    body: Result<Json<JobEvent>, JsonRejection>,
) -> Result<impl IntoResponse, NotificationError> {
    let Json(event) = body.map_err(|rejection| {
        NotificationError::InvalidPayload(rejection.body_text())
    })?;

    let payload = notify_job(&app_state.hub, event)?;
    debug!(user_id = %claims.user_id, notification_id = %payload.id, "job event relayed");

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": payload
        })),
    ))
}

fn dispatch(
    hub: &NotificationHub,
    audience: Audience,
    sender: &Claims,
    body: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), NotificationError> {
    let Json(request) = body.map_err(|rejection| {
        NotificationError::InvalidPayload(rejection.body_text())
    })?;

    let payload = request.into_payload().inspect_err(|err| {
        warn!(user_id = %sender.user_id, "rejected notification: {err}");
    })?;

    hub.broadcast(audience, &payload)?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": payload
        })),
    ))
}
