use crate::health::health;
use crate::notifications::{
    admin_notifications_sse, notifications_sse, notifications_ws, report_job_event,
    send_admin_notification, send_notification,
};
use crate::startup::AppState;
use crate::votes::{list_guides, vote_on_guide};
use axum::{
    Router,
    extract::Extension,
    http::{
        HeaderValue, Method, StatusCode,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    response::IntoResponse,
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the application router. `allowed_origin` pins CORS to one origin;
/// without it the request origin is mirrored.
pub fn build_router(app_state: AppState, allowed_origin: Option<HeaderValue>) -> Router {
    let origin = match allowed_origin {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::mirror_request(),
    };

    Router::new()
        .route("/api/health", get(health))
        .route("/api/notifications/socket", get(notifications_sse))
        .route("/api/notifications/admin-socket", get(admin_notifications_sse))
        .route("/api/notifications/ws", get(notifications_ws))
        .route("/api/notifications/send", post(send_notification))
        .route("/api/admin/notifications/send", post(send_admin_notification))
        .route("/api/admin/notifications/jobs", post(report_job_event))
        .route("/api/guides", get(list_guides))
        .route("/api/guides/vote", post(vote_on_guide))
        .fallback(handler_404)
        .layer(Extension(app_state))
        .layer(CookieManagerLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, ACCEPT, AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
