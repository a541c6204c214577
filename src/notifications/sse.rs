use super::channel::ClientChannel;
use super::hub::{Audience, NotificationHub};
use super::models::{ClientId, StreamFrame};
use crate::auth::AdminUser;
use crate::error::NotificationError;
use crate::startup::AppState;
use axum::{
    extract::Extension,
    http::{HeaderName, HeaderValue, header::CACHE_CONTROL},
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use std::{convert::Infallible, time::Duration};
use uuid::Uuid;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Removes the client from its registry when the response body is dropped,
/// which is how axum reports a disconnect.
struct Registration {
    hub: NotificationHub,
    audience: Audience,
    client_id: ClientId,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.hub.unregister(self.audience, &self.client_id);
    }
}

pub async fn admin_notifications_sse(
    AdminUser(claims): AdminUser,
    Extension(app_state): Extension<AppState>,
) -> Result<impl IntoResponse, NotificationError> {
    info!(user_id = %claims.user_id, "admin notification stream opened");
    notification_stream(app_state.hub, Audience::Admin)
}

pub async fn notifications_sse(
    Extension(app_state): Extension<AppState>,
) -> Result<impl IntoResponse, NotificationError> {
    notification_stream(app_state.hub, Audience::General)
}

fn notification_stream(
    hub: NotificationHub,
    audience: Audience,
) -> Result<impl IntoResponse, NotificationError> {
    let client_id = Uuid::new_v4();
    // Encode before registering so a failure leaves the registry untouched.
    let connected = serde_json::to_string(&StreamFrame::Connected { client_id })?;

    let (channel, mut rx) = ClientChannel::stream();
    hub.register(audience, client_id, channel);
    let registration = Registration {
        hub,
        audience,
        client_id,
    };

    let stream = async_stream::stream! {
        let _registration = registration;

        yield Ok::<_, Infallible>(Event::default().data(connected));

        while let Some(frame) = rx.recv().await {
            yield Ok(Event::default().data(frame));
        }
    };

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    );

    Ok((
        [
            (CACHE_CONTROL, HeaderValue::from_static("no-cache, no-transform")),
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        sse,
    ))
}
