use super::channel::ClientChannel;
use super::hub::{Audience, NotificationHub};
use crate::startup::AppState;
use axum::{
    extract::{
        Extension,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

const PING: &str = "ping";
const PONG: &str = "pong";

/// GET /api/notifications/ws
pub async fn notifications_ws(
    Extension(app_state): Extension<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| run_socket(socket, app_state.hub))
}

/// Registers the socket with the general audience and services it until the
/// client goes away.
///
/// A writer task owns the sink and drains the channel queue, so broadcasts
/// never wait on this connection. The read loop only answers `ping`.
async fn run_socket(socket: WebSocket, hub: NotificationHub) {
    let client_id = Uuid::new_v4();
    let (sink, mut inbound) = socket.split();
    let (channel, rx) = ClientChannel::socket();
    let replies = channel.clone();

    hub.register(Audience::General, client_id, channel);

    let writer = tokio::spawn(
        UnboundedReceiverStream::new(rx)
            .map(Ok::<_, axum::Error>)
            .forward(sink),
    );

    while let Some(received) = inbound.next().await {
        match received {
            Ok(Message::Text(text)) if text == PING => {
                if replies.send_text(PONG.to_string()).is_err() {
                    break;
                }
            }
            Ok(Message::Text(text)) => {
                debug!(
                    %client_id,
                    "ignoring text frame: {}",
                    text.chars().take(100).collect::<String>()
                );
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(%client_id, "notification socket read error: {err}");
                break;
            }
        }
    }

    hub.unregister(Audience::General, &client_id);
    drop(replies);
    writer.abort();
}
