use super::channel::{ChannelClosed, ClientChannel, Transport};
use super::models::{ClientId, NotificationPayload, SocketFrame};
use super::registry::ConnectionRegistry;
use crate::error::NotificationError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Admin,
    General,
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Audience::Admin => f.write_str("admin"),
            Audience::General => f.write_str("general"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub delivered: usize,
    pub pruned: usize,
}

/// A payload serialized once for each transport.
struct EncodedNotification {
    stream: String,
    socket: String,
}

impl EncodedNotification {
    fn encode(payload: &NotificationPayload) -> Result<Self, NotificationError> {
        Ok(EncodedNotification {
            stream: serde_json::to_string(payload)?,
            socket: serde_json::to_string(&SocketFrame::Notification { payload })?,
        })
    }

    fn frame_for(&self, transport: Transport) -> String {
        match transport {
            Transport::Stream => self.stream.clone(),
            Transport::Socket => self.socket.clone(),
        }
    }
}

/// Process-local fan-out over two independent audiences.
#[derive(Clone, Default)]
pub struct NotificationHub {
    admin: ConnectionRegistry,
    general: ConnectionRegistry,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self, audience: Audience) -> &ConnectionRegistry {
        match audience {
            Audience::Admin => &self.admin,
            Audience::General => &self.general,
        }
    }

    pub fn register(&self, audience: Audience, client_id: ClientId, channel: ClientChannel) {
        self.registry(audience).register(client_id, channel);
        debug!(%client_id, %audience, "notification client registered");
    }

    pub fn unregister(&self, audience: Audience, client_id: &ClientId) {
        if self.registry(audience).unregister(client_id) {
            debug!(%client_id, %audience, "notification client unregistered");
        }
    }

    pub fn connection_count(&self, audience: Audience) -> usize {
        self.registry(audience).len()
    }

    /// Delivers `payload` to every client registered in `audience` when the
    /// call starts.
    ///
    /// A client whose channel is closed is dropped from the registry and the
    /// loop moves on; only encoding the payload can fail the call.
    pub fn broadcast(
        &self,
        audience: Audience,
        payload: &NotificationPayload,
    ) -> Result<BroadcastReport, NotificationError> {
        let encoded = EncodedNotification::encode(payload)?;
        let registry = self.registry(audience);
        let snapshot = registry.snapshot();

        let mut report = BroadcastReport {
            attempted: snapshot.len(),
            ..Default::default()
        };

        for (client_id, channel) in snapshot {
            let sent = if channel.is_closed() {
                Err(ChannelClosed)
            } else {
                channel.send_text(encoded.frame_for(channel.transport()))
            };

            match sent {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(%client_id, %audience, "{err}, dropping client");
                    registry.unregister_channel(&client_id, &channel);
                    report.pruned += 1;
                }
            }
        }

        info!(
            notification_id = %payload.id,
            %audience,
            attempted = report.attempted,
            delivered = report.delivered,
            pruned = report.pruned,
            "notification broadcast"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::models::SendNotificationRequest;
    use axum::extract::ws::Message;
    use uuid::Uuid;

    fn payload(title: &str, message: &str) -> NotificationPayload {
        SendNotificationRequest {
            title: title.to_string(),
            message: message.to_string(),
            variant: None,
        }
        .into_payload()
        .unwrap()
    }

    #[test]
    fn unregistered_client_misses_later_broadcasts() {
        let hub = NotificationHub::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (chan_a, mut rx_a) = ClientChannel::stream();
        let (chan_b, mut rx_b) = ClientChannel::stream();
        hub.register(Audience::General, a, chan_a);
        hub.register(Audience::General, b, chan_b);

        let report = hub.broadcast(Audience::General, &payload("T", "M")).unwrap();
        assert_eq!(report.delivered, 2);
        assert!(rx_a.try_recv().unwrap().contains(r#""title":"T""#));
        assert!(rx_b.try_recv().unwrap().contains(r#""title":"T""#));

        hub.unregister(Audience::General, &a);
        hub.broadcast(Audience::General, &payload("T2", "M2")).unwrap();

        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().unwrap().contains(r#""title":"T2""#));
    }

    #[test]
    fn closed_channel_is_pruned_without_affecting_others() {
        let hub = NotificationHub::new();
        let dead = Uuid::new_v4();
        let live = Uuid::new_v4();
        let (dead_chan, dead_rx) = ClientChannel::stream();
        let (live_chan, mut live_rx) = ClientChannel::socket();
        hub.register(Audience::Admin, dead, dead_chan);
        hub.register(Audience::Admin, live, live_chan);
        drop(dead_rx);

        let report = hub.broadcast(Audience::Admin, &payload("T", "M")).unwrap();

        assert_eq!(
            report,
            BroadcastReport {
                attempted: 2,
                delivered: 1,
                pruned: 1
            }
        );
        assert!(!hub.registry(Audience::Admin).contains(&dead));
        assert!(hub.registry(Audience::Admin).contains(&live));
        match live_rx.try_recv().unwrap() {
            Message::Text(text) => {
                let frame: serde_json::Value = serde_json::from_str(&text).unwrap();
                assert_eq!(frame["type"], "notification");
                assert_eq!(frame["payload"]["message"], "M");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn audiences_are_independent() {
        let hub = NotificationHub::new();
        let id = Uuid::new_v4();
        let (admin_chan, mut admin_rx) = ClientChannel::stream();
        hub.register(Audience::Admin, id, admin_chan);

        let report = hub.broadcast(Audience::General, &payload("T", "M")).unwrap();
        assert_eq!(report, BroadcastReport::default());
        assert!(admin_rx.try_recv().is_err());

        hub.unregister(Audience::General, &id);
        assert_eq!(hub.connection_count(Audience::Admin), 1);
    }

    #[test]
    fn stream_frame_is_bare_payload() {
        let hub = NotificationHub::new();
        let (chan, mut rx) = ClientChannel::stream();
        hub.register(Audience::General, Uuid::new_v4(), chan);

        let sent = payload("Patch notes", "New items");
        hub.broadcast(Audience::General, &sent).unwrap();

        let received: NotificationPayload = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(received, sent);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn registry_churn_during_broadcasts() {
        let hub = NotificationHub::new();

        let mut stable = Vec::new();
        for _ in 0..8 {
            let id = Uuid::new_v4();
            let (chan, rx) = ClientChannel::stream();
            hub.register(Audience::General, id, chan);
            stable.push((id, rx));
        }
        let reused = Uuid::new_v4();

        let churn = {
            let hub = hub.clone();
            tokio::spawn(async move {
                let mut reused_rx = None;
                for round in 0..500 {
                    let transient = Uuid::new_v4();
                    let (chan, rx) = ClientChannel::stream();
                    hub.register(Audience::General, transient, chan);
                    if round % 2 == 0 {
                        drop(rx);
                    }

                    // a dead channel immediately replaced by a live one under the same id
                    let (dead, dead_rx) = ClientChannel::socket();
                    hub.register(Audience::General, reused, dead);
                    drop(dead_rx);
                    let (live, live_rx) = ClientChannel::socket();
                    hub.register(Audience::General, reused, live);
                    reused_rx = Some(live_rx);

                    tokio::task::yield_now().await;
                    hub.unregister(Audience::General, &transient);
                }
                reused_rx
            })
        };

        let broadcaster = {
            let hub = hub.clone();
            tokio::spawn(async move {
                let mut reports = Vec::new();
                for i in 0..200 {
                    let report = hub
                        .broadcast(Audience::General, &payload(&format!("T{i}"), "M"))
                        .unwrap();
                    reports.push(report);
                    tokio::task::yield_now().await;
                }
                reports
            })
        };

        let reused_rx = churn.await.unwrap();
        let reports = broadcaster.await.unwrap();

        for report in &reports {
            assert_eq!(report.attempted, report.delivered + report.pruned);
            assert!(report.delivered >= stable.len());
        }

        let registry = hub.registry(Audience::General);
        assert!(registry.contains(&reused), "live re-registration was evicted");
        assert_eq!(registry.len(), stable.len() + 1);
        for (id, rx) in &mut stable {
            assert!(registry.contains(id));
            let mut received = 0;
            while rx.try_recv().is_ok() {
                received += 1;
            }
            assert_eq!(received, reports.len());
        }

        // the surviving channel is the live one
        drop(reused_rx);
        let report = hub.broadcast(Audience::General, &payload("last", "M")).unwrap();
        assert_eq!(report.pruned, 1);
        assert!(!registry.contains(&reused));
    }
}
