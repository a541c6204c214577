use super::channel::ClientChannel;
use super::models::ClientId;
use dashmap::DashMap;
use std::sync::Arc;

/// Open client channels for one audience, keyed by client id.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    clients: Arc<DashMap<ClientId, ClientChannel>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins for a repeated id.
    pub fn register(&self, client_id: ClientId, channel: ClientChannel) {
        self.clients.insert(client_id, channel);
    }

    /// Returns whether an entry was removed.
    pub fn unregister(&self, client_id: &ClientId) -> bool {
        self.clients.remove(client_id).is_some()
    }

    /// Removes `client_id` only while it still maps to `channel`.
    pub fn unregister_channel(&self, client_id: &ClientId, channel: &ClientChannel) -> bool {
        self.clients
            .remove_if(client_id, |_, current| current.same_channel(channel))
            .is_some()
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.clients.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Copies the current entries so callers can write without holding shard
    /// locks.
    pub fn snapshot(&self) -> Vec<(ClientId, ClientChannel)> {
        self.clients
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}
