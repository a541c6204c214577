use axum::extract::ws::Message;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("client channel closed")]
pub struct ChannelClosed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// text/event-stream response body
    Stream,
    /// WebSocket text messages
    Socket,
}

/// Write half of one connected client.
///
/// Writes never wait on the client; a failed write means the reading side
/// has gone away and the channel is dead for good.
#[derive(Debug, Clone)]
pub enum ClientChannel {
    Stream(mpsc::UnboundedSender<String>),
    Socket(mpsc::UnboundedSender<Message>),
}

impl ClientChannel {
    pub fn stream() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ClientChannel::Stream(tx), rx)
    }

    pub fn socket() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ClientChannel::Socket(tx), rx)
    }

    pub fn transport(&self) -> Transport {
        match self {
            ClientChannel::Stream(_) => Transport::Stream,
            ClientChannel::Socket(_) => Transport::Socket,
        }
    }

    pub fn send_text(&self, frame: String) -> Result<(), ChannelClosed> {
        match self {
            ClientChannel::Stream(tx) => tx.send(frame).map_err(|_| ChannelClosed),
            ClientChannel::Socket(tx) => tx.send(Message::Text(frame)).map_err(|_| ChannelClosed),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            ClientChannel::Stream(tx) => tx.is_closed(),
            ClientChannel::Socket(tx) => tx.is_closed(),
        }
    }

    pub fn same_channel(&self, other: &ClientChannel) -> bool {
        match (self, other) {
            (ClientChannel::Stream(a), ClientChannel::Stream(b)) => a.same_channel(b),
            (ClientChannel::Socket(a), ClientChannel::Socket(b)) => a.same_channel(b),
            _ => false,
        }
    }
}
