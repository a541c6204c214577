pub mod channel;
pub mod hub;
pub mod jobs;
pub mod models;
pub mod registry;

mod routes;
mod socket;
mod sse;

pub use channel::{ChannelClosed, ClientChannel, Transport};
pub use hub::{Audience, BroadcastReport, NotificationHub};
pub use jobs::{JobEvent, JobQueue, UnknownJobQueue, notify_job};
pub use models::*;
pub use registry::ConnectionRegistry;

pub use routes::{report_job_event, send_admin_notification, send_notification};
pub use socket::notifications_ws;
pub use sse::{admin_notifications_sse, notifications_sse};
