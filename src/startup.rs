use crate::auth::JwtKeys;
use crate::db::DbPool;
use crate::notifications::NotificationHub;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub hub: NotificationHub,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(db: DbPool, jwt_secret: &[u8]) -> Self {
        AppState {
            db,
            hub: NotificationHub::new(),
            jwt: Arc::new(JwtKeys::new(jwt_secret)),
        }
    }
}
