pub mod connection;
pub mod models;
pub mod repositories;

pub use connection::{DbPool, init_db, spawn_pool_health_check};
pub use models::*;
pub use repositories::*;
