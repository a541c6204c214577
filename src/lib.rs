#[macro_use]
extern crate tracing;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod notifications;
pub mod pagination;
pub mod routes;
pub mod startup;
pub mod votes;
