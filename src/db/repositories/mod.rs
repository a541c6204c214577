pub mod guide_repository;
pub mod vote_repository;

pub use guide_repository::*;
pub use vote_repository::*;
