//! Storage layer for users, routes and favorites

mod database;
mod favorites;
mod pool;
mod routes;
mod users;

pub use database::{with_fresh_id, Database};
pub use pool::{DbPool, PoolConfig};
pub use routes::RouteDeletion;
