//! HTTP API layer

pub(crate) mod error;
mod gate;
mod handlers;
pub(crate) mod routes;

pub use error::{ApiJson, ErrorResponse};
pub use routes::{create_router, ApiDoc, AppState};
