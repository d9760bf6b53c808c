//! Routevault - REST backend for users, submitted routes and favorite routes

pub mod config;
pub mod error;
pub mod types;

pub mod auth;
pub mod store;
pub mod api;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
