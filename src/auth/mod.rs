//! Credentials: password hashing and signed tokens

pub mod password;
mod token;

pub use token::{Claims, TokenIssuer};
