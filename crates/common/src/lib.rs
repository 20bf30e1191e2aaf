//! Shared identifier types used across the order tracking crates.

pub mod types;

pub use types::{OrderId, UserId};
