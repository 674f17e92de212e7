//! HTTP endpoint handlers.

pub mod health;
pub mod quality;
pub mod version;
