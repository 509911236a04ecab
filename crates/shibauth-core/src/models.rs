//! Domain models for shibauth.
//!
//! These are the core types shared across all crates.

pub mod role;
pub mod session;
pub mod tenant;
pub mod user;
