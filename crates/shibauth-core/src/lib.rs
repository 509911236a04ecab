//! shibauth core: domain models, error taxonomy and the repository
//! traits every other crate is written against.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{ShibauthError, ShibauthResult};
