//! shibauth Login: resolves SSO session attributes into a local account.
//!
//! The flow is split into small components that borrow the injected
//! repositories:
//! - [`attributes`]: reading and decoding asserted attributes
//! - [`provisioning`]: creating accounts on first login
//! - [`profile`]: keeping names in step with the identity provider
//! - [`roles`]: reconciling managed roles against the affiliation list
//! - [`resolver`]: lookup and classification of the outcome
//! - [`service`]: the per-request entry point

pub mod attributes;
pub mod config;
pub mod error;
pub mod profile;
pub mod provisioning;
pub mod resolver;
pub mod roles;
pub mod service;

pub use config::LoginConfig;
pub use error::{FailureKind, LoginError, LoginFailure};
pub use provisioning::{Provisioning, RequiredField};
pub use resolver::{IdentityResolver, Resolution};
pub use roles::{RoleSyncReport, RoleSynchronizer};
pub use service::{AutoLoginService, Credential, LoginOutcome, LoginRequest};
