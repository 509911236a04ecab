//! SurrealDB repository implementations.

mod role;
mod tenant_config;
mod user;

pub use role::SurrealRoleRepository;
pub use tenant_config::SurrealTenantConfigRepository;
pub use user::{GENERATED_EMAIL_DOMAIN, SurrealUserRepository, verify_password};
