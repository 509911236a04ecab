//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and tenant-scoped: every lookup
//! takes the `tenant_id` it is confined to. A missing entity is reported
//! as [`ShibauthError::NotFound`](crate::error::ShibauthError::NotFound).

use crate::error::ShibauthResult;
use crate::models::role::{NewRole, Role};
use crate::models::tenant::TenantSsoConfig;
use crate::models::user::{CreateUser, UpdateUser, User};

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = ShibauthResult<User>> + Send;
    fn get_by_id(
        &self,
        tenant_id: i64,
        user_id: i64,
    ) -> impl Future<Output = ShibauthResult<User>> + Send;
    fn get_by_screen_name(
        &self,
        tenant_id: i64,
        screen_name: &str,
    ) -> impl Future<Output = ShibauthResult<User>> + Send;
    fn get_by_email(
        &self,
        tenant_id: i64,
        email: &str,
    ) -> impl Future<Output = ShibauthResult<User>> + Send;
    fn update(
        &self,
        tenant_id: i64,
        user_id: i64,
        input: UpdateUser,
    ) -> impl Future<Output = ShibauthResult<User>> + Send;
}

pub trait RoleRepository: Send + Sync {
    /// Persist a role with a caller-chosen id. Fails with
    /// `AlreadyExists` when the id or name is taken in the tenant.
    fn create(&self, input: NewRole) -> impl Future<Output = ShibauthResult<Role>> + Send;
    fn get_by_name(
        &self,
        tenant_id: i64,
        name: &str,
    ) -> impl Future<Output = ShibauthResult<Role>> + Send;
    /// All roles of the tenant.
    fn list(&self, tenant_id: i64) -> impl Future<Output = ShibauthResult<Vec<Role>>> + Send;
    fn list_by_subtype(
        &self,
        tenant_id: i64,
        subtype: &str,
    ) -> impl Future<Output = ShibauthResult<Vec<Role>>> + Send;

    /// Assign roles to a user. Already-held roles are left as they are.
    fn assign_to_user(
        &self,
        tenant_id: i64,
        user_id: i64,
        role_ids: &[i64],
    ) -> impl Future<Output = ShibauthResult<()>> + Send;

    /// Remove role assignments from a user. Roles not held are ignored.
    fn unassign_from_user(
        &self,
        tenant_id: i64,
        user_id: i64,
        role_ids: &[i64],
    ) -> impl Future<Output = ShibauthResult<()>> + Send;

    fn get_user_roles(
        &self,
        tenant_id: i64,
        user_id: i64,
    ) -> impl Future<Output = ShibauthResult<Vec<Role>>> + Send;
}

pub trait TenantConfigRepository: Send + Sync {
    fn get(&self, tenant_id: i64) -> impl Future<Output = ShibauthResult<TenantSsoConfig>> + Send;
    fn upsert(
        &self,
        config: TenantSsoConfig,
    ) -> impl Future<Output = ShibauthResult<TenantSsoConfig>> + Send;
}

/// Imports an account from an external directory (e.g. LDAP) by login.
pub trait DirectoryImporter: Send + Sync {
    /// `Ok(None)` when the directory has no such entry.
    fn import_by_login(
        &self,
        tenant_id: i64,
        login: &str,
    ) -> impl Future<Output = ShibauthResult<Option<User>>> + Send;
}

/// Importer for deployments without a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDirectory;

impl DirectoryImporter for NoDirectory {
    async fn import_by_login(&self, _tenant_id: i64, _login: &str) -> ShibauthResult<Option<User>> {
        Ok(None)
    }
}
