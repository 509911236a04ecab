//! Role synchronization against the asserted affiliation list.
//!
//! Only roles carrying the tenant's configured subtype are managed: they
//! are unassigned when no longer asserted. Asserted roles are assigned
//! whatever their subtype. Roles named in the affiliation but unknown to
//! the tenant can be created on the fly.

use std::collections::HashSet;

use shibauth_core::error::ShibauthError;
use shibauth_core::models::role::{NewRole, ROLE_TYPE_REGULAR, Role};
use shibauth_core::models::session::{ATTR_AFFILIATION, AttributeSource};
use shibauth_core::models::tenant::TenantSsoConfig;
use shibauth_core::models::user::User;
use shibauth_core::repository::RoleRepository;
use tracing::{debug, info, warn};

use crate::attributes::{extract, split_affiliation};
use crate::error::LoginError;

/// What a single synchronization did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSyncReport {
    /// Role assignment is switched off for the tenant.
    pub skipped: bool,
    /// Ids of all asserted roles, in affiliation order.
    pub assigned: Vec<i64>,
    /// Ids of managed roles taken away.
    pub unassigned: Vec<i64>,
    /// Roles created during this sync.
    pub created: Vec<Role>,
    /// Affiliation names that could not be resolved to a role.
    pub skipped_names: Vec<String>,
}

pub struct RoleSynchronizer<'a, R: RoleRepository> {
    roles: &'a R,
}

impl<'a, R: RoleRepository> RoleSynchronizer<'a, R> {
    pub fn new(roles: &'a R) -> Self {
        Self { roles }
    }

    /// Make the user's managed roles equal the asserted affiliation.
    pub async fn sync<S>(
        &self,
        config: &TenantSsoConfig,
        user: &User,
        session: &S,
    ) -> Result<RoleSyncReport, LoginError>
    where
        S: AttributeSource + Sync + ?Sized,
    {
        if !config.auto_assign_roles {
            return Ok(RoleSyncReport {
                skipped: true,
                ..Default::default()
            });
        }

        let names = extract(config, session, ATTR_AFFILIATION)?
            .map(|value| split_affiliation(&value))
            .unwrap_or_default();

        let mut report = RoleSyncReport::default();
        let mut seen = HashSet::new();
        let mut desired = Vec::new();

        for name in names {
            if !seen.insert(name.clone()) {
                continue;
            }
            match self.resolve(config, &name, &mut report).await {
                Some(role) => {
                    if !desired.contains(&role.role_id) {
                        desired.push(role.role_id);
                    }
                }
                None => report.skipped_names.push(name),
            }
        }

        let managed = match config.managed_subtype() {
            Some(subtype) => self.roles.list_by_subtype(user.tenant_id, subtype).await?,
            None => Vec::new(),
        };
        let to_unassign: Vec<i64> = managed
            .iter()
            .map(|role| role.role_id)
            .filter(|id| !desired.contains(id))
            .collect();

        if !to_unassign.is_empty() {
            self.roles
                .unassign_from_user(user.tenant_id, user.user_id, &to_unassign)
                .await?;
        }
        if !desired.is_empty() {
            self.roles
                .assign_to_user(user.tenant_id, user.user_id, &desired)
                .await?;
        }

        info!(
            tenant_id = user.tenant_id,
            user_id = user.user_id,
            screen_name = %user.screen_name,
            roles = ?desired,
            "User has been assigned {} role(s)",
            desired.len()
        );

        report.assigned = desired;
        report.unassigned = to_unassign;
        Ok(report)
    }

    /// Look up a role by name, creating it when the tenant allows. `None`
    /// means the name is skipped for this login.
    async fn resolve(
        &self,
        config: &TenantSsoConfig,
        name: &str,
        report: &mut RoleSyncReport,
    ) -> Option<Role> {
        match self.roles.get_by_name(config.tenant_id, name).await {
            Ok(role) => Some(role),
            Err(ShibauthError::NotFound { .. }) if config.auto_create_missing_roles => {
                match self.create(config, name).await {
                    Ok(role) => {
                        report.created.push(role.clone());
                        Some(role)
                    }
                    Err(e) => {
                        warn!(
                            tenant_id = config.tenant_id,
                            role = name,
                            error = %e,
                            "Failed to create role"
                        );
                        None
                    }
                }
            }
            Err(ShibauthError::NotFound { .. }) => {
                debug!(tenant_id = config.tenant_id, role = name, "Unknown role");
                None
            }
            Err(e) => {
                warn!(
                    tenant_id = config.tenant_id,
                    role = name,
                    error = %e,
                    "Failed to look up role"
                );
                None
            }
        }
    }

    /// Create a regular role with the next free id. The class reference is
    /// copied from the role currently holding the highest id.
    async fn create(&self, config: &TenantSsoConfig, name: &str) -> Result<Role, ShibauthError> {
        let existing = self.roles.list(config.tenant_id).await?;
        let (role_id, class_name_id) = match existing.iter().max_by_key(|role| role.role_id) {
            Some(top) => {
                let next = top.role_id.checked_add(1).ok_or_else(|| {
                    ShibauthError::Validation {
                        message: format!("no role id left after {}", top.role_id),
                    }
                })?;
                (next, top.class_name_id)
            }
            None => (1, 0),
        };

        let role = self
            .roles
            .create(NewRole {
                tenant_id: config.tenant_id,
                role_id,
                name: name.to_string(),
                subtype: config.managed_subtype().map(str::to_string),
                role_type: ROLE_TYPE_REGULAR,
                class_name_id,
            })
            .await?;

        info!(
            tenant_id = config.tenant_id,
            role_id = role.role_id,
            role = %role.name,
            "Created role"
        );

        Ok(role)
    }
}

