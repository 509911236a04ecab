//! SurrealDB implementation of [`TenantConfigRepository`].

use shibauth_core::error::ShibauthResult;
use shibauth_core::models::tenant::{AuthType, TenantSsoConfig};
use shibauth_core::repository::TenantConfigRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::warn;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SsoConfigRow {
    tenant_id: i64,
    enabled: bool,
    auth_type: Option<String>,
    auto_create_user: bool,
    auto_update_user: bool,
    import_from_directory: bool,
    auto_assign_roles: bool,
    role_subtype: String,
    utf8_reencode_attributes: bool,
    force_password_reset_on_create: bool,
    auto_create_missing_roles: bool,
}

impl SsoConfigRow {
    fn into_config(self) -> TenantSsoConfig {
        // An auth type the login flow does not know is stored as-is and
        // read back as unset.
        let auth_type = self.auth_type.and_then(|raw| match raw.parse::<AuthType>() {
            Ok(auth_type) => Some(auth_type),
            Err(e) => {
                warn!(tenant_id = self.tenant_id, error = %e, "Ignoring SSO auth type");
                None
            }
        });

        TenantSsoConfig {
            tenant_id: self.tenant_id,
            enabled: self.enabled,
            auth_type,
            auto_create_user: self.auto_create_user,
            auto_update_user: self.auto_update_user,
            import_from_directory: self.import_from_directory,
            auto_assign_roles: self.auto_assign_roles,
            role_subtype: self.role_subtype,
            utf8_reencode_attributes: self.utf8_reencode_attributes,
            force_password_reset_on_create: self.force_password_reset_on_create,
            auto_create_missing_roles: self.auto_create_missing_roles,
        }
    }
}

/// SurrealDB implementation of the tenant SSO settings repository.
#[derive(Clone)]
pub struct SurrealTenantConfigRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantConfigRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantConfigRepository for SurrealTenantConfigRepository<C> {
    async fn get(&self, tenant_id: i64) -> ShibauthResult<TenantSsoConfig> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('sso_config', $key)")
            .bind(("key", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SsoConfigRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "sso_config".into(),
            id: tenant_id.to_string(),
        })?;

        Ok(row.into_config())
    }

    async fn upsert(&self, config: TenantSsoConfig) -> ShibauthResult<TenantSsoConfig> {
        let result = self
            .db
            .query(
                "UPSERT type::record('sso_config', $key) SET \
                 tenant_id = $tenant_id, enabled = $enabled, \
                 auth_type = $auth_type, \
                 auto_create_user = $auto_create_user, \
                 auto_update_user = $auto_update_user, \
                 import_from_directory = $import_from_directory, \
                 auto_assign_roles = $auto_assign_roles, \
                 role_subtype = $role_subtype, \
                 utf8_reencode_attributes = $utf8_reencode_attributes, \
                 force_password_reset_on_create = $force_password_reset_on_create, \
                 auto_create_missing_roles = $auto_create_missing_roles, \
                 updated_at = time::now()",
            )
            .bind(("key", config.tenant_id.to_string()))
            .bind(("tenant_id", config.tenant_id))
            .bind(("enabled", config.enabled))
            .bind((
                "auth_type",
                config.auth_type.map(|t| t.as_str().to_string()),
            ))
            .bind(("auto_create_user", config.auto_create_user))
            .bind(("auto_update_user", config.auto_update_user))
            .bind(("import_from_directory", config.import_from_directory))
            .bind(("auto_assign_roles", config.auto_assign_roles))
            .bind(("role_subtype", config.role_subtype))
            .bind(("utf8_reencode_attributes", config.utf8_reencode_attributes))
            .bind((
                "force_password_reset_on_create",
                config.force_password_reset_on_create,
            ))
            .bind(("auto_create_missing_roles", config.auto_create_missing_roles))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::rejected("sso_config", e))?;

        let rows: Vec<SsoConfigRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "sso_config".into(),
            id: config.tenant_id.to_string(),
        })?;

        Ok(row.into_config())
    }
}
