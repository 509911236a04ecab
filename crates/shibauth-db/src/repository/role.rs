//! SurrealDB implementation of [`RoleRepository`].
//!
//! Assignments live in the `user_role` table keyed by
//! `<tenant>_<user>_<role>`, which makes assigning a held role a no-op.

use chrono::{DateTime, Utc};
use shibauth_core::error::ShibauthResult;
use shibauth_core::models::role::{NewRole, Role};
use shibauth_core::repository::RoleRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RoleRow {
    tenant_id: i64,
    role_id: i64,
    name: String,
    subtype: Option<String>,
    role_type: i64,
    class_name_id: i64,
    created_at: DateTime<Utc>,
}

impl RoleRow {
    fn try_into_role(self) -> Result<Role, DbError> {
        let role_type = i32::try_from(self.role_type)
            .map_err(|e| DbError::Corrupt(format!("invalid role type: {e}")))?;
        Ok(Role {
            tenant_id: self.tenant_id,
            role_id: self.role_id,
            name: self.name,
            subtype: self.subtype,
            role_type,
            class_name_id: self.class_name_id,
            created_at: self.created_at,
        })
    }
}

fn role_key(tenant_id: i64, role_id: i64) -> String {
    format!("{tenant_id}_{role_id}")
}

fn assignment_key(tenant_id: i64, user_id: i64, role_id: i64) -> String {
    format!("{tenant_id}_{user_id}_{role_id}")
}

fn collect_roles(rows: Vec<RoleRow>) -> Result<Vec<Role>, DbError> {
    rows.into_iter()
        .map(RoleRow::try_into_role)
        .collect::<Result<Vec<_>, DbError>>()
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: NewRole) -> ShibauthResult<Role> {
        let key = role_key(input.tenant_id, input.role_id);

        let result = self
            .db
            .query(
                "CREATE type::record('role', $key) SET \
                 tenant_id = $tenant_id, role_id = $role_id, \
                 name = $name, subtype = $subtype, \
                 role_type = $role_type, class_name_id = $class_name_id",
            )
            .bind(("key", key.clone()))
            .bind(("tenant_id", input.tenant_id))
            .bind(("role_id", input.role_id))
            .bind(("name", input.name))
            .bind(("subtype", input.subtype))
            .bind(("role_type", i64::from(input.role_type)))
            .bind(("class_name_id", input.class_name_id))
            .await
            .map_err(DbError::from)?;

        // Duplicates are rejected by the record id or the (tenant_id, name) index.
        let mut result = result.check().map_err(|e| DbError::rejected("role", e))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: key,
        })?;

        Ok(row.try_into_role()?)
    }

    async fn get_by_name(&self, tenant_id: i64, name: &str) -> ShibauthResult<Role> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM role \
                 WHERE tenant_id = $tenant_id AND name = $name",
            )
            .bind(("tenant_id", tenant_id))
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: format!("name={name}"),
        })?;

        Ok(row.try_into_role()?)
    }

    async fn list(&self, tenant_id: i64) -> ShibauthResult<Vec<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM role \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY role_id ASC",
            )
            .bind(("tenant_id", tenant_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect_roles(rows)?)
    }

    async fn list_by_subtype(&self, tenant_id: i64, subtype: &str) -> ShibauthResult<Vec<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM role \
                 WHERE tenant_id = $tenant_id AND subtype = $subtype \
                 ORDER BY role_id ASC",
            )
            .bind(("tenant_id", tenant_id))
            .bind(("subtype", subtype.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect_roles(rows)?)
    }

    async fn assign_to_user(
        &self,
        tenant_id: i64,
        user_id: i64,
        role_ids: &[i64],
    ) -> ShibauthResult<()> {
        for &role_id in role_ids {
            self.db
                .query(
                    "UPSERT type::record('user_role', $key) SET \
                     tenant_id = $tenant_id, user_id = $user_id, \
                     role_id = $role_id",
                )
                .bind(("key", assignment_key(tenant_id, user_id, role_id)))
                .bind(("tenant_id", tenant_id))
                .bind(("user_id", user_id))
                .bind(("role_id", role_id))
                .await
                .map_err(DbError::from)?
                .check()
                .map_err(|e| DbError::rejected("user_role", e))?;
        }

        Ok(())
    }

    async fn unassign_from_user(
        &self,
        tenant_id: i64,
        user_id: i64,
        role_ids: &[i64],
    ) -> ShibauthResult<()> {
        if role_ids.is_empty() {
            return Ok(());
        }

        self.db
            .query(
                "DELETE user_role WHERE \
                 tenant_id = $tenant_id AND user_id = $user_id AND \
                 role_id IN $role_ids",
            )
            .bind(("tenant_id", tenant_id))
            .bind(("user_id", user_id))
            .bind(("role_ids", role_ids.to_vec()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::rejected("user_role", e))?;

        Ok(())
    }

    async fn get_user_roles(&self, tenant_id: i64, user_id: i64) -> ShibauthResult<Vec<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM role \
                 WHERE tenant_id = $tenant_id \
                 AND role_id IN (\
                     SELECT VALUE role_id FROM user_role \
                     WHERE tenant_id = $tenant_id AND user_id = $user_id\
                 ) \
                 ORDER BY role_id ASC",
            )
            .bind(("tenant_id", tenant_id))
            .bind(("user_id", user_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect_roles(rows)?)
    }
}
