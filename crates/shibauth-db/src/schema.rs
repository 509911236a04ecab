//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! Tenant, user and role ids are stored as ints. Uniqueness that the
//! login flow relies on under concurrency (screen name, email, role id,
//! role name) is enforced here with UNIQUE indexes.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Id counters
-- =======================================================================
DEFINE TABLE id_counter SCHEMAFULL;
DEFINE FIELD current ON TABLE id_counter TYPE int DEFAULT 0;

-- =======================================================================
-- Users (tenant scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user TYPE int;
DEFINE FIELD user_id ON TABLE user TYPE int;
DEFINE FIELD screen_name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD password_reset ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD locale ON TABLE user TYPE string;
DEFINE FIELD male ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD birthday ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_tenant_user_id ON TABLE user \
    COLUMNS tenant_id, user_id UNIQUE;
DEFINE INDEX idx_user_tenant_screen_name ON TABLE user \
    COLUMNS tenant_id, screen_name UNIQUE;
DEFINE INDEX idx_user_tenant_email ON TABLE user \
    COLUMNS tenant_id, email UNIQUE;

-- =======================================================================
-- Roles (tenant scope)
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE role TYPE int;
DEFINE FIELD role_id ON TABLE role TYPE int;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD subtype ON TABLE role TYPE option<string>;
DEFINE FIELD role_type ON TABLE role TYPE int DEFAULT 1;
DEFINE FIELD class_name_id ON TABLE role TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_tenant_role_id ON TABLE role \
    COLUMNS tenant_id, role_id UNIQUE;
DEFINE INDEX idx_role_tenant_name ON TABLE role \
    COLUMNS tenant_id, name UNIQUE;
DEFINE INDEX idx_role_tenant_subtype ON TABLE role \
    COLUMNS tenant_id, subtype;

-- =======================================================================
-- User -> Role assignments (tenant scope)
-- =======================================================================
DEFINE TABLE user_role SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user_role TYPE int;
DEFINE FIELD user_id ON TABLE user_role TYPE int;
DEFINE FIELD role_id ON TABLE user_role TYPE int;
DEFINE FIELD assigned_at ON TABLE user_role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_role_assignment ON TABLE user_role \
    COLUMNS tenant_id, user_id, role_id UNIQUE;

-- =======================================================================
-- SSO settings (one record per tenant)
-- =======================================================================
DEFINE TABLE sso_config SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE sso_config TYPE int;
DEFINE FIELD enabled ON TABLE sso_config TYPE bool DEFAULT false;
DEFINE FIELD auth_type ON TABLE sso_config TYPE option<string>;
DEFINE FIELD auto_create_user ON TABLE sso_config TYPE bool \
    DEFAULT false;
DEFINE FIELD auto_update_user ON TABLE sso_config TYPE bool \
    DEFAULT false;
DEFINE FIELD import_from_directory ON TABLE sso_config TYPE bool \
    DEFAULT false;
DEFINE FIELD auto_assign_roles ON TABLE sso_config TYPE bool \
    DEFAULT false;
DEFINE FIELD role_subtype ON TABLE sso_config TYPE string DEFAULT '';
DEFINE FIELD utf8_reencode_attributes ON TABLE sso_config TYPE bool \
    DEFAULT false;
DEFINE FIELD force_password_reset_on_create ON TABLE sso_config \
    TYPE bool DEFAULT false;
DEFINE FIELD auto_create_missing_roles ON TABLE sso_config TYPE bool \
    DEFAULT false;
DEFINE FIELD updated_at ON TABLE sso_config TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_sso_config_tenant ON TABLE sso_config \
    COLUMNS tenant_id UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}
