//! Role domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type discriminator for ordinary portal-wide roles.
pub const ROLE_TYPE_REGULAR: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub tenant_id: i64,
    /// Unique within the tenant.
    pub role_id: i64,
    /// Unique within the tenant.
    pub name: String,
    /// Tag scoping which roles the login service manages.
    pub subtype: Option<String>,
    pub role_type: i32,
    /// Class metadata reference, copied from an existing role on creation.
    pub class_name_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRole {
    pub tenant_id: i64,
    pub role_id: i64,
    pub name: String,
    pub subtype: Option<String>,
    pub role_type: i32,
    pub class_name_id: i64,
}
