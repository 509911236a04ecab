//! Per-tenant SSO policy.
//!
//! Every branch of the login flow is gated by one of these flags. The
//! login service only ever reads them; they are owned by whoever manages
//! tenant configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How an asserted login is matched against local accounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthType {
    ScreenName,
    EmailAddress,
}

impl AuthType {
    /// Portal configuration constant for this auth type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::ScreenName => "screenName",
            AuthType::EmailAddress => "emailAddress",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAuthType(pub String);

impl fmt::Display for UnknownAuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown auth type: {}", self.0)
    }
}

impl std::error::Error for UnknownAuthType {}

impl FromStr for AuthType {
    type Err = UnknownAuthType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "screenName" => Ok(AuthType::ScreenName),
            "emailAddress" => Ok(AuthType::EmailAddress),
            other => Err(UnknownAuthType(other.to_string())),
        }
    }
}

/// SSO settings for one tenant.
///
/// `Default` is the fully disabled configuration, which is also what a
/// tenant without stored settings gets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TenantSsoConfig {
    pub tenant_id: i64,
    /// Master switch. When off the login service abstains.
    pub enabled: bool,
    /// `None` when unset or unrecognized; lookups then find nobody.
    pub auth_type: Option<AuthType>,
    pub auto_create_user: bool,
    pub auto_update_user: bool,
    /// Fall back to the directory importer when no local user matches.
    pub import_from_directory: bool,
    pub auto_assign_roles: bool,
    /// Subtype tag of the roles under automatic (un)assignment.
    pub role_subtype: String,
    /// Attribute values arrive as ISO-8859-1 decoded UTF-8 and must be
    /// re-encoded.
    pub utf8_reencode_attributes: bool,
    pub force_password_reset_on_create: bool,
    pub auto_create_missing_roles: bool,
}

impl TenantSsoConfig {
    pub fn disabled(tenant_id: i64) -> Self {
        Self {
            tenant_id,
            ..Default::default()
        }
    }

    /// The configured subtype, or `None` when blank.
    pub fn managed_subtype(&self) -> Option<&str> {
        let subtype = self.role_subtype.trim();
        (!subtype.is_empty()).then_some(subtype)
    }
}
