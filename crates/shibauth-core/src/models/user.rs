//! Local user account model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub tenant_id: i64,
    pub user_id: i64,
    pub screen_name: String,
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Forces a password change on the next form-based login.
    pub password_reset: bool,
    pub locale: String,
    pub male: bool,
    pub birthday: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub tenant_id: i64,
    pub screen_name: String,
    /// Left empty to have the store generate an address.
    pub email: String,
    /// Raw password (hashed with Argon2id before storage). Ignored when
    /// `auto_password` is set.
    pub password: Option<String>,
    /// Store generates a random password.
    pub auto_password: bool,
    /// Store derives the screen name from the user id.
    pub auto_screen_name: bool,
    /// Require a password change on first portal login.
    pub password_reset: bool,
    pub first_name: String,
    pub last_name: String,
    pub locale: String,
    pub male: bool,
    pub birthday: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_reset: Option<bool>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.password_reset.is_none()
    }
}
