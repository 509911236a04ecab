//! Login service configuration.

use chrono::NaiveDate;

/// Account-creation policy applied to every provisioned user.
#[derive(Debug, Clone)]
pub struct LoginConfig {
    /// Locale of new accounts (default: `de_DE`).
    pub default_locale: String,
    /// Placeholder birthday, the identity provider asserts none
    /// (default: 1970-01-01).
    pub placeholder_birthday: NaiveDate,
    pub male: bool,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            default_locale: "de_DE".into(),
            placeholder_birthday: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
            male: true,
        }
    }
}
