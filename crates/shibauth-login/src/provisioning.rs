//! Account creation on first SSO login.

use std::fmt;

use shibauth_core::models::session::{ATTR_FIRST_NAME, ATTR_LOGIN, ATTR_SURNAME, AttributeSource};
use shibauth_core::models::tenant::TenantSsoConfig;
use shibauth_core::models::user::{CreateUser, User};
use shibauth_core::repository::UserRepository;
use tracing::{error, info};

use crate::attributes::{extract_non_blank, truncate};
use crate::config::LoginConfig;
use crate::error::LoginError;

/// An attribute that must be asserted before an account can be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    ScreenName,
    FirstName,
    LastName,
}

impl RequiredField {
    /// The session attribute carrying this field.
    pub fn attribute(&self) -> &'static str {
        match self {
            RequiredField::ScreenName => ATTR_LOGIN,
            RequiredField::FirstName => ATTR_FIRST_NAME,
            RequiredField::LastName => ATTR_SURNAME,
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredField::ScreenName => f.write_str("screen name"),
            RequiredField::FirstName => f.write_str("first name"),
            RequiredField::LastName => f.write_str("last name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioning {
    Created(User),
    /// Nothing was written.
    MissingField(RequiredField),
}

/// Creates local accounts from session attributes.
pub struct UserProvisioner<'a, U: UserRepository> {
    users: &'a U,
    login_config: &'a LoginConfig,
}

impl<'a, U: UserRepository> UserProvisioner<'a, U> {
    pub fn new(users: &'a U, login_config: &'a LoginConfig) -> Self {
        Self {
            users,
            login_config,
        }
    }

    /// Create an account from the asserted login, first name and surname.
    ///
    /// The email address is left for the store to generate; the password
    /// is random and never leaves the store.
    pub async fn create_from_attributes<S>(
        &self,
        config: &TenantSsoConfig,
        session: &S,
    ) -> Result<Provisioning, LoginError>
    where
        S: AttributeSource + Sync + ?Sized,
    {
        let Some(screen_name) = self.required(config, session, RequiredField::ScreenName)? else {
            return Ok(Provisioning::MissingField(RequiredField::ScreenName));
        };
        let Some(first_name) = self.required(config, session, RequiredField::FirstName)? else {
            return Ok(Provisioning::MissingField(RequiredField::FirstName));
        };
        let Some(last_name) = self.required(config, session, RequiredField::LastName)? else {
            return Ok(Provisioning::MissingField(RequiredField::LastName));
        };

        info!(
            tenant_id = config.tenant_id,
            screen_name = %screen_name,
            first_name = %first_name,
            last_name = %last_name,
            "Creating user from session"
        );

        let user = self
            .users
            .create(CreateUser {
                tenant_id: config.tenant_id,
                screen_name,
                email: String::new(),
                password: None,
                auto_password: true,
                auto_screen_name: false,
                password_reset: config.force_password_reset_on_create,
                first_name,
                last_name,
                locale: self.login_config.default_locale.clone(),
                male: self.login_config.male,
                birthday: self.login_config.placeholder_birthday,
            })
            .await?;

        info!(
            tenant_id = user.tenant_id,
            user_id = user.user_id,
            "Created user"
        );

        Ok(Provisioning::Created(user))
    }

    /// Truncated value of a required field, `None` (and logged) when the
    /// attribute is absent or blank.
    fn required<S>(
        &self,
        config: &TenantSsoConfig,
        session: &S,
        field: RequiredField,
    ) -> Result<Option<String>, LoginError>
    where
        S: AttributeSource + ?Sized,
    {
        let value = extract_non_blank(config, session, field.attribute())?;
        if value.is_none() {
            error!(
                tenant_id = config.tenant_id,
                "Cannot create user - missing {field}"
            );
        }
        Ok(value.map(|v| truncate(&v)))
    }
}
