//! Keeps an existing account's names in step with the identity provider.

use shibauth_core::models::session::{ATTR_FIRST_NAME, ATTR_SURNAME, AttributeSource};
use shibauth_core::models::tenant::TenantSsoConfig;
use shibauth_core::models::user::{UpdateUser, User};
use shibauth_core::repository::UserRepository;
use tracing::info;

use crate::attributes::{extract_non_blank, truncate};
use crate::error::LoginError;

pub struct ProfileUpdater<'a, U: UserRepository> {
    users: &'a U,
}

impl<'a, U: UserRepository> ProfileUpdater<'a, U> {
    pub fn new(users: &'a U) -> Self {
        Self { users }
    }

    /// Overwrite first and last name with the asserted values where they
    /// differ. Absent or blank attributes leave the stored value alone,
    /// and nothing is written when no field changed.
    pub async fn reconcile<S>(
        &self,
        config: &TenantSsoConfig,
        user: User,
        session: &S,
    ) -> Result<User, LoginError>
    where
        S: AttributeSource + Sync + ?Sized,
    {
        let mut changes = UpdateUser::default();

        if let Some(first_name) = Self::asserted(config, session, ATTR_FIRST_NAME)?
            .filter(|v| *v != user.first_name)
        {
            info!(
                user_id = user.user_id,
                screen_name = %user.screen_name,
                from = %user.first_name,
                to = %first_name,
                "Updating first name"
            );
            changes.first_name = Some(first_name);
        }

        if let Some(last_name) = Self::asserted(config, session, ATTR_SURNAME)?
            .filter(|v| *v != user.last_name)
        {
            info!(
                user_id = user.user_id,
                screen_name = %user.screen_name,
                from = %user.last_name,
                to = %last_name,
                "Updating last name"
            );
            changes.last_name = Some(last_name);
        }

        if changes.is_empty() {
            return Ok(user);
        }

        Ok(self
            .users
            .update(user.tenant_id, user.user_id, changes)
            .await?)
    }

    fn asserted<S>(
        config: &TenantSsoConfig,
        session: &S,
        key: &str,
    ) -> Result<Option<String>, LoginError>
    where
        S: AttributeSource + ?Sized,
    {
        Ok(extract_non_blank(config, session, key)?.map(|v| truncate(&v)))
    }
}
