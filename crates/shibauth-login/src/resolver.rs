//! Resolution of an asserted identity into a local account.

use shibauth_core::error::{ShibauthError, ShibauthResult};
use shibauth_core::models::session::{ATTR_LOGIN, AttributeSource};
use shibauth_core::models::tenant::{AuthType, TenantSsoConfig};
use shibauth_core::models::user::User;
use shibauth_core::repository::{DirectoryImporter, RoleRepository, UserRepository};
use tracing::{debug, info, warn};

use crate::attributes::extract_non_blank;
use crate::config::LoginConfig;
use crate::error::LoginError;
use crate::profile::ProfileUpdater;
use crate::provisioning::{Provisioning, RequiredField, UserProvisioner};
use crate::roles::RoleSynchronizer;

/// Outcome of resolving one session. Only `Resolved` establishes an
/// identity; every other variant means the login service abstains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(User),
    NotFound,
    Disabled,
    MissingField(RequiredField),
}

pub struct IdentityResolver<'a, U, R, D>
where
    U: UserRepository,
    R: RoleRepository,
    D: DirectoryImporter,
{
    users: &'a U,
    roles: &'a R,
    directory: &'a D,
    login_config: &'a LoginConfig,
}

impl<'a, U, R, D> IdentityResolver<'a, U, R, D>
where
    U: UserRepository,
    R: RoleRepository,
    D: DirectoryImporter,
{
    pub fn new(users: &'a U, roles: &'a R, directory: &'a D, login_config: &'a LoginConfig) -> Self {
        Self {
            users,
            roles,
            directory,
            login_config,
        }
    }

    /// Find, update or create the account behind `session`, then bring its
    /// roles in line with the asserted affiliation.
    ///
    /// Role synchronization never affects the result: its failures are
    /// logged and dropped.
    pub async fn resolve<S>(
        &self,
        config: &TenantSsoConfig,
        session: &S,
    ) -> Result<Resolution, LoginError>
    where
        S: AttributeSource + Sync + ?Sized,
    {
        if !config.enabled {
            return Ok(Resolution::Disabled);
        }

        let Some(login) = extract_non_blank(config, session, ATTR_LOGIN)? else {
            debug!(tenant_id = config.tenant_id, "No login attribute in session");
            return Ok(Resolution::NotFound);
        };

        let user = match self.find(config, &login).await? {
            Some(user) => {
                debug!(tenant_id = config.tenant_id, user_id = user.user_id, "Found user");
                if config.auto_update_user {
                    ProfileUpdater::new(self.users)
                        .reconcile(config, user, session)
                        .await?
                } else {
                    user
                }
            }
            None => {
                info!(tenant_id = config.tenant_id, login = %login, "User not found");
                match self.obtain(config, &login, session).await? {
                    Resolution::Resolved(user) => user,
                    other => return Ok(other),
                }
            }
        };

        if let Err(e) = RoleSynchronizer::new(self.roles)
            .sync(config, &user, session)
            .await
        {
            warn!(
                tenant_id = user.tenant_id,
                user_id = user.user_id,
                error = %e,
                "Exception while updating user roles from session"
            );
        }

        Ok(Resolution::Resolved(user))
    }

    /// Local lookup by the configured auth type. An unset auth type finds
    /// nobody.
    async fn find(&self, config: &TenantSsoConfig, login: &str) -> Result<Option<User>, LoginError> {
        let lookup: ShibauthResult<User> = match config.auth_type {
            Some(AuthType::ScreenName) => self.users.get_by_screen_name(config.tenant_id, login).await,
            Some(AuthType::EmailAddress) => self.users.get_by_email(config.tenant_id, login).await,
            None => {
                debug!(tenant_id = config.tenant_id, "No auth type configured");
                return Ok(None);
            }
        };

        match lookup {
            Ok(user) => Ok(Some(user)),
            Err(ShibauthError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Provision or import an account the tenant does not have yet.
    async fn obtain<S>(
        &self,
        config: &TenantSsoConfig,
        login: &str,
        session: &S,
    ) -> Result<Resolution, LoginError>
    where
        S: AttributeSource + Sync + ?Sized,
    {
        if config.auto_create_user {
            info!(tenant_id = config.tenant_id, "Importing user from session");
            return match UserProvisioner::new(self.users, self.login_config)
                .create_from_attributes(config, session)
                .await?
            {
                Provisioning::Created(user) => Ok(Resolution::Resolved(user)),
                Provisioning::MissingField(field) => Ok(Resolution::MissingField(field)),
            };
        }

        if config.import_from_directory {
            info!(tenant_id = config.tenant_id, "Importing user from directory");
            return Ok(
                match self.directory.import_by_login(config.tenant_id, login).await? {
                    Some(user) => Resolution::Resolved(user),
                    None => Resolution::NotFound,
                },
            );
        }

        Ok(Resolution::NotFound)
    }
}
