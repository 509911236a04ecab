//! Auto-login service, the per-request entry point.

use serde::Deserialize;
use shibauth_core::error::ShibauthError;
use shibauth_core::models::session::SessionAttributes;
use shibauth_core::models::tenant::TenantSsoConfig;
use shibauth_core::repository::{
    DirectoryImporter, NoDirectory, RoleRepository, TenantConfigRepository, UserRepository,
};
use tracing::{debug, error, instrument};

use crate::config::LoginConfig;
use crate::error::{LoginError, LoginFailure};
use crate::resolver::{IdentityResolver, Resolution};

/// Input for one auto-login attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub tenant_id: i64,
    #[serde(default)]
    pub attributes: SessionAttributes,
    /// Redirect target configured for failed auto-logins. When set,
    /// failures are logged and the service abstains instead of erroring.
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Credential handed back to the portal to log the user in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user_id: i64,
    pub password_hash: String,
    pub remember_me: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Credential(Credential),
    /// The service abstains; regular authentication proceeds.
    NoOpinion,
}

/// Auto-login service.
///
/// Generic over repository implementations so that the login layer
/// has no dependency on the database crate.
pub struct AutoLoginService<U, R, C, D = NoDirectory>
where
    U: UserRepository,
    R: RoleRepository,
    C: TenantConfigRepository,
    D: DirectoryImporter,
{
    user_repo: U,
    role_repo: R,
    config_repo: C,
    directory: D,
    config: LoginConfig,
}

impl<U, R, C> AutoLoginService<U, R, C, NoDirectory>
where
    U: UserRepository,
    R: RoleRepository,
    C: TenantConfigRepository,
{
    pub fn new(user_repo: U, role_repo: R, config_repo: C, config: LoginConfig) -> Self {
        Self::with_directory(user_repo, role_repo, config_repo, NoDirectory, config)
    }
}

impl<U, R, C, D> AutoLoginService<U, R, C, D>
where
    U: UserRepository,
    R: RoleRepository,
    C: TenantConfigRepository,
    D: DirectoryImporter,
{
    pub fn with_directory(
        user_repo: U,
        role_repo: R,
        config_repo: C,
        directory: D,
        config: LoginConfig,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            config_repo,
            directory,
            config,
        }
    }

    /// Attempt to log the session in.
    ///
    /// Returns a credential for a resolved account and `NoOpinion` when the
    /// tenant has SSO disabled, no account matches or the attributes are
    /// incomplete. Decoding and store failures are errors unless the
    /// request carries a redirect.
    #[instrument(skip(self, request), fields(tenant_id = request.tenant_id))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, LoginFailure> {
        match self.authenticate(&request).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let failure = LoginFailure::from(e);
                error!(kind = %failure.kind, error = %failure.source, "Auto-login failed");
                match request.redirect {
                    Some(redirect) => {
                        debug!(redirect = %redirect, "Abstaining, redirect configured");
                        Ok(LoginOutcome::NoOpinion)
                    }
                    None => Err(failure),
                }
            }
        }
    }

    async fn authenticate(&self, request: &LoginRequest) -> Result<LoginOutcome, LoginError> {
        let tenant_config = self.tenant_config(request.tenant_id).await?;

        let resolution = IdentityResolver::new(
            &self.user_repo,
            &self.role_repo,
            &self.directory,
            &self.config,
        )
        .resolve(&tenant_config, &request.attributes)
        .await?;

        Ok(match resolution {
            Resolution::Resolved(user) => LoginOutcome::Credential(Credential {
                user_id: user.user_id,
                password_hash: user.password_hash,
                remember_me: true,
            }),
            Resolution::Disabled => {
                debug!("SSO disabled for tenant");
                LoginOutcome::NoOpinion
            }
            Resolution::NotFound => LoginOutcome::NoOpinion,
            Resolution::MissingField(field) => {
                debug!(field = %field, "Session lacks a required attribute");
                LoginOutcome::NoOpinion
            }
        })
    }

    /// Stored SSO settings, or the disabled default for tenants without.
    async fn tenant_config(&self, tenant_id: i64) -> Result<TenantSsoConfig, LoginError> {
        match self.config_repo.get(tenant_id).await {
            Ok(config) => Ok(config),
            Err(ShibauthError::NotFound { .. }) => Ok(TenantSsoConfig::disabled(tenant_id)),
            Err(e) => Err(e.into()),
        }
    }
}
