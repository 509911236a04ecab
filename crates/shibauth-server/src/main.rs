//! shibauth: resolves one SSO login.
//!
//! Reads a login request as JSON from stdin, e.g.
//! `{"tenant_id": 10157, "attributes": {"login": "jdoe"}}`, runs it through
//! the auto-login service against SurrealDB and prints the outcome as JSON.

use std::process::ExitCode;

use serde_json::json;
use shibauth_db::repository::{
    SurrealRoleRepository, SurrealTenantConfigRepository, SurrealUserRepository,
};
use shibauth_db::{DbConfig, DbManager};
use shibauth_login::config::LoginConfig;
use shibauth_login::service::{AutoLoginService, LoginOutcome, LoginRequest};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shibauth=info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "shibauth failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BoxError> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let request: LoginRequest = serde_json::from_str(&input)?;

    let db = DbManager::connect(&DbConfig::from_env()).await?;
    let client = db.client().clone();

    let service = AutoLoginService::new(
        SurrealUserRepository::new(client.clone()),
        SurrealRoleRepository::new(client.clone()),
        SurrealTenantConfigRepository::new(client),
        LoginConfig::default(),
    );

    let output = match service.login(request).await? {
        LoginOutcome::Credential(credential) => json!({
            "outcome": "credential",
            "user_id": credential.user_id,
            "remember_me": credential.remember_me,
        }),
        LoginOutcome::NoOpinion => json!({ "outcome": "no_opinion" }),
    };
    println!("{output}");

    Ok(())
}
