//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.
//!
//! Accounts created with `auto_password` get a random password that is
//! hashed and never stored or returned. Accounts created without an
//! email address get `<user_id>@no-emailaddress.com`.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, NaiveDate, Utc};
use shibauth_core::error::{ShibauthError, ShibauthResult};
use shibauth_core::models::user::{CreateUser, UpdateUser, User};
use shibauth_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;

use crate::error::DbError;

/// Domain of generated email addresses.
pub const GENERATED_EMAIL_DOMAIN: &str = "no-emailaddress.com";

const BIRTHDAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, SurrealValue)]
struct UserRow {
    tenant_id: i64,
    user_id: i64,
    screen_name: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    password_reset: bool,
    locale: String,
    male: bool,
    birthday: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let birthday = NaiveDate::parse_from_str(&self.birthday, BIRTHDAY_FORMAT)
            .map_err(|e| DbError::Corrupt(format!("invalid birthday: {e}")))?;
        Ok(User {
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            screen_name: self.screen_name,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            password_reset: self.password_reset,
            locale: self.locale,
            male: self.male,
            birthday,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for the id counter.
#[derive(Debug, SurrealValue)]
struct CounterRow {
    current: i64,
}

fn record_key(tenant_id: i64, user_id: i64) -> String {
    format!("{tenant_id}_{user_id}")
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Hashing(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Hashing(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Random password for accounts that never log in with one
/// (24 bytes → base64url-encoded, no padding).
fn generate_password() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 24] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    /// Next user id from the shared counter. `UPSERT ... +=` is a single
    /// atomic statement, so concurrent creates never share an id.
    async fn next_user_id(&self) -> Result<i64, DbError> {
        let mut result = self
            .db
            .query("UPSERT type::record('id_counter', 'user') SET current += 1")
            .await?;
        let rows: Vec<CounterRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|row| row.current)
            .ok_or_else(|| DbError::Corrupt("user id counter returned no row".into()))
    }

    async fn get_by_field(
        &self,
        tenant_id: i64,
        field: &'static str,
        value: &str,
    ) -> ShibauthResult<User> {
        let query = format!(
            "SELECT * FROM user \
             WHERE tenant_id = $tenant_id AND {field} = $value"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id))
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("{field}={value}"),
        })?;

        Ok(row.try_into_user()?)
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> ShibauthResult<User> {
        if !input.auto_screen_name && input.screen_name.is_empty() {
            return Err(ShibauthError::Validation {
                message: "screen name is required".into(),
            });
        }

        let password = match (input.auto_password, input.password) {
            (true, _) => generate_password(),
            (false, Some(password)) => password,
            (false, None) => {
                return Err(ShibauthError::Validation {
                    message: "password is required unless auto_password is set".into(),
                });
            }
        };
        let password_hash = hash_password(&password, self.pepper.as_deref())?;

        let user_id = self.next_user_id().await?;
        let screen_name = if input.auto_screen_name {
            user_id.to_string()
        } else {
            input.screen_name
        };
        let email = if input.email.is_empty() {
            format!("{user_id}@{GENERATED_EMAIL_DOMAIN}")
        } else {
            input.email
        };

        let result = self
            .db
            .query(
                "CREATE type::record('user', $key) SET \
                 tenant_id = $tenant_id, user_id = $user_id, \
                 screen_name = $screen_name, email = $email, \
                 password_hash = $password_hash, \
                 first_name = $first_name, last_name = $last_name, \
                 password_reset = $password_reset, \
                 locale = $locale, male = $male, birthday = $birthday",
            )
            .bind(("key", record_key(input.tenant_id, user_id)))
            .bind(("tenant_id", input.tenant_id))
            .bind(("user_id", user_id))
            .bind(("screen_name", screen_name))
            .bind(("email", email))
            .bind(("password_hash", password_hash))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("password_reset", input.password_reset))
            .bind(("locale", input.locale))
            .bind(("male", input.male))
            .bind((
                "birthday",
                input.birthday.format(BIRTHDAY_FORMAT).to_string(),
            ))
            .await
            .map_err(DbError::from)?;

        // Duplicate screen names and emails are rejected by UNIQUE indexes.
        let mut result = result.check().map_err(|e| DbError::rejected("user", e))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: user_id.to_string(),
        })?;

        debug!(
            tenant_id = input.tenant_id,
            user_id,
            "Created user"
        );

        Ok(row.try_into_user()?)
    }

    async fn get_by_id(&self, tenant_id: i64, user_id: i64) -> ShibauthResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('user', $key) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("key", record_key(tenant_id, user_id)))
            .bind(("tenant_id", tenant_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: user_id.to_string(),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_screen_name(&self, tenant_id: i64, screen_name: &str) -> ShibauthResult<User> {
        self.get_by_field(tenant_id, "screen_name", screen_name)
            .await
    }

    async fn get_by_email(&self, tenant_id: i64, email: &str) -> ShibauthResult<User> {
        self.get_by_field(tenant_id, "email", email).await
    }

    async fn update(&self, tenant_id: i64, user_id: i64, input: UpdateUser) -> ShibauthResult<User> {
        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.password_reset.is_some() {
            sets.push("password_reset = $password_reset");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $key) SET {} \
             WHERE tenant_id = $tenant_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("key", record_key(tenant_id, user_id)))
            .bind(("tenant_id", tenant_id));

        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(password_reset) = input.password_reset {
            builder = builder.bind(("password_reset", password_reset));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::rejected("user", e))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: user_id.to_string(),
        })?;

        Ok(row.try_into_user()?)
    }
}

/// Verify a password against an Argon2id hash.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, DbError> {
    use argon2::PasswordVerifier;

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| DbError::Hashing(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DbError::Hashing(format!("verify error: {e}"))),
    }
}
