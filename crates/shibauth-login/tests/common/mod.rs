//! In-memory repository fakes for the login integration tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use shibauth_core::error::{ShibauthError, ShibauthResult};
use shibauth_core::models::role::{NewRole, ROLE_TYPE_REGULAR, Role};
use shibauth_core::models::session::SessionAttributes;
use shibauth_core::models::tenant::{AuthType, TenantSsoConfig};
use shibauth_core::models::user::{CreateUser, UpdateUser, User};
use shibauth_core::repository::{
    DirectoryImporter, RoleRepository, TenantConfigRepository, UserRepository,
};

pub const TENANT: i64 = 10_157;

pub fn session(pairs: &[(&str, &str)]) -> SessionAttributes {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

/// Enabled tenant matching by screen name, everything else off.
pub fn sso_config() -> TenantSsoConfig {
    TenantSsoConfig {
        tenant_id: TENANT,
        enabled: true,
        auth_type: Some(AuthType::ScreenName),
        ..Default::default()
    }
}

pub fn user(user_id: i64, screen_name: &str) -> User {
    let now = Utc::now();
    User {
        tenant_id: TENANT,
        user_id,
        screen_name: screen_name.into(),
        email: format!("{screen_name}@example.org"),
        password_hash: format!("$argon2id$stored-{user_id}"),
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        password_reset: false,
        locale: "en_US".into(),
        male: false,
        birthday: NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
        created_at: now,
        updated_at: now,
    }
}

pub fn role(role_id: i64, name: &str, subtype: Option<&str>) -> Role {
    Role {
        tenant_id: TENANT,
        role_id,
        name: name.into(),
        subtype: subtype.map(str::to_string),
        role_type: ROLE_TYPE_REGULAR,
        class_name_id: 1000 + role_id,
        created_at: Utc::now(),
    }
}

fn store_down() -> ShibauthError {
    ShibauthError::Database("store unavailable".into())
}

// -----------------------------------------------------------------------
// Users
// -----------------------------------------------------------------------

#[derive(Default)]
struct UserState {
    users: Vec<User>,
    next_id: i64,
    created: Vec<CreateUser>,
    updates: Vec<UpdateUser>,
    fail_lookups: bool,
    fail_creates: bool,
}

#[derive(Clone, Default)]
pub struct FakeUsers {
    state: Arc<Mutex<UserState>>,
}

impl FakeUsers {
    pub fn with(users: Vec<User>) -> Self {
        let next_id = users.iter().map(|u| u.user_id).max().unwrap_or(0) + 1;
        Self {
            state: Arc::new(Mutex::new(UserState {
                users,
                next_id,
                ..Default::default()
            })),
        }
    }

    pub fn fail_lookups(&self) {
        self.state.lock().unwrap().fail_lookups = true;
    }

    pub fn fail_creates(&self) {
        self.state.lock().unwrap().fail_creates = true;
    }

    pub fn all(&self) -> Vec<User> {
        self.state.lock().unwrap().users.clone()
    }

    pub fn created(&self) -> Vec<CreateUser> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn updates(&self) -> Vec<UpdateUser> {
        self.state.lock().unwrap().updates.clone()
    }

    fn find(&self, tenant_id: i64, pred: impl Fn(&User) -> bool) -> ShibauthResult<User> {
        let state = self.state.lock().unwrap();
        if state.fail_lookups {
            return Err(store_down());
        }
        state
            .users
            .iter()
            .find(|u| u.tenant_id == tenant_id && pred(u))
            .cloned()
            .ok_or_else(|| ShibauthError::not_found("user", tenant_id))
    }
}

impl UserRepository for FakeUsers {
    async fn create(&self, input: CreateUser) -> ShibauthResult<User> {
        let mut state = self.state.lock().unwrap();
        if state.fail_creates {
            return Err(store_down());
        }
        if state
            .users
            .iter()
            .any(|u| u.tenant_id == input.tenant_id && u.screen_name == input.screen_name)
        {
            return Err(ShibauthError::AlreadyExists {
                entity: "user".into(),
            });
        }

        let user_id = state.next_id.max(1);
        state.next_id = user_id + 1;
        let now = Utc::now();
        let user = User {
            tenant_id: input.tenant_id,
            user_id,
            screen_name: input.screen_name.clone(),
            email: if input.email.is_empty() {
                format!("{user_id}@no-emailaddress.com")
            } else {
                input.email.clone()
            },
            password_hash: format!("$argon2id$generated-{user_id}"),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            password_reset: input.password_reset,
            locale: input.locale.clone(),
            male: input.male,
            birthday: input.birthday,
            created_at: now,
            updated_at: now,
        };
        state.created.push(input);
        state.users.push(user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, tenant_id: i64, user_id: i64) -> ShibauthResult<User> {
        self.find(tenant_id, |u| u.user_id == user_id)
    }

    async fn get_by_screen_name(&self, tenant_id: i64, screen_name: &str) -> ShibauthResult<User> {
        self.find(tenant_id, |u| u.screen_name == screen_name)
    }

    async fn get_by_email(&self, tenant_id: i64, email: &str) -> ShibauthResult<User> {
        self.find(tenant_id, |u| u.email == email)
    }

    async fn update(
        &self,
        tenant_id: i64,
        user_id: i64,
        input: UpdateUser,
    ) -> ShibauthResult<User> {
        let mut state = self.state.lock().unwrap();
        state.updates.push(input.clone());
        let user = state
            .users
            .iter_mut()
            .find(|u| u.tenant_id == tenant_id && u.user_id == user_id)
            .ok_or_else(|| ShibauthError::not_found("user", user_id))?;
        if let Some(email) = input.email {
            user.email = email;
        }
        if let Some(first_name) = input.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name;
        }
        if let Some(password_reset) = input.password_reset {
            user.password_reset = password_reset;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

// -----------------------------------------------------------------------
// Roles
// -----------------------------------------------------------------------

#[derive(Default)]
struct RoleState {
    roles: Vec<Role>,
    /// (user_id, role_id)
    assignments: BTreeSet<(i64, i64)>,
    fail_create_names: HashSet<String>,
    fail_lookup_names: HashSet<String>,
    fail_managed_listing: bool,
    lookups: usize,
}

#[derive(Clone, Default)]
pub struct FakeRoles {
    state: Arc<Mutex<RoleState>>,
}

impl FakeRoles {
    pub fn with(roles: Vec<Role>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RoleState {
                roles,
                ..Default::default()
            })),
        }
    }

    pub fn grant(&self, user_id: i64, role_ids: &[i64]) {
        let mut state = self.state.lock().unwrap();
        for &role_id in role_ids {
            state.assignments.insert((user_id, role_id));
        }
    }

    /// Role ids held by the user, ascending.
    pub fn held(&self, user_id: i64) -> Vec<i64> {
        self.state
            .lock()
            .unwrap()
            .assignments
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, r)| *r)
            .collect()
    }

    pub fn all(&self) -> Vec<Role> {
        self.state.lock().unwrap().roles.clone()
    }

    pub fn lookups(&self) -> usize {
        self.state.lock().unwrap().lookups
    }

    pub fn fail_create_of(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_create_names
            .insert(name.into());
    }

    pub fn fail_lookup_of(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_lookup_names
            .insert(name.into());
    }

    pub fn fail_managed_listing(&self) {
        self.state.lock().unwrap().fail_managed_listing = true;
    }
}

impl RoleRepository for FakeRoles {
    async fn create(&self, input: NewRole) -> ShibauthResult<Role> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create_names.contains(&input.name) {
            return Err(store_down());
        }
        if state.roles.iter().any(|r| {
            r.tenant_id == input.tenant_id && (r.role_id == input.role_id || r.name == input.name)
        }) {
            return Err(ShibauthError::AlreadyExists {
                entity: "role".into(),
            });
        }
        let role = Role {
            tenant_id: input.tenant_id,
            role_id: input.role_id,
            name: input.name,
            subtype: input.subtype,
            role_type: input.role_type,
            class_name_id: input.class_name_id,
            created_at: Utc::now(),
        };
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn get_by_name(&self, tenant_id: i64, name: &str) -> ShibauthResult<Role> {
        let mut state = self.state.lock().unwrap();
        state.lookups += 1;
        if state.fail_lookup_names.contains(name) {
            return Err(store_down());
        }
        state
            .roles
            .iter()
            .find(|r| r.tenant_id == tenant_id && r.name == name)
            .cloned()
            .ok_or_else(|| ShibauthError::not_found("role", name))
    }

    async fn list(&self, tenant_id: i64) -> ShibauthResult<Vec<Role>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .roles
            .iter()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn list_by_subtype(&self, tenant_id: i64, subtype: &str) -> ShibauthResult<Vec<Role>> {
        let state = self.state.lock().unwrap();
        if state.fail_managed_listing {
            return Err(store_down());
        }
        Ok(state
            .roles
            .iter()
            .filter(|r| r.tenant_id == tenant_id && r.subtype.as_deref() == Some(subtype))
            .cloned()
            .collect())
    }

    async fn assign_to_user(
        &self,
        _tenant_id: i64,
        user_id: i64,
        role_ids: &[i64],
    ) -> ShibauthResult<()> {
        let mut state = self.state.lock().unwrap();
        for &role_id in role_ids {
            state.assignments.insert((user_id, role_id));
        }
        Ok(())
    }

    async fn unassign_from_user(
        &self,
        _tenant_id: i64,
        user_id: i64,
        role_ids: &[i64],
    ) -> ShibauthResult<()> {
        let mut state = self.state.lock().unwrap();
        for role_id in role_ids {
            state.assignments.remove(&(user_id, *role_id));
        }
        Ok(())
    }

    async fn get_user_roles(&self, tenant_id: i64, user_id: i64) -> ShibauthResult<Vec<Role>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .roles
            .iter()
            .filter(|r| {
                r.tenant_id == tenant_id && state.assignments.contains(&(user_id, r.role_id))
            })
            .cloned()
            .collect())
    }
}

// -----------------------------------------------------------------------
// Tenant configuration
// -----------------------------------------------------------------------

#[derive(Default)]
struct ConfigState {
    configs: HashMap<i64, TenantSsoConfig>,
    fail: bool,
}

#[derive(Clone, Default)]
pub struct FakeConfigs {
    state: Arc<Mutex<ConfigState>>,
}

impl FakeConfigs {
    pub fn with(config: TenantSsoConfig) -> Self {
        let configs = FakeConfigs::default();
        configs
            .state
            .lock()
            .unwrap()
            .configs
            .insert(config.tenant_id, config);
        configs
    }

    pub fn fail(&self) {
        self.state.lock().unwrap().fail = true;
    }
}

impl TenantConfigRepository for FakeConfigs {
    async fn get(&self, tenant_id: i64) -> ShibauthResult<TenantSsoConfig> {
        let state = self.state.lock().unwrap();
        if state.fail {
            return Err(store_down());
        }
        state
            .configs
            .get(&tenant_id)
            .cloned()
            .ok_or_else(|| ShibauthError::not_found("sso_config", tenant_id))
    }

    async fn upsert(&self, config: TenantSsoConfig) -> ShibauthResult<TenantSsoConfig> {
        let mut state = self.state.lock().unwrap();
        state.configs.insert(config.tenant_id, config.clone());
        Ok(config)
    }
}

// -----------------------------------------------------------------------
// Directory
// -----------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct FakeDirectory {
    entries: Arc<Mutex<HashMap<String, User>>>,
}

impl FakeDirectory {
    pub fn with(login: &str, user: User) -> Self {
        let directory = FakeDirectory::default();
        directory
            .entries
            .lock()
            .unwrap()
            .insert(login.into(), user);
        directory
    }
}

impl DirectoryImporter for FakeDirectory {
    async fn import_by_login(&self, _tenant_id: i64, login: &str) -> ShibauthResult<Option<User>> {
        Ok(self.entries.lock().unwrap().get(login).cloned())
    }
}
