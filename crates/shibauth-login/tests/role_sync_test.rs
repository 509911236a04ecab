//! Integration tests for role synchronization.

mod common;

use common::{FakeRoles, TENANT, role, session, sso_config, user};
use shibauth_core::models::role::ROLE_TYPE_REGULAR;
use shibauth_core::models::tenant::TenantSsoConfig;
use shibauth_login::error::LoginError;
use shibauth_login::roles::RoleSynchronizer;

fn managed_config() -> TenantSsoConfig {
    TenantSsoConfig {
        auto_assign_roles: true,
        role_subtype: "sso".into(),
        ..sso_config()
    }
}

#[tokio::test]
async fn managed_set_follows_affiliation() {
    let roles = FakeRoles::with(vec![
        role(1, "A", Some("sso")),
        role(2, "B", Some("sso")),
        role(3, "C", Some("sso")),
    ]);
    roles.grant(42, &[1, 2]);

    let report = RoleSynchronizer::new(&roles)
        .sync(
            &managed_config(),
            &user(42, "jdoe"),
            &session(&[("affiliation", "B,C")]),
        )
        .await
        .unwrap();

    assert_eq!(roles.held(42), vec![2, 3]);
    assert_eq!(report.assigned, vec![2, 3]);
    assert_eq!(report.unassigned, vec![1]);
    assert!(report.created.is_empty());
    assert!(!report.skipped);
}

#[tokio::test]
async fn unmanaged_roles_are_kept() {
    let roles = FakeRoles::with(vec![
        role(1, "A", Some("sso")),
        role(2, "Administrator", None),
        role(3, "Guest", Some("other")),
    ]);
    roles.grant(42, &[1, 2, 3]);

    RoleSynchronizer::new(&roles)
        .sync(&managed_config(), &user(42, "jdoe"), &session(&[]))
        .await
        .unwrap();

    assert_eq!(roles.held(42), vec![2, 3]);
}

#[tokio::test]
async fn asserted_roles_are_assigned_regardless_of_subtype() {
    let roles = FakeRoles::with(vec![role(5, "Power User", None)]);

    let report = RoleSynchronizer::new(&roles)
        .sync(
            &managed_config(),
            &user(42, "jdoe"),
            &session(&[("affiliation", "Power User")]),
        )
        .await
        .unwrap();

    assert_eq!(report.assigned, vec![5]);
    assert_eq!(roles.held(42), vec![5]);
}

#[tokio::test]
async fn blank_subtype_manages_nothing() {
    let roles = FakeRoles::with(vec![role(1, "A", Some("sso")), role(2, "B", None)]);
    roles.grant(42, &[1]);
    let config = TenantSsoConfig {
        role_subtype: "  ".into(),
        ..managed_config()
    };

    let report = RoleSynchronizer::new(&roles)
        .sync(&config, &user(42, "jdoe"), &session(&[("affiliation", "B")]))
        .await
        .unwrap();

    assert!(report.unassigned.is_empty());
    assert_eq!(roles.held(42), vec![1, 2]);
}

#[tokio::test]
async fn disabled_assignment_is_noop() {
    let roles = FakeRoles::with(vec![role(1, "A", Some("sso"))]);
    roles.grant(42, &[1]);
    let config = TenantSsoConfig {
        auto_assign_roles: false,
        ..managed_config()
    };

    let report = RoleSynchronizer::new(&roles)
        .sync(&config, &user(42, "jdoe"), &session(&[("affiliation", "")]))
        .await
        .unwrap();

    assert!(report.skipped);
    assert_eq!(roles.held(42), vec![1]);
    assert_eq!(roles.lookups(), 0);
}

#[tokio::test]
async fn missing_role_is_created_with_next_id() {
    let roles = FakeRoles::with(vec![
        role(5, "A", Some("sso")),
        role(10, "C", None),
        role(7, "B", Some("sso")),
    ]);
    let config = TenantSsoConfig {
        auto_create_missing_roles: true,
        ..managed_config()
    };

    let report = RoleSynchronizer::new(&roles)
        .sync(&config, &user(42, "jdoe"), &session(&[("affiliation", "New")]))
        .await
        .unwrap();

    assert_eq!(report.created.len(), 1);
    let created = &report.created[0];
    assert_eq!(created.role_id, 11);
    assert_eq!(created.name, "New");
    assert_eq!(created.subtype.as_deref(), Some("sso"));
    assert_eq!(created.role_type, ROLE_TYPE_REGULAR);
    // Copied from role 10.
    assert_eq!(created.class_name_id, 1010);
    assert_eq!(created.tenant_id, TENANT);
    assert_eq!(roles.held(42), vec![11]);
}

#[tokio::test]
async fn successive_creations_allocate_distinct_ids() {
    let roles = FakeRoles::with(vec![role(3, "A", Some("sso"))]);
    let config = TenantSsoConfig {
        auto_create_missing_roles: true,
        ..managed_config()
    };

    let report = RoleSynchronizer::new(&roles)
        .sync(
            &config,
            &user(42, "jdoe"),
            &session(&[("affiliation", "X,Y")]),
        )
        .await
        .unwrap();

    let ids: Vec<i64> = report.created.iter().map(|r| r.role_id).collect();
    assert_eq!(ids, vec![4, 5]);
    assert_eq!(roles.held(42), vec![4, 5]);
}

#[tokio::test]
async fn first_role_of_empty_tenant_gets_id_one() {
    let roles = FakeRoles::default();
    let config = TenantSsoConfig {
        auto_create_missing_roles: true,
        role_subtype: String::new(),
        ..managed_config()
    };

    let report = RoleSynchronizer::new(&roles)
        .sync(&config, &user(42, "jdoe"), &session(&[("affiliation", "First")]))
        .await
        .unwrap();

    let created = &report.created[0];
    assert_eq!(created.role_id, 1);
    assert_eq!(created.class_name_id, 0);
    assert_eq!(created.subtype, None);
}

#[tokio::test]
async fn exhausted_role_ids_skip_creation() {
    let mut last = role(2, "Last", Some("sso"));
    last.role_id = i64::MAX;
    let roles = FakeRoles::with(vec![role(1, "A", Some("sso")), last]);
    let config = TenantSsoConfig {
        auto_create_missing_roles: true,
        ..managed_config()
    };

    let report = RoleSynchronizer::new(&roles)
        .sync(&config, &user(42, "jdoe"), &session(&[("affiliation", "A,Overflow")]))
        .await
        .unwrap();

    assert!(report.created.is_empty());
    assert_eq!(report.skipped_names, vec!["Overflow"]);
    assert_eq!(report.assigned, vec![1]);
    assert_eq!(roles.held(42), vec![1]);
}

#[tokio::test]
async fn unknown_role_without_creation_is_skipped() {
    let roles = FakeRoles::with(vec![role(1, "A", Some("sso"))]);

    let report = RoleSynchronizer::new(&roles)
        .sync(
            &managed_config(),
            &user(42, "jdoe"),
            &session(&[("affiliation", "A,Ghost")]),
        )
        .await
        .unwrap();

    assert_eq!(report.assigned, vec![1]);
    assert_eq!(report.skipped_names, vec!["Ghost".to_string()]);
    assert_eq!(roles.all().len(), 1);
}

#[tokio::test]
async fn unresolvable_name_does_not_block_others() {
    let roles = FakeRoles::with(vec![role(1, "A", Some("sso")), role(2, "B", Some("sso"))]);
    roles.fail_lookup_of("A");
    roles.fail_create_of("Broken");
    let config = TenantSsoConfig {
        auto_create_missing_roles: true,
        ..managed_config()
    };

    let report = RoleSynchronizer::new(&roles)
        .sync(
            &config,
            &user(42, "jdoe"),
            &session(&[("affiliation", "A,Broken,B")]),
        )
        .await
        .unwrap();

    assert_eq!(report.assigned, vec![2]);
    assert_eq!(
        report.skipped_names,
        vec!["A".to_string(), "Broken".to_string()]
    );
    assert_eq!(roles.held(42), vec![2]);
}

#[tokio::test]
async fn duplicate_names_resolve_once() {
    let roles = FakeRoles::with(vec![role(1, "A", Some("sso"))]);

    let report = RoleSynchronizer::new(&roles)
        .sync(
            &managed_config(),
            &user(42, "jdoe"),
            &session(&[("affiliation", "A, A ,,A")]),
        )
        .await
        .unwrap();

    assert_eq!(report.assigned, vec![1]);
    assert_eq!(roles.lookups(), 1);
}

#[tokio::test]
async fn sync_is_idempotent() {
    let roles = FakeRoles::with(vec![role(1, "A", Some("sso")), role(2, "B", Some("sso"))]);
    let synchronizer = RoleSynchronizer::new(&roles);
    let attributes = session(&[("affiliation", "A,B")]);

    synchronizer
        .sync(&managed_config(), &user(42, "jdoe"), &attributes)
        .await
        .unwrap();
    let second = synchronizer
        .sync(&managed_config(), &user(42, "jdoe"), &attributes)
        .await
        .unwrap();

    assert!(second.unassigned.is_empty());
    assert_eq!(roles.held(42), vec![1, 2]);
}

#[tokio::test]
async fn managed_listing_failure_is_reported() {
    let roles = FakeRoles::with(vec![role(1, "A", Some("sso"))]);
    roles.fail_managed_listing();

    let err = RoleSynchronizer::new(&roles)
        .sync(
            &managed_config(),
            &user(42, "jdoe"),
            &session(&[("affiliation", "A")]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::Store(_)));
}
