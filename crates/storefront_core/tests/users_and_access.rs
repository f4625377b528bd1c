//! Identity resolution, the admin gate and role administration.

mod common;

use common::*;
use storefront_core::{
    authz, catalog, identity, payments, users, DatabaseService, ExternalIdentity, Role,
    ServiceError,
};

#[tokio::test]
async fn resolving_twice_returns_the_same_user() {
    let (db, _, _, _) = seeded().await;
    let who = identity("firebase-new", "new@example.com");

    let (first, created) = identity::resolve(&db, who.clone()).await.unwrap();
    assert!(created);
    assert_eq!(first.role, Role::Student);

    let renamed = ExternalIdentity {
        name: "Renamed".to_string(),
        ..who
    };
    let (second, created) = identity::resolve(&db, renamed).await.unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(second.name, first.name);

    let everyone = db.list_users().await.unwrap();
    assert_eq!(everyone.iter().filter(|u| u.subject == "firebase-new").count(), 1);
}

#[tokio::test]
async fn resolving_never_downgrades_an_admin() {
    let (db, admin, _, _) = seeded().await;

    let (again, created) = identity::resolve(&db, identity(ADMIN, "admin@example.com"))
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(again.id, admin.id);
    assert_eq!(again.role, Role::Admin);
}

#[tokio::test]
async fn resolving_requires_subject_name_and_email() {
    let db = storefront_core::InMemoryDatabase::new();
    let mut nameless = identity("s", "s@example.com");
    nameless.name = String::new();

    for who in [identity("", "a@example.com"), identity("s", ""), nameless] {
        assert!(matches!(
            identity::resolve(&db, who).await,
            Err(ServiceError::Validation(_))
        ));
    }
}

#[tokio::test]
async fn store_outage_surfaces_from_resolve_but_gate_fails_closed() {
    let db = UnreachableDatabase;

    assert!(matches!(
        identity::resolve(&db, identity("s", "s@example.com")).await,
        Err(ServiceError::StoreUnavailable(_))
    ));
    assert!(!authz::is_admin(&db, Some(ADMIN)).await);
    assert!(matches!(
        payments::list(&db, Some(ADMIN), None).await,
        Err(ServiceError::Forbidden)
    ));
}

#[tokio::test]
async fn gate_checks_the_role_on_every_call() {
    let (db, _, student, _) = seeded().await;

    assert!(authz::is_admin(&db, Some(ADMIN)).await);
    assert!(!authz::is_admin(&db, Some(STUDENT)).await);
    assert!(!authz::is_admin(&db, None).await);
    assert!(!authz::is_admin(&db, Some("   ")).await);

    users::set_role(&db, Some(ADMIN), &student.subject, Role::Admin)
        .await
        .unwrap();
    assert!(authz::is_admin(&db, Some(STUDENT)).await);

    users::set_role(&db, Some(STUDENT), ADMIN, Role::Student)
        .await
        .unwrap();
    assert!(!authz::is_admin(&db, Some(ADMIN)).await);
}

#[tokio::test]
async fn admins_cannot_change_or_delete_themselves() {
    let (db, admin, _, _) = seeded().await;

    for role in [Role::Student, Role::Admin] {
        assert!(matches!(
            users::set_role(&db, Some(ADMIN), ADMIN, role).await,
            Err(ServiceError::Forbidden)
        ));
    }
    assert!(matches!(
        users::delete(&db, Some(ADMIN), admin.id).await,
        Err(ServiceError::Forbidden)
    ));

    let still_there = db.get_user_by_subject(ADMIN).await.unwrap();
    assert_eq!(still_there.role, Role::Admin);
}

#[tokio::test]
async fn role_administration_requires_admin() {
    let (db, admin, student, _) = seeded().await;

    assert!(matches!(
        users::set_role(&db, Some(STUDENT), ADMIN, Role::Student).await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(
        users::delete(&db, Some(STUDENT), admin.id).await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(
        users::list(&db, Some(STUDENT)).await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(
        users::list(&db, None).await,
        Err(ServiceError::Forbidden)
    ));

    let listed = users::list(&db, Some(ADMIN)).await.unwrap();
    assert!(listed.iter().any(|u| u.id == student.id));
}

#[tokio::test]
async fn deleting_twice_reports_not_found() {
    let (db, _, student, _) = seeded().await;

    users::delete(&db, Some(ADMIN), student.id).await.unwrap();
    assert!(matches!(
        users::delete(&db, Some(ADMIN), student.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        users::set_role(&db, Some(ADMIN), STUDENT, Role::Admin).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn catalog_mutations_are_gated_and_validated() {
    let (db, _, _, course) = seeded().await;

    assert!(matches!(
        catalog::delete_course(&db, Some(STUDENT), course.id).await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(
        catalog::update_course(
            &db,
            Some(ADMIN),
            course.id,
            storefront_core::CoursePatch {
                price: Some(-1.0),
                ..Default::default()
            }
        )
        .await,
        Err(ServiceError::Validation(_))
    ));

    let updated = catalog::update_course(
        &db,
        Some(ADMIN),
        course.id,
        storefront_core::CoursePatch {
            rating: Some(9.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.rating, 5.0);

    assert!(matches!(
        catalog::create_channel(&db, Some(ADMIN), "Bkash", " ").await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        catalog::create_channel(&db, Some(STUDENT), "Bkash", "017").await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(
        catalog::create_channel(&db, Some(STUDENT), "Bkash", " ").await,
        Err(ServiceError::Forbidden)
    ));
    let channel = catalog::create_channel(&db, Some(ADMIN), "Bkash", "01700000000")
        .await
        .unwrap();
    let renamed = catalog::update_channel(&db, Some(ADMIN), channel.id, "Nagad", "01900000000")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Nagad");
    assert_eq!(catalog::list_channels(&db).await.unwrap().len(), 1);

    catalog::delete_channel(&db, Some(ADMIN), channel.id).await.unwrap();
    assert!(matches!(
        catalog::delete_channel(&db, Some(ADMIN), channel.id).await,
        Err(ServiceError::NotFound(_))
    ));
}
