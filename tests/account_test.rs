//! Registration, password hashing and admin account management.

mod common;

use ngoconnect::auth::password;
use ngoconnect::db;
use ngoconnect::errors::AppError;
use ngoconnect::models::user::{self, NewDonorProfile, NewProfile, NewUser, Role};

use common::*;

#[test]
fn hashes_are_salted_and_verifiable() {
    let first = password::hash_password("Tr0ub4dor&3").expect("hash");
    let second = password::hash_password("Tr0ub4dor&3").expect("hash");
    assert_ne!(first, second);
    assert!(password::verify_password("Tr0ub4dor&3", &first).expect("verify"));
    assert!(!password::verify_password("wrong", &first).expect("verify"));
    assert!(password::verify_password("anything", "not-a-hash").is_err());
}

#[tokio::test]
async fn duplicate_email_is_a_validation_error() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    create_donor(pool, "same@donor.test").await;

    let again = NewUser {
        email: "SAME@donor.test".to_string(),
        password_hash: TEST_PASSWORD_HASH.to_string(),
        role: Role::Donor,
        first_name: "Other".to_string(),
        last_name: "Person".to_string(),
        phone: String::new(),
    };
    let profile = NewProfile::Donor(NewDonorProfile::default());
    match user::register(pool, &again, &profile).await {
        Err(AppError::Validation(errors)) => assert_eq!(errors, vec!["Email already registered"]),
        other => panic!("expected a validation error, got {other:?}"),
    }

    db.teardown().await;
}

#[tokio::test]
async fn registration_creates_the_role_profile() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let (user_id, _) = create_volunteer(pool, "Mixed.Case@vol.test", "Vera").await;

    let found = user::find_by_email(pool, "mixed.case@VOL.test")
        .await
        .expect("query")
        .expect("user found regardless of case");
    assert_eq!(found.id, user_id);
    assert_eq!(found.role, Role::Volunteer);
    assert!(found.is_active);

    let profile = user::find_volunteer_by_user(pool, user_id).await.expect("query").expect("profile");
    assert_eq!(profile.skills, vec!["First aid"]);
    assert!(user::find_ngo_by_user(pool, user_id).await.expect("query").is_none());

    db.teardown().await;
}

#[tokio::test]
async fn admin_verifies_ngos_and_toggles_accounts() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let (ngo_user, ngo_id) = create_ngo(pool, "verify@ngo.test", "Verify Org").await;

    let ngo = user::find_ngo_by_id(pool, ngo_id).await.expect("query").expect("ngo");
    assert!(!ngo.is_verified);

    assert!(user::set_ngo_verified(pool, ngo_id, true).await.expect("verify"));
    let ngo = user::find_ngo_by_id(pool, ngo_id).await.expect("query").expect("ngo");
    assert!(ngo.is_verified);
    assert!(!user::set_ngo_verified(pool, 424_242, true).await.expect("missing ngo"));

    // Deactivated accounts drop out of the public directory.
    assert_eq!(user::search_ngos(pool, "verify", None, None).await.expect("search").len(), 1);
    assert!(user::set_active(pool, ngo_user, false).await.expect("deactivate"));
    assert!(user::search_ngos(pool, "verify", None, None).await.expect("search").is_empty());
    assert!(!user::set_active(pool, 424_242, false).await.expect("missing user"));

    db.teardown().await;
}

#[tokio::test]
async fn directory_search_filters_by_category_and_city() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    create_ngo(pool, "green@ngo.test", "Green Hands").await;
    create_ngo(pool, "blue@ngo.test", "Blue Water").await;

    let all = user::search_ngos(pool, "", None, None).await.expect("search");
    assert_eq!(all.len(), 2);

    let by_name = user::search_ngos(pool, "water", None, None).await.expect("search");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].organization_name, "Blue Water");

    assert_eq!(user::search_ngos(pool, "", Some("Environment"), Some("lisbon")).await.expect("search").len(), 2);
    assert!(user::search_ngos(pool, "", Some("Health"), None).await.expect("search").is_empty());

    db.teardown().await;
}

#[tokio::test]
async fn admin_seed_runs_once() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    db::seed_admin(pool, "admin@ngoconnect.test", TEST_PASSWORD_HASH).await.expect("seed");
    db::seed_admin(pool, "second@ngoconnect.test", TEST_PASSWORD_HASH).await.expect("seed again");

    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(pool)
        .await
        .expect("count");
    assert_eq!(admins, 1);
    assert!(user::find_by_email(pool, "second@ngoconnect.test").await.expect("query").is_none());

    db.teardown().await;
}
