//! Shared test infrastructure for the database-backed tests.
//!
//! Each test gets its own Postgres schema on the server named by
//! `TEST_DATABASE_URL`, migrated from scratch. When the variable is unset the
//! database tests return early so `cargo test` still runs the unit suites.
#![allow(dead_code)]

use std::str::FromStr;

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use ngoconnect::auth::password::hash_password;
use ngoconnect::db::MIGRATOR;
use ngoconnect::models::event::{self, NewEvent};
use ngoconnect::models::user::{
    self, NewDonorProfile, NewNgoProfile, NewProfile, NewUser, NewVolunteerProfile, Role,
};

pub const TEST_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGVzdHNhbHRzYWx0c2FsdA$Hq+997nQLD2V+xLE/VoVm1NItlnos5jzA78lP5xqIAU";

pub struct TestDb {
    pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl TestDb {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Drop the schema. Tests that skip this leave it behind for inspection.
    pub async fn teardown(self) {
        self.pool.close().await;
        let _ = sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
            .execute(&self.admin)
            .await;
    }
}

pub async fn setup_test_db() -> Option<TestDb> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let schema = format!("t_{}", hex::encode(rand::rng().random::<[u8; 6]>()));

    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .expect("create test schema");

    let options = PgConnectOptions::from_str(&url)
        .expect("parse TEST_DATABASE_URL")
        .options([("search_path", schema.as_str())]);
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .expect("connect test pool");
    MIGRATOR.run(&pool).await.expect("run migrations");

    Some(TestDb { pool, admin, schema })
}

fn new_user(email: &str, role: Role, first: &str, last: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: TEST_PASSWORD_HASH.to_string(),
        role,
        first_name: first.to_string(),
        last_name: last.to_string(),
        phone: String::new(),
    }
}

/// Returns (user id, ngo id).
pub async fn create_ngo(pool: &PgPool, email: &str, name: &str) -> (i64, i64) {
    let profile = NewProfile::Ngo(NewNgoProfile {
        organization_name: name.to_string(),
        city: "Lisbon".to_string(),
        category: "Environment".to_string(),
        ..Default::default()
    });
    let user_id = user::register(pool, &new_user(email, Role::Ngo, "Org", "Owner"), &profile)
        .await
        .expect("register ngo");
    let ngo = user::find_ngo_by_user(pool, user_id)
        .await
        .expect("load ngo")
        .expect("ngo profile exists");
    (user_id, ngo.id)
}

/// Returns (user id, volunteer id).
pub async fn create_volunteer(pool: &PgPool, email: &str, first: &str) -> (i64, i64) {
    let profile = NewProfile::Volunteer(NewVolunteerProfile {
        skills: vec!["First aid".to_string()],
        interests: vec!["environment".to_string()],
        ..Default::default()
    });
    let user_id = user::register(pool, &new_user(email, Role::Volunteer, first, "Tester"), &profile)
        .await
        .expect("register volunteer");
    let volunteer = user::find_volunteer_by_user(pool, user_id)
        .await
        .expect("load volunteer")
        .expect("volunteer profile exists");
    (user_id, volunteer.id)
}

/// Volunteer who can sign in through the login form with `password`.
/// Returns (user id, volunteer id).
pub async fn create_volunteer_with_password(pool: &PgPool, email: &str, password: &str) -> (i64, i64) {
    let mut new = new_user(email, Role::Volunteer, "Login", "Tester");
    new.password_hash = hash_password(password).expect("hash password");
    let user_id = user::register(pool, &new, &NewProfile::Volunteer(NewVolunteerProfile::default()))
        .await
        .expect("register volunteer");
    let volunteer = user::find_volunteer_by_user(pool, user_id)
        .await
        .expect("load volunteer")
        .expect("volunteer profile exists");
    (user_id, volunteer.id)
}

/// Returns (user id, donor id).
pub async fn create_donor(pool: &PgPool, email: &str) -> (i64, i64) {
    let profile = NewProfile::Donor(NewDonorProfile { company_name: "Acme".to_string() });
    let user_id = user::register(pool, &new_user(email, Role::Donor, "Dana", "Donor"), &profile)
        .await
        .expect("register donor");
    let donor = user::find_donor_by_user(pool, user_id)
        .await
        .expect("load donor")
        .expect("donor profile exists");
    (user_id, donor.id)
}

pub fn days_from_now(days: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days)).date_naive()
}

/// One-day event `days` ahead with four slots of `capacity` seats. Returns the event id.
pub async fn create_event(pool: &PgPool, ngo_id: i64, days: i64, capacity: i32) -> i64 {
    let day = days_from_now(days);
    let new = NewEvent {
        title: "River cleanup".to_string(),
        description: String::new(),
        location: "East bank".to_string(),
        start_date: day,
        end_date: day,
        category: "Environment".to_string(),
        max_volunteers: capacity,
        required_skills: vec!["First aid".to_string()],
    };
    let (id, _) = event::create_with_slots(pool, ngo_id, &new)
        .await
        .expect("create event");
    id
}

pub async fn first_slot(pool: &PgPool, event_id: i64) -> i64 {
    event::find_slots(pool, event_id)
        .await
        .expect("load slots")
        .first()
        .expect("event has slots")
        .id
}
