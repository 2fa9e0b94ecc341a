use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::models::user::{self, NewUser, Role};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Create the default admin account if no admin exists yet.
pub async fn seed_admin(pool: &PgPool, email: &str, password_hash: &str) -> Result<(), sqlx::Error> {
    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(pool)
        .await?;
    if admins > 0 {
        log::info!("Admin account present ({} admins), skipping seed", admins);
        return Ok(());
    }

    let new = NewUser {
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        role: Role::Admin,
        first_name: "Platform".to_string(),
        last_name: "Admin".to_string(),
        phone: String::new(),
    };
    let id = user::create_admin(pool, &new).await?;
    log::info!("Seeded admin account '{}' (id {})", email, id);
    Ok(())
}
