use sqlx::PgPool;

use super::types::*;
use crate::errors::{AppError, is_unique_violation};

const USER_COLUMNS: &str = "id, email, password_hash, role, first_name, last_name, phone, \
                            is_active, last_login, created_at";

const NGO_COLUMNS: &str = "id, user_id, organization_name, description, mission, website, \
                           address, city, state, zip_code, category, is_verified";

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(email.trim())
        .fetch_optional(pool)
        .await?
        .map(User::try_from)
        .transpose()
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(User::try_from)
        .transpose()
}

/// Create an account and its role profile in one transaction.
/// A duplicate email comes back as a validation error.
pub async fn register(pool: &PgPool, new: &NewUser, profile: &NewProfile) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, password_hash, role, first_name, last_name, phone) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(new.email.trim().to_lowercase())
    .bind(&new.password_hash)
    .bind(new.role.as_str())
    .bind(new.first_name.trim())
    .bind(new.last_name.trim())
    .bind(new.phone.trim())
    .fetch_one(&mut *tx)
    .await;

    let user_id = match inserted {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Validation(vec!["Email already registered".to_string()]));
        }
        Err(e) => return Err(e.into()),
    };

    match profile {
        NewProfile::Ngo(p) => {
            sqlx::query(
                "INSERT INTO ngos (user_id, organization_name, description, mission, website, \
                                   address, city, state, zip_code, category) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(user_id)
            .bind(p.organization_name.trim())
            .bind(p.description.trim())
            .bind(p.mission.trim())
            .bind(p.website.trim())
            .bind(p.address.trim())
            .bind(p.city.trim())
            .bind(p.state.trim())
            .bind(p.zip_code.trim())
            .bind(p.category.trim())
            .execute(&mut *tx)
            .await?;
        }
        NewProfile::Volunteer(p) => {
            sqlx::query("INSERT INTO volunteers (user_id, bio, skills, interests) VALUES ($1, $2, $3, $4)")
                .bind(user_id)
                .bind(p.bio.trim())
                .bind(&p.skills)
                .bind(&p.interests)
                .execute(&mut *tx)
                .await?;
        }
        NewProfile::Donor(p) => {
            sqlx::query("INSERT INTO donors (user_id, company_name) VALUES ($1, $2)")
                .bind(user_id)
                .bind(p.company_name.trim())
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(user_id)
}

/// Admin accounts carry no profile row.
pub async fn create_admin(pool: &PgPool, new: &NewUser) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, role, first_name, last_name, phone) \
         VALUES ($1, $2, 'admin', $3, $4, $5) RETURNING id",
    )
    .bind(new.email.trim().to_lowercase())
    .bind(&new.password_hash)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.phone)
    .fetch_one(pool)
    .await
}

pub async fn touch_last_login(pool: &PgPool, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Soft-retire or reinstate an account. Returns false when no such user exists.
pub async fn set_active(pool: &PgPool, user_id: i64, active: bool) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(active)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// False for deactivated and for deleted accounts.
pub async fn is_active(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(active.unwrap_or(false))
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        "SELECT id, email, role, first_name, last_name, is_active, created_at \
         FROM users ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_ngo_by_user(pool: &PgPool, user_id: i64) -> Result<Option<NgoProfile>, sqlx::Error> {
    let sql = format!("SELECT {NGO_COLUMNS} FROM ngos WHERE user_id = $1");
    sqlx::query_as::<_, NgoProfile>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_ngo_by_id(pool: &PgPool, ngo_id: i64) -> Result<Option<NgoProfile>, sqlx::Error> {
    let sql = format!("SELECT {NGO_COLUMNS} FROM ngos WHERE id = $1");
    sqlx::query_as::<_, NgoProfile>(&sql)
        .bind(ngo_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_volunteer_by_user(pool: &PgPool, user_id: i64) -> Result<Option<VolunteerProfile>, sqlx::Error> {
    sqlx::query_as::<_, VolunteerProfile>(
        "SELECT id, user_id, bio, skills, interests FROM volunteers WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_donor_by_user(pool: &PgPool, user_id: i64) -> Result<Option<DonorProfile>, sqlx::Error> {
    sqlx::query_as::<_, DonorProfile>("SELECT id, user_id, company_name FROM donors WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Every NGO profile, unverified first, for the admin review list.
pub async fn list_ngos(pool: &PgPool) -> Result<Vec<NgoProfile>, sqlx::Error> {
    let sql = format!("SELECT {NGO_COLUMNS} FROM ngos ORDER BY is_verified ASC, organization_name ASC");
    sqlx::query_as::<_, NgoProfile>(&sql).fetch_all(pool).await
}

/// Set an NGO's verification flag. Only the admin handlers call this.
pub async fn set_ngo_verified(pool: &PgPool, ngo_id: i64, verified: bool) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE ngos SET is_verified = $2 WHERE id = $1")
        .bind(ngo_id)
        .bind(verified)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// NGO directory search. Empty term and `None` filters match everything.
/// Only NGOs whose account is active are listed.
pub async fn search_ngos(
    pool: &PgPool,
    term: &str,
    category: Option<&str>,
    city: Option<&str>,
) -> Result<Vec<NgoProfile>, sqlx::Error> {
    let pattern = format!("%{}%", term.trim());
    sqlx::query_as::<_, NgoProfile>(
        "SELECT n.id, n.user_id, n.organization_name, n.description, n.mission, n.website, \
                n.address, n.city, n.state, n.zip_code, n.category, n.is_verified \
         FROM ngos n \
         JOIN users u ON u.id = n.user_id \
         WHERE u.is_active \
           AND (n.organization_name ILIKE $1 OR n.description ILIKE $1) \
           AND ($2::TEXT IS NULL OR n.category = $2) \
           AND ($3::TEXT IS NULL OR n.city ILIKE $3) \
         ORDER BY n.is_verified DESC, n.organization_name",
    )
    .bind(pattern)
    .bind(category)
    .bind(city)
    .fetch_all(pool)
    .await
}
