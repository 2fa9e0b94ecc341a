//! Append-only donation history: insert and read only.
//! The `donations_append_only` trigger rejects UPDATE and DELETE in the database.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;

use crate::auth::validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Donation {
    pub id: i64,
    pub donor_id: i64,
    pub ngo_id: i64,
    pub amount: Decimal,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// A donation with the recipient's name, for the donor's history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DonationDetail {
    pub id: i64,
    pub ngo_id: i64,
    pub ngo_name: String,
    pub amount: Decimal,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DonationForm {
    pub ngo_id: i64,
    pub amount: String,
    #[serde(default)]
    pub note: String,
    pub csrf_token: String,
}

pub fn max_amount() -> Decimal {
    Decimal::new(1_000_000, 0)
}

/// Parse a positive amount with at most two decimal places.
pub fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(raw.trim()).map_err(|_| "Amount must be a number".to_string())?;
    if amount <= Decimal::ZERO {
        return Err("Amount must be greater than zero".to_string());
    }
    if amount > max_amount() {
        return Err(format!("Amount may not exceed {}", max_amount()));
    }
    if amount.scale() > 2 && amount.normalize().scale() > 2 {
        return Err("Amount may have at most two decimal places".to_string());
    }
    Ok(amount.round_dp(2))
}

pub fn validate_form(form: &DonationForm) -> Result<Decimal, Vec<String>> {
    let mut errors = Vec::new();
    let amount = parse_amount(&form.amount).map_err(|e| errors.push(e)).ok();
    errors.extend(validate::validate_optional(&form.note, "Note", 500));
    match amount {
        Some(a) if errors.is_empty() => Ok(a),
        _ => Err(errors),
    }
}

pub async fn record(
    pool: &PgPool,
    donor_id: i64,
    ngo_id: i64,
    amount: Decimal,
    note: &str,
) -> Result<Donation, sqlx::Error> {
    sqlx::query_as::<_, Donation>(
        "INSERT INTO donations (donor_id, ngo_id, amount, note) VALUES ($1, $2, $3, $4) \
         RETURNING id, donor_id, ngo_id, amount, note, created_at",
    )
    .bind(donor_id)
    .bind(ngo_id)
    .bind(amount)
    .bind(note.trim())
    .fetch_one(pool)
    .await
}

pub async fn find_for_donor(pool: &PgPool, donor_id: i64) -> Result<Vec<DonationDetail>, sqlx::Error> {
    sqlx::query_as::<_, DonationDetail>(
        "SELECT d.id, d.ngo_id, n.organization_name AS ngo_name, d.amount, d.note, d.created_at \
         FROM donations d \
         JOIN ngos n ON n.id = d.ngo_id \
         WHERE d.donor_id = $1 \
         ORDER BY d.created_at DESC, d.id DESC",
    )
    .bind(donor_id)
    .fetch_all(pool)
    .await
}
