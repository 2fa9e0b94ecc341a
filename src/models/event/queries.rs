use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use super::slots::generate_slots;
use super::types::*;

const EVENT_COLUMNS: &str = "id, ngo_id, title, description, location, start_date, end_date, category, \
                             max_volunteers, required_skills, is_active, status, created_at, updated_at";

const SLOT_COLUMNS: &str = "id, event_id, start_time, end_time, capacity, booked_count, is_closed";

/// Insert an event and all of its generated slots in one transaction.
/// Returns (event id, number of slots).
pub async fn create_with_slots(pool: &PgPool, ngo_id: i64, new: &NewEvent) -> Result<(i64, usize), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let event_id: i64 = sqlx::query_scalar(
        "INSERT INTO events (ngo_id, title, description, location, start_date, end_date, \
                             category, max_volunteers, required_skills) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(ngo_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.location)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(&new.category)
    .bind(new.max_volunteers)
    .bind(&new.required_skills)
    .fetch_one(&mut *tx)
    .await?;

    let slots = generate_slots(new.start_date, new.end_date);
    for (start, end) in &slots {
        sqlx::query(
            "INSERT INTO time_slots (event_id, start_time, end_time, capacity) VALUES ($1, $2, $3, $4)",
        )
        .bind(event_id)
        .bind(start)
        .bind(end)
        .bind(new.max_volunteers)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok((event_id, slots.len()))
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Event>, sqlx::Error> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
    sqlx::query_as::<_, Event>(&sql).bind(id).fetch_optional(pool).await
}

/// Every event an NGO owns, newest first. `limit = None` returns all.
pub async fn find_for_ngo(pool: &PgPool, ngo_id: i64, limit: Option<i64>) -> Result<Vec<Event>, sqlx::Error> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE ngo_id = $1 \
         ORDER BY created_at DESC, id DESC LIMIT $2"
    );
    sqlx::query_as::<_, Event>(&sql)
        .bind(ngo_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Bookable events of one NGO, soonest first (the public opportunities page).
pub async fn find_active_for_ngo(pool: &PgPool, ngo_id: i64) -> Result<Vec<Event>, sqlx::Error> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events \
         WHERE ngo_id = $1 AND is_active AND status = 'active' \
         ORDER BY start_date ASC, id ASC"
    );
    sqlx::query_as::<_, Event>(&sql).bind(ngo_id).fetch_all(pool).await
}

/// All bookable events with the organisation name, for the public JSON listing.
pub async fn list_active(pool: &PgPool) -> Result<Vec<EventListing>, sqlx::Error> {
    sqlx::query_as::<_, EventListing>(
        "SELECT e.id, e.ngo_id, e.title, e.description, e.location, e.category, \
                e.start_date, e.end_date, n.organization_name AS ngo_name \
         FROM events e \
         JOIN ngos n ON n.id = e.ngo_id \
         WHERE e.is_active AND e.status = 'active' \
         ORDER BY e.start_date ASC, e.id ASC",
    )
    .fetch_all(pool)
    .await
}

/// Upcoming bookable events matching a volunteer's skills or interests.
pub async fn find_recommended(
    pool: &PgPool,
    skills: &[String],
    interests: &[String],
    today: NaiveDate,
    limit: i64,
) -> Result<Vec<EventListing>, sqlx::Error> {
    let skills: Vec<String> = skills.iter().map(|s| s.to_lowercase()).collect();
    let interests: Vec<String> = interests.iter().map(|s| s.to_lowercase()).collect();
    sqlx::query_as::<_, EventListing>(
        "SELECT e.id, e.ngo_id, e.title, e.description, e.location, e.category, \
                e.start_date, e.end_date, n.organization_name AS ngo_name \
         FROM events e \
         JOIN ngos n ON n.id = e.ngo_id \
         WHERE e.is_active AND e.status = 'active' \
           AND e.end_date >= $3 \
           AND (EXISTS (SELECT 1 FROM UNNEST(e.required_skills) rs WHERE LOWER(rs) = ANY($1)) \
                OR LOWER(e.category) = ANY($2)) \
         ORDER BY e.start_date ASC, e.id ASC \
         LIMIT $4",
    )
    .bind(&skills)
    .bind(&interests)
    .bind(today)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Apply an edit. Open slots follow the new capacity but never drop below their bookings.
pub async fn update(pool: &PgPool, id: i64, upd: &EventUpdate) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE events SET title = $2, description = $3, location = $4, category = $5, \
                           max_volunteers = $6, required_skills = $7, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&upd.title)
    .bind(&upd.description)
    .bind(&upd.location)
    .bind(&upd.category)
    .bind(upd.max_volunteers)
    .bind(&upd.required_skills)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE time_slots SET capacity = GREATEST($2, booked_count, 1) \
         WHERE event_id = $1 AND NOT is_closed",
    )
    .bind(id)
    .bind(upd.max_volunteers)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Flip the active flag of a non-cancelled event. Returns the new value.
pub async fn toggle_active(pool: &PgPool, id: i64) -> Result<Option<bool>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE events SET is_active = NOT is_active, updated_at = NOW() \
         WHERE id = $1 AND status = 'active' RETURNING is_active",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Cancel an event: deactivate it, close its slots and cancel live bookings.
/// Rows are kept for history.
pub async fn cancel(pool: &PgPool, id: i64) -> Result<CancelOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Waits out in-flight bookings on these slots; later ones see them closed.
    sqlx::query("SELECT id FROM time_slots WHERE event_id = $1 ORDER BY id FOR UPDATE")
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE events SET status = 'cancelled', is_active = FALSE, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let cancelled_bookings = sqlx::query(
        "UPDATE bookings SET status = 'cancelled', updated_at = NOW() \
         WHERE event_id = $1 AND status = 'booked'",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let closed_slots = sqlx::query(
        "UPDATE time_slots SET is_closed = TRUE, \
                booked_count = (SELECT COUNT(*) FROM bookings b \
                                WHERE b.slot_id = time_slots.id AND b.status = 'attended') \
         WHERE event_id = $1",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    Ok(CancelOutcome { closed_slots, cancelled_bookings })
}

pub async fn find_slots(pool: &PgPool, event_id: i64) -> Result<Vec<TimeSlot>, sqlx::Error> {
    let sql = format!("SELECT {SLOT_COLUMNS} FROM time_slots WHERE event_id = $1 ORDER BY start_time, id");
    sqlx::query_as::<_, TimeSlot>(&sql).bind(event_id).fetch_all(pool).await
}

/// Slots a volunteer could still book at `now`: not closed, not full, not started.
pub async fn find_open_slots(pool: &PgPool, event_id: i64, now: DateTime<Utc>) -> Result<Vec<TimeSlot>, sqlx::Error> {
    let sql = format!(
        "SELECT {SLOT_COLUMNS} FROM time_slots \
         WHERE event_id = $1 AND NOT is_closed AND booked_count < capacity AND start_time > $2 \
         ORDER BY start_time, id"
    );
    sqlx::query_as::<_, TimeSlot>(&sql)
        .bind(event_id)
        .bind(now)
        .fetch_all(pool)
        .await
}

pub async fn find_slot(pool: &PgPool, slot_id: i64) -> Result<Option<TimeSlot>, sqlx::Error> {
    let sql = format!("SELECT {SLOT_COLUMNS} FROM time_slots WHERE id = $1");
    sqlx::query_as::<_, TimeSlot>(&sql).bind(slot_id).fetch_optional(pool).await
}

/// Close every slot whose end time is at or before `now`. Returns how many were closed.
pub async fn close_finished_slots(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE time_slots SET is_closed = TRUE WHERE NOT is_closed AND end_time <= $1")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
