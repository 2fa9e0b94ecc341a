use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::types::*;
use crate::errors::is_unique_violation;

const BOOKING_COLUMNS: &str = "id, volunteer_id, slot_id, event_id, status, created_at, updated_at";

/// Slot row read under `FOR UPDATE`, with the parent event's state.
#[derive(sqlx::FromRow)]
struct LockedSlot {
    event_id: i64,
    start_time: DateTime<Utc>,
    capacity: i32,
    booked_count: i32,
    is_closed: bool,
    event_active: bool,
    event_status: String,
}

/// Reserve one seat of a slot for a volunteer.
///
/// The slot row stays locked from the availability check until commit, so two
/// requests racing for the last seat are serialised and the loser sees the
/// updated count. The parent event is share-locked alongside it, so an event
/// cancellation either waits for this booking to commit and then cancels it,
/// or commits first and this request sees the closed slot. The partial unique
/// index on live bookings backs up the duplicate check.
pub async fn book_slot(
    pool: &PgPool,
    volunteer_id: i64,
    slot_id: i64,
    event_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Booking, BookingError> {
    let mut tx = pool.begin().await?;

    let slot = sqlx::query_as::<_, LockedSlot>(
        "SELECT s.event_id, s.start_time, s.capacity, s.booked_count, s.is_closed, \
                e.is_active AS event_active, e.status AS event_status \
         FROM time_slots s \
         JOIN events e ON e.id = s.event_id \
         WHERE s.id = $1 \
         FOR UPDATE OF s FOR SHARE OF e",
    )
    .bind(slot_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(BookingError::SlotUnavailable)?;

    if event_id.is_some_and(|id| id != slot.event_id)
        || slot.is_closed
        || !slot.event_active
        || slot.event_status != "active"
    {
        return Err(BookingError::SlotUnavailable);
    }
    if slot.start_time <= now {
        return Err(BookingError::SlotExpired);
    }

    let already: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM bookings \
                        WHERE volunteer_id = $1 AND slot_id = $2 AND status <> 'cancelled')",
    )
    .bind(volunteer_id)
    .bind(slot_id)
    .fetch_one(&mut *tx)
    .await?;
    if already {
        return Err(BookingError::AlreadyBooked);
    }

    if slot.booked_count >= slot.capacity {
        return Err(BookingError::SlotFull);
    }

    let sql = format!(
        "INSERT INTO bookings (volunteer_id, slot_id, event_id, status) \
         VALUES ($1, $2, $3, 'booked') RETURNING {BOOKING_COLUMNS}"
    );
    let booking = match sqlx::query_as::<_, Booking>(&sql)
        .bind(volunteer_id)
        .bind(slot_id)
        .bind(slot.event_id)
        .fetch_one(&mut *tx)
        .await
    {
        Ok(b) => b,
        Err(e) if is_unique_violation(&e) => return Err(BookingError::AlreadyBooked),
        Err(e) => return Err(e.into()),
    };

    sqlx::query("UPDATE time_slots SET booked_count = booked_count + 1 WHERE id = $1")
        .bind(slot_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    log::info!(
        "Volunteer {} booked slot {} ({}/{} seats taken)",
        volunteer_id,
        slot_id,
        slot.booked_count + 1,
        slot.capacity
    );
    Ok(booking)
}

#[derive(sqlx::FromRow)]
struct LockedBooking {
    volunteer_id: i64,
    slot_id: i64,
    status: String,
}

/// Cancel a volunteer's own live booking before the slot starts, freeing its seat.
pub async fn cancel_booking(
    pool: &PgPool,
    booking_id: i64,
    volunteer_id: i64,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    let mut tx = pool.begin().await?;

    // Slot before booking: the same order event cancellation takes its locks in.
    let slot_id: i64 = sqlx::query_scalar("SELECT slot_id FROM bookings WHERE id = $1")
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BookingError::NotFound)?;
    let start_time: DateTime<Utc> =
        sqlx::query_scalar("SELECT start_time FROM time_slots WHERE id = $1 FOR UPDATE")
            .bind(slot_id)
            .fetch_one(&mut *tx)
            .await?;

    let booking = sqlx::query_as::<_, LockedBooking>(
        "SELECT volunteer_id, slot_id, status FROM bookings WHERE id = $1 FOR UPDATE",
    )
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await?
    .filter(|b| b.volunteer_id == volunteer_id && b.slot_id == slot_id)
    .ok_or(BookingError::NotFound)?;

    let status = BookingStatus::parse(&booking.status).unwrap_or(BookingStatus::Cancelled);
    if !status.can_become(BookingStatus::Cancelled) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            to: BookingStatus::Cancelled,
        });
    }
    if start_time <= now {
        return Err(BookingError::SlotExpired);
    }

    sqlx::query("UPDATE bookings SET status = 'cancelled', updated_at = NOW() WHERE id = $1")
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE time_slots SET booked_count = booked_count - 1 WHERE id = $1 AND booked_count > 0")
        .bind(booking.slot_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct AttendanceTarget {
    status: String,
    start_time: DateTime<Utc>,
}

/// Record attendance. Only the NGO owning the booking's event may do this, and
/// only once the booked slot has started.
pub async fn mark_attended(
    pool: &PgPool,
    booking_id: i64,
    ngo_id: i64,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    let target = sqlx::query_as::<_, AttendanceTarget>(
        "SELECT b.status, s.start_time FROM bookings b \
         JOIN events e ON e.id = b.event_id \
         JOIN time_slots s ON s.id = b.slot_id \
         WHERE b.id = $1 AND e.ngo_id = $2",
    )
    .bind(booking_id)
    .bind(ngo_id)
    .fetch_optional(pool)
    .await?
    .ok_or(BookingError::NotFound)?;
    let current = target.status;

    let status = BookingStatus::parse(&current).unwrap_or(BookingStatus::Cancelled);
    if !status.can_become(BookingStatus::Attended) {
        return Err(BookingError::InvalidTransition { from: current, to: BookingStatus::Attended });
    }
    if target.start_time > now {
        return Err(BookingError::NotStarted);
    }

    // Guarded on status so a concurrent cancel wins cleanly.
    let updated = sqlx::query(
        "UPDATE bookings SET status = 'attended', updated_at = NOW() WHERE id = $1 AND status = 'booked'",
    )
    .bind(booking_id)
    .execute(pool)
    .await?
    .rows_affected();
    if updated == 0 {
        return Err(BookingError::InvalidTransition { from: "cancelled".into(), to: BookingStatus::Attended });
    }
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Booking>, sqlx::Error> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
    sqlx::query_as::<_, Booking>(&sql).bind(id).fetch_optional(pool).await
}

/// A volunteer's bookings, soonest slot first. `status = None` returns every status.
pub async fn find_for_volunteer(
    pool: &PgPool,
    volunteer_id: i64,
    status: Option<BookingStatus>,
    limit: i64,
) -> Result<Vec<BookingDetail>, sqlx::Error> {
    sqlx::query_as::<_, BookingDetail>(
        "SELECT b.id, b.status, e.id AS event_id, e.title AS event_title, e.location, \
                s.id AS slot_id, s.start_time, s.end_time \
         FROM bookings b \
         JOIN time_slots s ON s.id = b.slot_id \
         JOIN events e ON e.id = b.event_id \
         WHERE b.volunteer_id = $1 AND ($2::TEXT IS NULL OR b.status = $2) \
         ORDER BY s.start_time ASC, b.id ASC \
         LIMIT $3",
    )
    .bind(volunteer_id)
    .bind(status.map(|s| s.as_str()))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn find_for_event(pool: &PgPool, event_id: i64) -> Result<Vec<EventBooking>, sqlx::Error> {
    sqlx::query_as::<_, EventBooking>(
        "SELECT b.id, b.status, s.id AS slot_id, s.start_time, \
                TRIM(u.first_name || ' ' || u.last_name) AS volunteer_name, \
                u.email AS volunteer_email \
         FROM bookings b \
         JOIN time_slots s ON s.id = b.slot_id \
         JOIN volunteers v ON v.id = b.volunteer_id \
         JOIN users u ON u.id = v.user_id \
         WHERE b.event_id = $1 \
         ORDER BY s.start_time ASC, b.id ASC",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await
}
