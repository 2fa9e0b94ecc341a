use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::models::event::slots::SLOT_HOURS;

pub const POINTS_PER_ATTENDANCE: i64 = 10;
pub const POINTS_PER_BOOKING: i64 = 2;

// ---------- Types ----------

#[derive(Debug, Clone, Default, Serialize)]
pub struct VolunteerStats {
    pub total_hours: i64,
    pub attended: i64,
    pub upcoming: i64,
    pub bookings_made: i64,
    pub points: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NgoStats {
    pub events: i64,
    pub active_events: i64,
    pub slots: i64,
    pub bookings: i64,
    pub attended: i64,
    pub donations_total: Decimal,
    pub donation_count: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DonorStats {
    pub donation_count: i64,
    pub total_amount: Decimal,
    pub ngos_supported: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformStats {
    pub users_by_role: Vec<(String, i64)>,
    pub ngos: i64,
    pub verified_ngos: i64,
    pub events: i64,
    pub bookings: i64,
    pub donations_total: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub volunteer_id: i64,
    pub name: String,
    pub attended: i64,
    pub live_bookings: i64,
}

impl LeaderboardEntry {
    pub fn hours(&self) -> i64 {
        self.attended * SLOT_HOURS
    }

    pub fn points(&self) -> i64 {
        points(self.attended, self.live_bookings)
    }
}

/// Attendance earns the bulk; every booking that was not cancelled adds a little.
pub fn points(attended: i64, live_bookings: i64) -> i64 {
    attended * POINTS_PER_ATTENDANCE + live_bookings * POINTS_PER_BOOKING
}

// ---------- Queries ----------

#[derive(sqlx::FromRow)]
struct VolunteerCounts {
    attended: i64,
    upcoming: i64,
    live: i64,
}

pub async fn volunteer_stats(pool: &PgPool, volunteer_id: i64, now: DateTime<Utc>) -> Result<VolunteerStats, sqlx::Error> {
    let c = sqlx::query_as::<_, VolunteerCounts>(
        "SELECT COUNT(*) FILTER (WHERE b.status = 'attended') AS attended, \
                COUNT(*) FILTER (WHERE b.status = 'booked' AND s.start_time > $2) AS upcoming, \
                COUNT(*) FILTER (WHERE b.status <> 'cancelled') AS live \
         FROM bookings b \
         JOIN time_slots s ON s.id = b.slot_id \
         WHERE b.volunteer_id = $1",
    )
    .bind(volunteer_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(VolunteerStats {
        total_hours: c.attended * SLOT_HOURS,
        attended: c.attended,
        upcoming: c.upcoming,
        bookings_made: c.live,
        points: points(c.attended, c.live),
    })
}

#[derive(sqlx::FromRow)]
struct NgoCounts {
    events: i64,
    active_events: i64,
    slots: i64,
    bookings: i64,
    attended: i64,
    donations_total: Decimal,
    donation_count: i64,
}

pub async fn ngo_stats(pool: &PgPool, ngo_id: i64) -> Result<NgoStats, sqlx::Error> {
    let c = sqlx::query_as::<_, NgoCounts>(
        "SELECT \
            (SELECT COUNT(*) FROM events WHERE ngo_id = $1) AS events, \
            (SELECT COUNT(*) FROM events WHERE ngo_id = $1 AND is_active AND status = 'active') AS active_events, \
            (SELECT COUNT(*) FROM time_slots s JOIN events e ON e.id = s.event_id WHERE e.ngo_id = $1) AS slots, \
            (SELECT COUNT(*) FROM bookings b JOIN events e ON e.id = b.event_id \
              WHERE e.ngo_id = $1 AND b.status <> 'cancelled') AS bookings, \
            (SELECT COUNT(*) FROM bookings b JOIN events e ON e.id = b.event_id \
              WHERE e.ngo_id = $1 AND b.status = 'attended') AS attended, \
            (SELECT COALESCE(SUM(amount), 0) FROM donations WHERE ngo_id = $1) AS donations_total, \
            (SELECT COUNT(*) FROM donations WHERE ngo_id = $1) AS donation_count",
    )
    .bind(ngo_id)
    .fetch_one(pool)
    .await?;

    Ok(NgoStats {
        events: c.events,
        active_events: c.active_events,
        slots: c.slots,
        bookings: c.bookings,
        attended: c.attended,
        donations_total: c.donations_total,
        donation_count: c.donation_count,
    })
}

pub async fn donor_stats(pool: &PgPool, donor_id: i64) -> Result<DonorStats, sqlx::Error> {
    let (donation_count, total_amount, ngos_supported) = sqlx::query_as::<_, (i64, Decimal, i64)>(
        "SELECT COUNT(*), COALESCE(SUM(amount), 0), COUNT(DISTINCT ngo_id) \
         FROM donations WHERE donor_id = $1",
    )
    .bind(donor_id)
    .fetch_one(pool)
    .await?;

    Ok(DonorStats { donation_count, total_amount, ngos_supported })
}

pub async fn platform_stats(pool: &PgPool) -> Result<PlatformStats, sqlx::Error> {
    let users_by_role = sqlx::query_as::<_, (String, i64)>(
        "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role",
    )
    .fetch_all(pool)
    .await?;

    let (ngos, verified_ngos, events, bookings, donations_total) =
        sqlx::query_as::<_, (i64, i64, i64, i64, Decimal)>(
            "SELECT \
                (SELECT COUNT(*) FROM ngos), \
                (SELECT COUNT(*) FROM ngos WHERE is_verified), \
                (SELECT COUNT(*) FROM events), \
                (SELECT COUNT(*) FROM bookings WHERE status <> 'cancelled'), \
                (SELECT COALESCE(SUM(amount), 0) FROM donations)",
        )
        .fetch_one(pool)
        .await?;

    Ok(PlatformStats { users_by_role, ngos, verified_ngos, events, bookings, donations_total })
}

/// Top volunteers ranked by points (`by_hours = false`) or by attended hours.
pub async fn leaderboard(pool: &PgPool, by_hours: bool, limit: i64) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    let order = if by_hours {
        "attended DESC, live_bookings DESC".to_string()
    } else {
        format!("(attended * {POINTS_PER_ATTENDANCE} + live_bookings * {POINTS_PER_BOOKING}) DESC, attended DESC")
    };
    let sql = format!(
        "SELECT * FROM ( \
             SELECT v.id AS volunteer_id, \
                    TRIM(u.first_name || ' ' || u.last_name) AS name, \
                    COUNT(b.id) FILTER (WHERE b.status = 'attended') AS attended, \
                    COUNT(b.id) FILTER (WHERE b.status <> 'cancelled') AS live_bookings \
             FROM volunteers v \
             JOIN users u ON u.id = v.user_id \
             LEFT JOIN bookings b ON b.volunteer_id = v.id \
             WHERE u.is_active \
             GROUP BY v.id, u.first_name, u.last_name \
         ) ranked \
         WHERE live_bookings > 0 \
         ORDER BY {order}, volunteer_id ASC \
         LIMIT $1"
    );
    sqlx::query_as::<_, LeaderboardEntry>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await
}
