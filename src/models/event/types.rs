use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub ngo_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: String,
    pub max_volunteers: i32,
    pub required_skills: Vec<String>,
    pub is_active: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_cancelled(&self) -> bool {
        self.status == "cancelled"
    }

    /// Listed publicly and open for booking.
    pub fn is_bookable(&self) -> bool {
        self.is_active && !self.is_cancelled()
    }
}

/// Public event listing with the owning organisation's name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventListing {
    pub id: i64,
    pub ngo_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ngo_name: String,
}

/// A fixed two-hour bookable unit of an event.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TimeSlot {
    pub id: i64,
    pub event_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: i32,
    pub booked_count: i32,
    pub is_closed: bool,
}

impl TimeSlot {
    pub fn available_spots(&self) -> i32 {
        (self.capacity - self.booked_count).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.booked_count >= self.capacity
    }
}

/// Validated input for a new event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: String,
    pub max_volunteers: i32,
    pub required_skills: Vec<String>,
}

/// Editable fields once slots exist; dates are fixed at creation.
#[derive(Debug, Clone)]
pub struct EventUpdate {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub max_volunteers: i32,
    pub required_skills: Vec<String>,
}

/// Create/edit form. Dates arrive as `YYYY-MM-DD`; skills as a comma-separated list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub category: String,
    pub max_volunteers: String,
    #[serde(default)]
    pub required_skills: String,
    pub csrf_token: String,
}

/// What an event cancellation touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancelOutcome {
    pub closed_slots: u64,
    pub cancelled_bookings: u64,
}
