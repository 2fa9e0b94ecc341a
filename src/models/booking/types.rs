use actix_web::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Booked,
    Attended,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "booked",
            BookingStatus::Attended => "attended",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<BookingStatus> {
        match s {
            "booked" => Some(BookingStatus::Booked),
            "attended" => Some(BookingStatus::Attended),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Only a live booking can move, and only forward.
    pub fn can_become(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Booked, BookingStatus::Attended) | (BookingStatus::Booked, BookingStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Booking {
    pub id: i64,
    pub volunteer_id: i64,
    pub slot_id: i64,
    pub event_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A volunteer's booking with the event and slot it refers to.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BookingDetail {
    pub id: i64,
    pub status: String,
    pub event_id: i64,
    pub event_title: String,
    pub location: String,
    pub slot_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A booking as the owning NGO sees it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventBooking {
    pub id: i64,
    pub status: String,
    pub slot_id: i64,
    pub start_time: DateTime<Utc>,
    pub volunteer_name: String,
    pub volunteer_email: String,
}

/// JSON body of POST /api/book-slot.
#[derive(Debug, Clone, Deserialize)]
pub struct BookSlotRequest {
    pub slot_id: Option<i64>,
    pub event_id: Option<i64>,
}

#[derive(Debug)]
pub enum BookingError {
    SlotFull,
    AlreadyBooked,
    SlotExpired,
    /// Missing or closed slot, inactive/cancelled event, or slot/event mismatch.
    SlotUnavailable,
    NotFound,
    /// Attendance recorded before the slot's start time.
    NotStarted,
    InvalidTransition { from: String, to: BookingStatus },
    Db(sqlx::Error),
}

impl BookingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::SlotFull
            | BookingError::AlreadyBooked
            | BookingError::SlotExpired
            | BookingError::NotStarted
            | BookingError::InvalidTransition { .. } => StatusCode::CONFLICT,
            BookingError::SlotUnavailable => StatusCode::BAD_REQUEST,
            BookingError::NotFound => StatusCode::NOT_FOUND,
            BookingError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingError::SlotFull => write!(f, "Slot is full"),
            BookingError::AlreadyBooked => write!(f, "You have already booked this slot"),
            BookingError::SlotExpired => write!(f, "Slot expired"),
            BookingError::SlotUnavailable => write!(f, "Slot not available"),
            BookingError::NotFound => write!(f, "Booking not found"),
            BookingError::NotStarted => write!(f, "Slot has not started yet"),
            BookingError::InvalidTransition { from, to } => {
                write!(f, "A {from} booking cannot be marked {}", to.as_str())
            }
            BookingError::Db(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(e: sqlx::Error) -> Self {
        BookingError::Db(e)
    }
}
