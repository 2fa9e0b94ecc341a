use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use sqlx::PgPool;

use crate::auth::session::require_active_role;
use crate::errors::AppError;
use crate::models::booking::{self, BookSlotRequest};
use crate::models::user::{self, Role};

/// POST /api/book-slot - reserve a seat for the logged-in volunteer
pub async fn book(
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Json<BookSlotRequest>,
) -> Result<HttpResponse, AppError> {
    let me = require_active_role(&pool, &session, Role::Volunteer).await?;

    let Some(slot_id) = body.slot_id else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "error": "Missing slot_id" })));
    };
    let volunteer = user::find_volunteer_by_user(&pool, me.id)
        .await?
        .ok_or_else(|| AppError::Validation(vec!["Volunteer profile not found".to_string()]))?;

    let booked = booking::book_slot(&pool, volunteer.id, slot_id, body.event_id, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Slot booked successfully",
        "booking_id": booked.id,
        "slot_id": booked.slot_id,
        "event_id": booked.event_id,
    })))
}

/// POST /api/bookings/{id}/cancel - release the volunteer's own booking
pub async fn cancel(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let me = require_active_role(&pool, &session, Role::Volunteer).await?;
    let volunteer = user::find_volunteer_by_user(&pool, me.id)
        .await?
        .ok_or_else(|| AppError::Validation(vec!["Volunteer profile not found".to_string()]))?;

    let booking_id = path.into_inner();
    booking::cancel_booking(&pool, booking_id, volunteer.id, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Booking cancelled",
        "booking_id": booking_id,
    })))
}
