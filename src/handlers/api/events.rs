use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::event;

#[derive(Serialize)]
pub struct ApiEvent {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ngo_id: i64,
    pub ngo_name: String,
}

#[derive(Serialize)]
pub struct ApiSlot {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available_spots: i32,
}

/// GET /api/events - every active event
pub async fn list(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let events: Vec<ApiEvent> = event::list_active(&pool)
        .await?
        .into_iter()
        .map(|e| ApiEvent {
            id: e.id,
            title: e.title,
            description: e.description,
            location: e.location,
            category: e.category,
            start_date: e.start_date,
            end_date: e.end_date,
            ngo_id: e.ngo_id,
            ngo_name: e.ngo_name,
        })
        .collect();
    Ok(HttpResponse::Ok().json(events))
}

/// GET /api/events/{id}/slots - slots that can still be booked
pub async fn slots(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let ev = event::find_by_id(&pool, path.into_inner()).await?.ok_or(AppError::NotFound)?;
    if !ev.is_bookable() {
        return Ok(HttpResponse::Ok().json(Vec::<ApiSlot>::new()));
    }
    let slots: Vec<ApiSlot> = event::find_open_slots(&pool, ev.id, Utc::now())
        .await?
        .into_iter()
        .map(|s| ApiSlot {
            id: s.id,
            start_time: s.start_time,
            end_time: s.end_time,
            available_spots: s.available_spots(),
        })
        .collect();
    Ok(HttpResponse::Ok().json(slots))
}
