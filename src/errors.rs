use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use askama::Template;
use std::fmt;

use crate::models::booking::BookingError;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Template(askama::Error),
    Hash(String),
    Session(String),
    PermissionDenied(String),
    Csrf(HttpResponse),
    Booking(BookingError),
    Validation(Vec<String>),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::PermissionDenied(what) => write!(f, "Permission denied: {what}"),
            AppError::Csrf(_) => write!(f, "Invalid or missing CSRF token"),
            AppError::Booking(e) => write!(f, "{e}"),
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors.join("; ")),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) | AppError::Csrf(_) => StatusCode::FORBIDDEN,
            AppError::Session(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Booking(e) => e.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().body("Not Found"),
            AppError::PermissionDenied(what) => {
                log::warn!("Permission denied: {what}");
                HttpResponse::Forbidden().json(serde_json::json!({ "error": "Access denied" }))
            }
            AppError::Csrf(_) => HttpResponse::Forbidden().body("Invalid or missing CSRF token"),
            AppError::Session(_) => HttpResponse::Unauthorized()
                .json(serde_json::json!({ "error": "Login required" })),
            AppError::Validation(errors) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Validation failed",
                "details": errors.join("; "),
            })),
            AppError::Booking(e) => HttpResponse::build(e.status_code())
                .json(serde_json::json!({ "error": e.to_string() })),
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<HttpResponse> for AppError {
    fn from(resp: HttpResponse) -> Self {
        AppError::Csrf(resp)
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::Db(db) => AppError::Db(db),
            other => AppError::Booking(other),
        }
    }
}

/// Render an Askama template into a 200 HTML response.
pub fn render<T: Template>(tmpl: T) -> Result<HttpResponse, AppError> {
    let body = tmpl.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// True when a sqlx error is a Postgres unique-constraint violation.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
