pub mod admin_handlers;
pub mod api;
pub mod auth_handlers;
pub mod chat_handlers;
pub mod dashboard;
pub mod directory_handlers;
pub mod donor_handlers;
pub mod event_handlers;

use actix_web::HttpResponse;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther().insert_header(("Location", location)).finish()
}
