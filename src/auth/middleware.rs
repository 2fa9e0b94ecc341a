use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    error::ErrorInternalServerError,
    middleware::Next,
    web,
};
use sqlx::PgPool;

use crate::models::user;

/// Reject requests without a logged-in session, or whose account has since
/// been deactivated (that session is purged).
/// JSON routes under /api get a 401; pages are redirected to /login.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let user_id = session.get::<i64>("user_id").unwrap_or(None);

    let has_user = match (user_id, req.app_data::<web::Data<PgPool>>()) {
        (Some(id), Some(pool)) => {
            let active = user::is_active(pool, id).await.map_err(ErrorInternalServerError)?;
            if !active {
                log::info!("Dropping session of deactivated user {id}");
                session.purge();
            }
            active
        }
        (Some(_), None) => {
            log::error!("No database pool registered; cannot check account state");
            false
        }
        (None, _) => false,
    };

    if !has_user {
        let response = if req.path().starts_with("/api/") || req.path().starts_with("/messages/") {
            HttpResponse::Unauthorized().json(serde_json::json!({ "error": "Login required" }))
        } else {
            HttpResponse::SeeOther()
                .insert_header(("Location", "/login"))
                .finish()
        };
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Mutating JSON endpoints must declare `Content-Type: application/json`.
/// A cross-site HTML form cannot send that header, which stands in for a CSRF token.
pub async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::DELETE
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "error": "Content-Type must be application/json for mutation requests"
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
