pub mod bookings;
pub mod events;

use actix_web::web;

use crate::auth::middleware::require_json_content_type;

/// JSON routes under `/api`. Reads are public; mutations check the session
/// themselves so an anonymous caller gets a JSON 401 rather than a redirect.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/events", web::get().to(events::list))
            .route("/events/{id}/slots", web::get().to(events::slots))
            .route("/book-slot", web::post().to(bookings::book))
            .route("/bookings/{id}/cancel", web::post().to(bookings::cancel)),
    );
}
