use actix_web::{middleware::from_fn, web};

use crate::auth::middleware::require_auth;
use crate::handlers::{
    admin_handlers, api, auth_handlers, chat_handlers, dashboard, directory_handlers, donor_handlers, event_handlers,
    health,
};

/// Every route of the application. Session middleware and app data are added by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Public pages
    cfg.route("/health", web::get().to(health))
        .route("/", web::get().to(directory_handlers::home))
        .route("/about", web::get().to(directory_handlers::about))
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/register", web::get().to(auth_handlers::register_page))
        .route("/register", web::post().to(auth_handlers::register_submit))
        .route("/logout", web::get().to(auth_handlers::logout_link))
        .route("/ngos", web::get().to(directory_handlers::ngos))
        .route("/ngos/{id}/opportunities", web::get().to(directory_handlers::opportunities))
        .route("/events/{id}", web::get().to(directory_handlers::event_detail))
        .route("/volunteers/leaderboard", web::get().to(directory_handlers::leaderboard))
        .route("/ws/chat", web::get().to(chat_handlers::ws_connect));

    // JSON API
    cfg.configure(api::configure);

    // Protected routes
    cfg.service(
        web::scope("")
            .wrap(from_fn(require_auth))
            .route("/logout", web::post().to(auth_handlers::logout))
            .route("/dashboard", web::get().to(dashboard::index))
            .route("/admin/dashboard", web::get().to(dashboard::admin))
            .route("/ngo/dashboard", web::get().to(dashboard::ngo))
            .route("/volunteer/dashboard", web::get().to(dashboard::volunteer))
            .route("/donor/dashboard", web::get().to(dashboard::donor))
            .route("/volunteer/achievements", web::get().to(directory_handlers::achievements))
            // NGO events: /ngo/events/new BEFORE /ngo/events/{id}
            .route("/ngo/events", web::get().to(event_handlers::list))
            .route("/ngo/events", web::post().to(event_handlers::create))
            .route("/ngo/events/new", web::get().to(event_handlers::new_form))
            .route("/ngo/events/{id}", web::get().to(event_handlers::detail))
            .route("/ngo/events/{id}/edit", web::get().to(event_handlers::edit_form))
            .route("/ngo/events/{id}/edit", web::post().to(event_handlers::update))
            .route("/ngo/events/{id}/toggle-status", web::post().to(event_handlers::toggle_status))
            .route("/ngo/events/{id}/cancel", web::post().to(event_handlers::cancel))
            .route("/ngo/events/{id}/delete", web::post().to(event_handlers::cancel))
            .route(
                "/ngo/events/{id}/bookings/{booking_id}/attended",
                web::post().to(event_handlers::mark_attended),
            )
            // Admin
            .route("/admin/users", web::get().to(admin_handlers::users))
            .route("/admin/users/{id}/deactivate", web::post().to(admin_handlers::deactivate_user))
            .route("/admin/users/{id}/activate", web::post().to(admin_handlers::activate_user))
            .route("/admin/ngos", web::get().to(admin_handlers::ngos))
            .route("/admin/ngos/{id}/verify", web::post().to(admin_handlers::verify_ngo))
            .route("/admin/ngos/{id}/unverify", web::post().to(admin_handlers::unverify_ngo))
            // Donor
            .route("/donor/donate", web::get().to(donor_handlers::donate_form))
            .route("/donor/donate", web::post().to(donor_handlers::donate_submit))
            // Messaging
            .route("/chat", web::get().to(chat_handlers::page))
            .route("/messages/{user_id}", web::get().to(chat_handlers::history))
            .default_service(web::to(directory_handlers::not_found)),
    );
}
