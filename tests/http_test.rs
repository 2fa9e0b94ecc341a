//! Request-level checks: routing, auth gates, the JSON content-type guard and
//! CSRF on form posts. Most need no database rows; the signed-in flows run
//! against a test schema when `TEST_DATABASE_URL` is set.

mod common;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{
    App,
    cookie::{Cookie, Key},
    dev::ServiceResponse,
    http::StatusCode,
    test, web,
};
use sqlx::postgres::PgPoolOptions;

use ngoconnect::auth::rate_limit::LoginLimiter;
use ngoconnect::chat::ChatHub;
use ngoconnect::config::Config;
use ngoconnect::models::{booking, event, user};
use ngoconnect::routes;

use common::*;

macro_rules! app {
    () => {{
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/ngoconnect_unused")
            .expect("lazy pool");
        app!(pool)
    }};
    ($pool:expr) => {{
        let config = Config::from_lookup(|_| None).expect("default config");
        test::init_service(
            App::new()
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                )
                .app_data(web::Data::new($pool))
                .app_data(web::Data::new(LoginLimiter::default()))
                .app_data(web::Data::new(ChatHub::new()))
                .app_data(web::Data::new(config))
                .configure(routes::configure),
        )
        .await
    }};
}

fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response().cookies().find(|c| c.name() == "id").map(|c| c.into_owned())
}

fn form_token(html: &str) -> String {
    let marker = "name=\"csrf_token\" value=\"";
    let start = html.find(marker).expect("token field") + marker.len();
    html[start..].split('"').next().expect("token value").to_string()
}

#[actix_rt::test]
async fn health_reports_ok() {
    let app = app!();
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn booking_requires_a_volunteer_session() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/book-slot")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"slot_id": 1, "event_id": 1}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Login required");
}

#[actix_rt::test]
async fn api_mutations_must_be_json() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/bookings/7/cancel")
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload("x=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn dashboards_redirect_anonymous_visitors_to_login() {
    let app = app!();
    for uri in ["/dashboard", "/ngo/events", "/admin/users", "/donor/donate", "/chat"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(resp.headers().get("Location").and_then(|v| v.to_str().ok()), Some("/login"));
    }
}

#[actix_rt::test]
async fn chat_socket_needs_a_session() {
    let app = app!();
    let req = test::TestRequest::get().uri("/ws/chat").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn login_page_renders_a_form_token() {
    let app = app!();
    let req = test::TestRequest::get().uri("/login").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("name=\"csrf_token\""));
    assert!(html.contains("NGO Connect"));
}

#[actix_rt::test]
async fn login_post_without_matching_token_is_forbidden() {
    let app = app!();
    let form = serde_urlencoded::to_string([
        ("email", "someone@example.org"),
        ("password", "irrelevant"),
        ("csrf_token", "forged"),
    ])
    .expect("encode form");
    let req = test::TestRequest::post()
        .uri("/login")
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn deactivation_ends_an_existing_session() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool().clone();
    let (_, ngo_id) = create_ngo(&pool, "host@ngo.test", "Host Org").await;
    let event_id = create_event(&pool, ngo_id, 4, 5).await;
    let slots = event::find_slots(&pool, event_id).await.expect("slots");
    let (user_id, volunteer_id) = create_volunteer_with_password(&pool, "late@vol.test", "river-cleanup-42").await;
    let app = app!(pool.clone());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
    let cookie = session_cookie(&resp).expect("session cookie");
    let body = test::read_body(resp).await;
    let token = form_token(&String::from_utf8_lossy(&body));

    let form = serde_urlencoded::to_string([
        ("email", "late@vol.test"),
        ("password", "river-cleanup-42"),
        ("csrf_token", token.as_str()),
    ])
    .expect("encode form");
    let req = test::TestRequest::post()
        .uri("/login")
        .cookie(cookie)
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let signed_in = session_cookie(&resp).expect("signed-in cookie");

    let book = |slot_id: i64| {
        test::TestRequest::post()
            .uri("/api/book-slot")
            .cookie(signed_in.clone())
            .insert_header(("Content-Type", "application/json"))
            .set_payload(serde_json::json!({ "slot_id": slot_id, "event_id": event_id }).to_string())
            .to_request()
    };
    let resp = test::call_service(&app, book(slots[0].id)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    user::set_active(&pool, user_id, false).await.expect("deactivate");

    let resp = test::call_service(&app, book(slots[1].id)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get().uri("/dashboard").cookie(signed_in.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("Location").and_then(|v| v.to_str().ok()), Some("/login"));

    let req = test::TestRequest::get().uri("/ws/chat").cookie(signed_in.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let kept = booking::find_for_volunteer(&pool, volunteer_id, None, 10).await.expect("bookings");
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].slot_id, slots[0].id);

    db.teardown().await;
}
