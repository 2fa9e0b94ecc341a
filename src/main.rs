use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use ngoconnect::auth::{password, rate_limit::LoginLimiter};
use ngoconnect::chat::ChatHub;
use ngoconnect::config::Config;
use ngoconnect::{db, jobs, routes};

fn session_key(secret: &str) -> Key {
    if secret.len() >= 64 {
        log::info!("Using SECRET_KEY for session signing");
        Key::from(secret.as_bytes())
    } else {
        log::warn!(
            "SECRET_KEY too short ({} bytes, need 64+), generating random key (sessions lost on restart)",
            secret.len()
        );
        Key::generate()
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let pool = db::init_pool(&config.database_url).await.map_err(std::io::Error::other)?;
    db::run_migrations(&pool).await.map_err(std::io::Error::other)?;

    let admin_hash = password::hash_password(&config.admin_password).map_err(std::io::Error::other)?;
    db::seed_admin(&pool, &config.admin_email, &admin_hash)
        .await
        .map_err(std::io::Error::other)?;

    if config.mail.username.is_empty() {
        log::info!("Mail not configured; outbound email is disabled");
    } else {
        log::info!(
            "Mail relay {}:{} (tls={}) as {}; outbound email is not sent by this service",
            config.mail.server,
            config.mail.port,
            config.mail.use_tls,
            config.mail.username
        );
    }

    let secret_key = session_key(&config.secret_key);
    let limiter = LoginLimiter::default();
    let hub = ChatHub::new();

    jobs::slot_closer::spawn(pool.clone());

    let bind_addr = config.bind_addr.clone();
    let production = config.production;
    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
            .cookie_secure(production)
            .cookie_http_only(true)
            .build();

        let mut headers = middleware::DefaultHeaders::new()
            .add(("X-Content-Type-Options", "nosniff"))
            .add(("X-Frame-Options", "DENY"))
            .add(("X-XSS-Protection", "1; mode=block"));
        if production {
            headers = headers.add(("Strict-Transport-Security", "max-age=31536000; includeSubDomains"));
        }

        App::new()
            .wrap(session_mw)
            .wrap(headers)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(limiter.clone()))
            .app_data(web::Data::new(hub.clone()))
            .app_data(web::Data::new(config.clone()))
            .service(actix_files::Files::new("/static", "./static"))
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
