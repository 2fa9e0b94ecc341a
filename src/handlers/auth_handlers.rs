use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use super::see_other;
use crate::auth::rate_limit::LoginLimiter;
use crate::auth::session::{get_user_id, set_flash, sign_in};
use crate::auth::{csrf, password};
use crate::errors::{AppError, render};
use crate::models::user::{self, NewUser, RegisterForm};
use crate::templates_structs::{LoginTemplate, PageContext, RegisterTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn client_ip(req: &HttpRequest) -> std::net::IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED))
}

fn login_error(session: &Session, message: &str, email: &str) -> Result<HttpResponse, AppError> {
    let tmpl = LoginTemplate {
        ctx: PageContext::build(session, "/login"),
        error: Some(message.to_string()),
        email: email.to_string(),
    };
    render(tmpl)
}

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    if get_user_id(&session).is_some() {
        return Ok(see_other("/dashboard"));
    }
    let tmpl = LoginTemplate { ctx: PageContext::build(&session, "/login"), error: None, email: String::new() };
    render(tmpl)
}

pub async fn login_submit(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<LoginLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Checked before touching the database.
    let ip = client_ip(&req);
    if limiter.is_blocked(ip) {
        log::warn!("Login blocked for {ip}: too many failures");
        return login_error(&session, "Too many failed login attempts. Please try again later.", &form.email);
    }

    let found = user::find_by_email(&pool, &form.email).await?;
    let stored = found.as_ref().map(|u| u.password_hash.as_str());
    let password_ok = password::check_login(&form.password, stored);
    let u = match found {
        Some(u) if password_ok => u,
        _ => {
            limiter.record_failure(ip);
            return login_error(&session, "Invalid email or password", &form.email);
        }
    };

    if !u.is_active {
        log::info!("Rejected login for deactivated user {}", u.id);
        return login_error(&session, "This account has been deactivated.", &form.email);
    }

    limiter.clear(ip);
    sign_in(&session, &u)?;
    csrf::rotate_token(&session);
    user::touch_last_login(&pool, u.id).await?;
    log::info!("User {} ({}) logged in", u.id, u.role.as_str());

    Ok(see_other("/dashboard"))
}

pub async fn register_page(session: Session) -> Result<HttpResponse, AppError> {
    if get_user_id(&session).is_some() {
        return Ok(see_other("/dashboard"));
    }
    let tmpl = RegisterTemplate {
        ctx: PageContext::build(&session, "/register"),
        errors: vec![],
        form: RegisterForm { role: "volunteer".to_string(), ..Default::default() },
    };
    render(tmpl)
}

pub async fn register_submit(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let form = form.into_inner();

    let rerender = |errors: Vec<String>, form: RegisterForm| {
        let tmpl = RegisterTemplate {
            ctx: PageContext::build(&session, "/register"),
            errors,
            form: RegisterForm { password: String::new(), ..form },
        };
        render(tmpl)
    };

    let (role, profile) = match form.validate() {
        Ok(v) => v,
        Err(errors) => return rerender(errors, form),
    };

    let password_hash = password::hash_password(&form.password).map_err(AppError::Hash)?;
    let new = NewUser {
        email: form.email.clone(),
        password_hash,
        role,
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        phone: form.phone.clone(),
    };

    match user::register(&pool, &new, &profile).await {
        Ok(id) => {
            log::info!("Registered user {id} as {}", role.as_str());
            set_flash(&session, "Registration successful! Please log in.");
            Ok(see_other("/login"))
        }
        Err(AppError::Validation(errors)) => rerender(errors, form),
        Err(e) => Err(e),
    }
}

pub async fn logout(session: Session, form: web::Form<CsrfOnly>) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(see_other("/login"))
}

/// Link-style logout kept for plain anchors.
pub async fn logout_link(session: Session) -> HttpResponse {
    session.purge();
    see_other("/")
}
