use actix_session::Session;
use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use super::auth_handlers::CsrfOnly;
use super::see_other;
use crate::auth::csrf;
use crate::auth::session::{role_or_redirect, set_flash};
use crate::errors::{AppError, render};
use crate::models::user::{self, Role};
use crate::templates_structs::{AdminNgosTemplate, AdminUsersTemplate, PageContext};

pub async fn users(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let me = match role_or_redirect(&session, Role::Admin) {
        Ok(u) => u,
        Err(resp) => return Ok(resp),
    };
    let users = user::list_all(&pool).await?;
    render(AdminUsersTemplate { ctx: PageContext::build(&session, "/admin/users"), users, current_user_id: me.id })
}

async fn set_user_active(
    pool: &PgPool,
    session: &Session,
    user_id: i64,
    csrf_token: &str,
    active: bool,
) -> Result<HttpResponse, AppError> {
    let me = match role_or_redirect(session, Role::Admin) {
        Ok(u) => u,
        Err(resp) => return Ok(resp),
    };
    csrf::validate_csrf(session, csrf_token)?;

    if user_id == me.id && !active {
        set_flash(session, "You cannot deactivate your own account.");
        return Ok(see_other("/admin/users"));
    }
    if !user::set_active(pool, user_id, active).await? {
        return Err(AppError::NotFound);
    }
    log::info!("Admin {} set user {} active={}", me.id, user_id, active);
    set_flash(session, if active { "User reactivated." } else { "User deactivated." });
    Ok(see_other("/admin/users"))
}

pub async fn deactivate_user(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    set_user_active(&pool, &session, path.into_inner(), &form.csrf_token, false).await
}

pub async fn activate_user(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    set_user_active(&pool, &session, path.into_inner(), &form.csrf_token, true).await
}

pub async fn ngos(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    if let Err(resp) = role_or_redirect(&session, Role::Admin) {
        return Ok(resp);
    }
    let ngos = user::list_ngos(&pool).await?;
    render(AdminNgosTemplate { ctx: PageContext::build(&session, "/admin/ngos"), ngos })
}

/// The only route that changes an NGO's verification flag.
async fn set_verified(
    pool: &PgPool,
    session: &Session,
    ngo_id: i64,
    csrf_token: &str,
    verified: bool,
) -> Result<HttpResponse, AppError> {
    let me = match role_or_redirect(session, Role::Admin) {
        Ok(u) => u,
        Err(resp) => return Ok(resp),
    };
    csrf::validate_csrf(session, csrf_token)?;

    if !user::set_ngo_verified(pool, ngo_id, verified).await? {
        return Err(AppError::NotFound);
    }
    log::info!("Admin {} set NGO {} verified={}", me.id, ngo_id, verified);
    set_flash(session, if verified { "NGO verified." } else { "NGO verification removed." });
    Ok(see_other("/admin/ngos"))
}

pub async fn verify_ngo(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    set_verified(&pool, &session, path.into_inner(), &form.csrf_token, true).await
}

pub async fn unverify_ngo(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    set_verified(&pool, &session, path.into_inner(), &form.csrf_token, false).await
}
