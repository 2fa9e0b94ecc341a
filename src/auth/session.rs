use actix_session::Session;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::user::{self, Role, User};

/// Identity stored in the signed session cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: i64,
    pub role: Role,
    pub display_name: String,
}

/// Write the logged-in identity into a fresh session.
pub fn sign_in(session: &Session, user: &User) -> Result<(), AppError> {
    session.renew();
    session
        .insert("user_id", user.id)
        .and_then(|_| session.insert("role", user.role.as_str()))
        .and_then(|_| session.insert("display_name", user.display_name()))
        .map_err(|e| AppError::Session(format!("Failed to write session: {e}")))
}

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

pub fn get_role(session: &Session) -> Option<Role> {
    session
        .get::<String>("role")
        .unwrap_or(None)
        .and_then(|r| Role::parse(&r))
}

pub fn current_user(session: &Session) -> Option<SessionUser> {
    let id = get_user_id(session)?;
    let role = get_role(session)?;
    let display_name = session
        .get::<String>("display_name")
        .unwrap_or(None)
        .unwrap_or_default();
    Some(SessionUser { id, role, display_name })
}

pub fn require_login(session: &Session) -> Result<SessionUser, AppError> {
    current_user(session).ok_or_else(|| AppError::Session("Not logged in".to_string()))
}

/// `require_login` plus a fresh look at the account, so a deactivated user's
/// cookie stops working at once. A rejected session is purged.
pub async fn require_active_login(pool: &PgPool, session: &Session) -> Result<SessionUser, AppError> {
    let current = require_login(session)?;
    if user::is_active(pool, current.id).await? {
        Ok(current)
    } else {
        session.purge();
        Err(AppError::Session(format!("User {} is deactivated", current.id)))
    }
}

pub async fn require_active_role(pool: &PgPool, session: &Session, role: Role) -> Result<SessionUser, AppError> {
    require_active_login(pool, session).await?;
    require_role(session, role)
}

/// Check the session role; returns Err(AppError::PermissionDenied) for any other role.
pub fn require_role(session: &Session, role: Role) -> Result<SessionUser, AppError> {
    let user = require_login(session)?;
    if user.role == role {
        Ok(user)
    } else {
        Err(AppError::PermissionDenied(format!(
            "{} privileges required (user {} is {})",
            role.label(),
            user.id,
            user.role.as_str()
        )))
    }
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert("flash", message);
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}

/// Page-route role gate: flash a message and bounce to /dashboard instead of a bare 403.
pub fn role_or_redirect(session: &Session, role: Role) -> Result<SessionUser, actix_web::HttpResponse> {
    match require_role(session, role) {
        Ok(user) => Ok(user),
        Err(e) => {
            log::info!("{e}");
            set_flash(session, &format!("Access denied. {} privileges required.", role.label()));
            Err(actix_web::HttpResponse::SeeOther()
                .insert_header(("Location", "/dashboard"))
                .finish())
        }
    }
}
