use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use sqlx::PgPool;

use super::see_other;
use crate::auth::session::{require_login, role_or_redirect, set_flash};
use crate::errors::{AppError, render};
use crate::models::booking::{self, BookingStatus};
use crate::models::user::{self, Role};
use crate::models::{analytics, donation, event};
use crate::templates_structs::{
    AdminDashboardTemplate, DonorDashboardTemplate, NgoDashboardTemplate, PageContext, VolunteerDashboardTemplate,
};

/// Send each role to its own dashboard.
pub async fn index(session: Session) -> Result<HttpResponse, AppError> {
    let user = require_login(&session)?;
    Ok(see_other(user.role.dashboard_path()))
}

pub async fn admin(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    if let Err(resp) = role_or_redirect(&session, Role::Admin) {
        return Ok(resp);
    }
    let stats = analytics::platform_stats(&pool).await?;
    let top_volunteers = analytics::leaderboard(&pool, false, 5).await?;

    let tmpl = AdminDashboardTemplate { ctx: PageContext::build(&session, "/admin/dashboard"), stats, top_volunteers };
    render(tmpl)
}

pub async fn ngo(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let me = match role_or_redirect(&session, Role::Ngo) {
        Ok(u) => u,
        Err(resp) => return Ok(resp),
    };
    let Some(ngo) = user::find_ngo_by_user(&pool, me.id).await? else {
        return Ok(missing_profile(&session, "NGO"));
    };
    let stats = analytics::ngo_stats(&pool, ngo.id).await?;
    let recent_events = event::find_for_ngo(&pool, ngo.id, Some(5)).await?;

    let tmpl = NgoDashboardTemplate { ctx: PageContext::build(&session, "/ngo/dashboard"), ngo, stats, recent_events };
    render(tmpl)
}

pub async fn volunteer(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let me = match role_or_redirect(&session, Role::Volunteer) {
        Ok(u) => u,
        Err(resp) => return Ok(resp),
    };
    let Some(volunteer) = user::find_volunteer_by_user(&pool, me.id).await? else {
        return Ok(missing_profile(&session, "Volunteer"));
    };
    let now = Utc::now();
    let stats = analytics::volunteer_stats(&pool, volunteer.id, now).await?;
    let upcoming = booking::find_for_volunteer(&pool, volunteer.id, Some(BookingStatus::Booked), 5).await?;
    let recommended =
        event::find_recommended(&pool, &volunteer.skills, &volunteer.interests, now.date_naive(), 5).await?;

    let tmpl = VolunteerDashboardTemplate {
        ctx: PageContext::build(&session, "/volunteer/dashboard"),
        volunteer,
        stats,
        upcoming,
        recommended,
    };
    render(tmpl)
}

pub async fn donor(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let me = match role_or_redirect(&session, Role::Donor) {
        Ok(u) => u,
        Err(resp) => return Ok(resp),
    };
    let Some(donor) = user::find_donor_by_user(&pool, me.id).await? else {
        return Ok(missing_profile(&session, "Donor"));
    };
    let stats = analytics::donor_stats(&pool, donor.id).await?;
    let donations = donation::find_for_donor(&pool, donor.id).await?;

    let tmpl = DonorDashboardTemplate { ctx: PageContext::build(&session, "/donor/dashboard"), donor, stats, donations };
    render(tmpl)
}

/// A role account without its profile row can only come from manual edits; send it home.
fn missing_profile(session: &Session, label: &str) -> HttpResponse {
    log::warn!("{label} profile missing for session user");
    set_flash(session, &format!("{label} profile not found."));
    see_other("/")
}
