use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;

use super::see_other;
use crate::auth::session::{current_user, role_or_redirect, set_flash};
use crate::errors::{AppError, render};
use crate::models::user::{self, Role};
use crate::models::{analytics, booking, event};
use crate::templates_structs::{
    AboutTemplate, AchievementsTemplate, EventDetailTemplate, HomeTemplate, LeaderboardTemplate, NgoDirectoryTemplate,
    NotFoundTemplate, OpportunitiesTemplate, PageContext,
};

const LEADERBOARD_SIZE: i64 = 10;

pub async fn home(session: Session) -> Result<HttpResponse, AppError> {
    render(HomeTemplate { ctx: PageContext::build(&session, "/") })
}

pub async fn about(session: Session) -> Result<HttpResponse, AppError> {
    render(AboutTemplate { ctx: PageContext::build(&session, "/about") })
}

#[derive(Deserialize)]
pub struct DirectoryQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub city: String,
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s) }
}

pub async fn ngos(
    pool: web::Data<PgPool>,
    session: Session,
    query: web::Query<DirectoryQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let ngos = user::search_ngos(&pool, &query.q, non_empty(&query.category), non_empty(&query.city)).await?;
    let tmpl = NgoDirectoryTemplate {
        ctx: PageContext::build(&session, "/ngos"),
        ngos,
        q: query.q,
        category: query.category,
        city: query.city,
    };
    render(tmpl)
}

pub async fn opportunities(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let ngo = user::find_ngo_by_id(&pool, path.into_inner()).await?.ok_or(AppError::NotFound)?;
    let events = event::find_active_for_ngo(&pool, ngo.id).await?;
    render(OpportunitiesTemplate { ctx: PageContext::build(&session, "/ngos"), ngo, events })
}

/// Public event page. Only slots that can still be booked are listed.
pub async fn event_detail(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let ev = event::find_by_id(&pool, path.into_inner()).await?.ok_or(AppError::NotFound)?;
    let ngo = user::find_ngo_by_id(&pool, ev.ngo_id).await?.ok_or(AppError::NotFound)?;
    let slots = if ev.is_bookable() {
        event::find_open_slots(&pool, ev.id, Utc::now()).await?
    } else {
        vec![]
    };
    let can_book = ev.is_bookable() && current_user(&session).is_some_and(|u| u.role == Role::Volunteer);

    let tmpl = EventDetailTemplate { ctx: PageContext::build(&session, "/events"), event: ev, ngo, slots, can_book };
    render(tmpl)
}

pub async fn leaderboard(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let points_leaders = analytics::leaderboard(&pool, false, LEADERBOARD_SIZE).await?;
    let hours_leaders = analytics::leaderboard(&pool, true, LEADERBOARD_SIZE).await?;
    let tmpl = LeaderboardTemplate {
        ctx: PageContext::build(&session, "/volunteers/leaderboard"),
        points_leaders,
        hours_leaders,
    };
    render(tmpl)
}

pub async fn achievements(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let me = match role_or_redirect(&session, Role::Volunteer) {
        Ok(u) => u,
        Err(resp) => return Ok(resp),
    };
    let Some(volunteer) = user::find_volunteer_by_user(&pool, me.id).await? else {
        set_flash(&session, "Volunteer profile not found.");
        return Ok(see_other("/"));
    };
    let stats = analytics::volunteer_stats(&pool, volunteer.id, Utc::now()).await?;
    let recent_bookings = booking::find_for_volunteer(&pool, volunteer.id, None, 10).await?;

    let tmpl = AchievementsTemplate {
        ctx: PageContext::build(&session, "/volunteer/achievements"),
        stats,
        recent_bookings,
    };
    render(tmpl)
}

pub async fn not_found(session: Session) -> Result<HttpResponse, AppError> {
    let body = askama::Template::render(&NotFoundTemplate { ctx: PageContext::build(&session, "") })?;
    Ok(HttpResponse::NotFound().content_type("text/html; charset=utf-8").body(body))
}
