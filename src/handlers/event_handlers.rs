use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use sqlx::PgPool;

use super::auth_handlers::CsrfOnly;
use super::see_other;
use crate::auth::csrf;
use crate::auth::session::{role_or_redirect, set_flash};
use crate::errors::{AppError, render};
use crate::models::booking::{self, BookingError};
use crate::models::event::{self, Event, EventForm, slots};
use crate::models::user::{self, NgoProfile, Role};
use crate::templates_structs::{EventFormTemplate, NgoEventDetailTemplate, NgoEventListTemplate, PageContext};

/// Resolve the NGO profile behind the session, or the response to send instead.
async fn current_ngo(pool: &PgPool, session: &Session) -> Result<Result<NgoProfile, HttpResponse>, AppError> {
    let me = match role_or_redirect(session, Role::Ngo) {
        Ok(u) => u,
        Err(resp) => return Ok(Err(resp)),
    };
    match user::find_ngo_by_user(pool, me.id).await? {
        Some(ngo) => Ok(Ok(ngo)),
        None => {
            set_flash(session, "NGO profile not found.");
            Ok(Err(see_other("/")))
        }
    }
}

/// Load an event the NGO owns. Another NGO's event is a 403.
async fn owned_event(pool: &PgPool, ngo: &NgoProfile, event_id: i64) -> Result<Event, AppError> {
    let ev = event::find_by_id(pool, event_id).await?.ok_or(AppError::NotFound)?;
    if ev.ngo_id != ngo.id {
        return Err(AppError::PermissionDenied(format!("event {} belongs to another NGO (caller NGO {})", ev.id, ngo.id)));
    }
    Ok(ev)
}

fn form_from_event(ev: &Event) -> EventForm {
    EventForm {
        title: ev.title.clone(),
        description: ev.description.clone(),
        location: ev.location.clone(),
        start_date: ev.start_date.to_string(),
        end_date: ev.end_date.to_string(),
        category: ev.category.clone(),
        max_volunteers: ev.max_volunteers.to_string(),
        required_skills: ev.required_skills.join(", "),
        csrf_token: String::new(),
    }
}

pub async fn list(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let ngo = match current_ngo(&pool, &session).await? {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    let events = event::find_for_ngo(&pool, ngo.id, None).await?;
    render(NgoEventListTemplate { ctx: PageContext::build(&session, "/ngo/events"), events })
}

pub async fn new_form(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    if let Err(resp) = current_ngo(&pool, &session).await? {
        return Ok(resp);
    }
    let tmpl = EventFormTemplate {
        ctx: PageContext::build(&session, "/ngo/events"),
        form_action: "/ngo/events".to_string(),
        form_title: "Create Event".to_string(),
        editing: false,
        form: EventForm { max_volunteers: "10".to_string(), ..Default::default() },
        errors: vec![],
    };
    render(tmpl)
}

pub async fn create(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<EventForm>,
) -> Result<HttpResponse, AppError> {
    let ngo = match current_ngo(&pool, &session).await? {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let form = form.into_inner();

    let new = match slots::validate_new_event(&form, Utc::now().date_naive()) {
        Ok(n) => n,
        Err(errors) => {
            let tmpl = EventFormTemplate {
                ctx: PageContext::build(&session, "/ngo/events"),
                form_action: "/ngo/events".to_string(),
                form_title: "Create Event".to_string(),
                editing: false,
                form,
                errors,
            };
            return render(tmpl);
        }
    };

    let (event_id, slot_count) = event::create_with_slots(&pool, ngo.id, &new).await?;
    log::info!("NGO {} created event {} with {} slots", ngo.id, event_id, slot_count);
    set_flash(&session, &format!("Event created with {slot_count} time slots."));
    Ok(see_other(&format!("/ngo/events/{event_id}")))
}

pub async fn detail(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let ngo = match current_ngo(&pool, &session).await? {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    let ev = owned_event(&pool, &ngo, path.into_inner()).await?;
    let slots = event::find_slots(&pool, ev.id).await?;
    let bookings = booking::find_for_event(&pool, ev.id).await?;

    let tmpl = NgoEventDetailTemplate { ctx: PageContext::build(&session, "/ngo/events"), event: ev, slots, bookings };
    render(tmpl)
}

pub async fn edit_form(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let ngo = match current_ngo(&pool, &session).await? {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    let ev = owned_event(&pool, &ngo, path.into_inner()).await?;
    if ev.is_cancelled() {
        set_flash(&session, "Cancelled events cannot be edited.");
        return Ok(see_other(&format!("/ngo/events/{}", ev.id)));
    }

    let tmpl = EventFormTemplate {
        ctx: PageContext::build(&session, "/ngo/events"),
        form_action: format!("/ngo/events/{}/edit", ev.id),
        form_title: "Edit Event".to_string(),
        editing: true,
        form: form_from_event(&ev),
        errors: vec![],
    };
    render(tmpl)
}

pub async fn update(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<EventForm>,
) -> Result<HttpResponse, AppError> {
    let ngo = match current_ngo(&pool, &session).await? {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let ev = owned_event(&pool, &ngo, path.into_inner()).await?;
    if ev.is_cancelled() {
        set_flash(&session, "Cancelled events cannot be edited.");
        return Ok(see_other(&format!("/ngo/events/{}", ev.id)));
    }

    let form = form.into_inner();
    let upd = match slots::validate_event_update(&form) {
        Ok(u) => u,
        Err(errors) => {
            // Dates are not editable; show the stored ones again.
            let fixed = EventForm {
                start_date: ev.start_date.to_string(),
                end_date: ev.end_date.to_string(),
                ..form
            };
            let tmpl = EventFormTemplate {
                ctx: PageContext::build(&session, "/ngo/events"),
                form_action: format!("/ngo/events/{}/edit", ev.id),
                form_title: "Edit Event".to_string(),
                editing: true,
                form: fixed,
                errors,
            };
            return render(tmpl);
        }
    };

    event::update(&pool, ev.id, &upd).await?;
    set_flash(&session, "Event updated.");
    Ok(see_other(&format!("/ngo/events/{}", ev.id)))
}

pub async fn toggle_status(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let ngo = match current_ngo(&pool, &session).await? {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let ev = owned_event(&pool, &ngo, path.into_inner()).await?;

    match event::toggle_active(&pool, ev.id).await? {
        Some(true) => set_flash(&session, "Event activated."),
        Some(false) => set_flash(&session, "Event deactivated."),
        None => set_flash(&session, "Cancelled events cannot be reactivated."),
    }
    Ok(see_other(&format!("/ngo/events/{}", ev.id)))
}

/// Cancel rather than delete: bookings and slots stay for history.
pub async fn cancel(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let ngo = match current_ngo(&pool, &session).await? {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let ev = owned_event(&pool, &ngo, path.into_inner()).await?;
    if ev.is_cancelled() {
        set_flash(&session, "Event is already cancelled.");
        return Ok(see_other("/ngo/events"));
    }

    let outcome = event::cancel(&pool, ev.id).await?;
    log::info!(
        "NGO {} cancelled event {}: {} slots closed, {} bookings cancelled",
        ngo.id,
        ev.id,
        outcome.closed_slots,
        outcome.cancelled_bookings
    );
    set_flash(
        &session,
        &format!("Event cancelled. {} booking(s) were cancelled.", outcome.cancelled_bookings),
    );
    Ok(see_other("/ngo/events"))
}

pub async fn mark_attended(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<(i64, i64)>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let ngo = match current_ngo(&pool, &session).await? {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let (event_id, booking_id) = path.into_inner();
    let ev = owned_event(&pool, &ngo, event_id).await?;

    match booking::mark_attended(&pool, booking_id, ngo.id, Utc::now()).await {
        Ok(()) => set_flash(&session, "Attendance recorded."),
        Err(BookingError::Db(e)) => return Err(e.into()),
        Err(e) => set_flash(&session, &e.to_string()),
    }
    Ok(see_other(&format!("/ngo/events/{}", ev.id)))
}
