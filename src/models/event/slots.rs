//! Slot generation and event form validation.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use super::types::{EventForm, EventUpdate, NewEvent};
use crate::auth::validate;

pub const SLOT_HOURS: i64 = 2;
/// First slot starts at 09:00, last one ends at 17:00.
pub const DAY_START_HOUR: u32 = 9;
pub const DAY_END_HOUR: u32 = 17;
pub const MAX_EVENT_DAYS: i64 = 31;
pub const MAX_VOLUNTEERS_PER_SLOT: i32 = 500;

/// Start/end pairs for every two-hour slot between the two dates, inclusive.
pub fn generate_slots(start_date: NaiveDate, end_date: NaiveDate) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut slots = Vec::new();
    let mut day = start_date;
    while day <= end_date {
        let mut hour = DAY_START_HOUR;
        while hour + SLOT_HOURS as u32 <= DAY_END_HOUR {
            if let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) {
                let start = day.and_time(time).and_utc();
                slots.push((start, start + Duration::hours(SLOT_HOURS)));
            }
            hour += SLOT_HOURS as u32;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    slots
}

fn parse_date(raw: &str, field: &str, errors: &mut Vec<String>) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.push(format!("{field} must be a date (YYYY-MM-DD)"));
            None
        }
    }
}

fn parse_max_volunteers(raw: &str, errors: &mut Vec<String>) -> i32 {
    match raw.trim().parse::<i32>() {
        Ok(n) if (1..=MAX_VOLUNTEERS_PER_SLOT).contains(&n) => n,
        _ => {
            errors.push(format!("Max volunteers must be a number between 1 and {MAX_VOLUNTEERS_PER_SLOT}"));
            0
        }
    }
}

fn validate_common(form: &EventForm, errors: &mut Vec<String>) {
    errors.extend(validate::validate_required(&form.title, "Title", 200));
    errors.extend(validate::validate_optional(&form.description, "Description", 5000));
    errors.extend(validate::validate_required(&form.location, "Location", 200));
    errors.extend(validate::validate_optional(&form.category, "Category", 100));
}

/// Validate a create form. `today` is the earliest allowed start date.
pub fn validate_new_event(form: &EventForm, today: NaiveDate) -> Result<NewEvent, Vec<String>> {
    let mut errors = Vec::new();
    validate_common(form, &mut errors);
    let start = parse_date(&form.start_date, "Start date", &mut errors);
    let end = parse_date(&form.end_date, "End date", &mut errors);
    let max_volunteers = parse_max_volunteers(&form.max_volunteers, &mut errors);

    if let (Some(s), Some(e)) = (start, end) {
        if s < today {
            errors.push("Start date cannot be in the past".to_string());
        }
        if e < s {
            errors.push("End date must be on or after the start date".to_string());
        } else if (e - s).num_days() + 1 > MAX_EVENT_DAYS {
            errors.push(format!("Events may span at most {MAX_EVENT_DAYS} days"));
        }
    }

    match (start, end) {
        (Some(start_date), Some(end_date)) if errors.is_empty() => Ok(NewEvent {
            title: form.title.trim().to_string(),
            description: form.description.trim().to_string(),
            location: form.location.trim().to_string(),
            start_date,
            end_date,
            category: form.category.trim().to_string(),
            max_volunteers,
            required_skills: validate::parse_tags(&form.required_skills),
        }),
        _ => Err(errors),
    }
}

/// Validate an edit form. Date fields are ignored.
pub fn validate_event_update(form: &EventForm) -> Result<EventUpdate, Vec<String>> {
    let mut errors = Vec::new();
    validate_common(form, &mut errors);
    let max_volunteers = parse_max_volunteers(&form.max_volunteers, &mut errors);
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(EventUpdate {
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        location: form.location.trim().to_string(),
        category: form.category.trim().to_string(),
        max_volunteers,
        required_skills: validate::parse_tags(&form.required_skills),
    })
}
