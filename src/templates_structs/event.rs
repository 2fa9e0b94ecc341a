use askama::Template;

use super::PageContext;
use crate::models::booking::EventBooking;
use crate::models::event::{Event, EventForm, TimeSlot};

#[derive(Template)]
#[template(path = "ngo/events/list.html")]
pub struct NgoEventListTemplate {
    pub ctx: PageContext,
    pub events: Vec<Event>,
}

/// Shared by create and edit. `editing` hides the date fields, which are fixed once slots exist.
#[derive(Template)]
#[template(path = "ngo/events/form.html")]
pub struct EventFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub editing: bool,
    pub form: EventForm,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "ngo/events/detail.html")]
pub struct NgoEventDetailTemplate {
    pub ctx: PageContext,
    pub event: Event,
    pub slots: Vec<TimeSlot>,
    pub bookings: Vec<EventBooking>,
}
