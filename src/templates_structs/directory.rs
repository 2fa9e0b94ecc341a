use askama::Template;

use super::PageContext;
use crate::models::analytics::{LeaderboardEntry, VolunteerStats};
use crate::models::booking::BookingDetail;
use crate::models::event::{Event, TimeSlot};
use crate::models::user::NgoProfile;

#[derive(Template)]
#[template(path = "ngos.html")]
pub struct NgoDirectoryTemplate {
    pub ctx: PageContext,
    pub ngos: Vec<NgoProfile>,
    pub q: String,
    pub category: String,
    pub city: String,
}

#[derive(Template)]
#[template(path = "ngo/opportunities.html")]
pub struct OpportunitiesTemplate {
    pub ctx: PageContext,
    pub ngo: NgoProfile,
    pub events: Vec<Event>,
}

#[derive(Template)]
#[template(path = "events/detail.html")]
pub struct EventDetailTemplate {
    pub ctx: PageContext,
    pub event: Event,
    pub ngo: NgoProfile,
    pub slots: Vec<TimeSlot>,
    pub can_book: bool,
}

#[derive(Template)]
#[template(path = "volunteers_leaderboard.html")]
pub struct LeaderboardTemplate {
    pub ctx: PageContext,
    pub points_leaders: Vec<LeaderboardEntry>,
    pub hours_leaders: Vec<LeaderboardEntry>,
}

#[derive(Template)]
#[template(path = "volunteer/achievements.html")]
pub struct AchievementsTemplate {
    pub ctx: PageContext,
    pub stats: VolunteerStats,
    pub recent_bookings: Vec<BookingDetail>,
}
