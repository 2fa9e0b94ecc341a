use askama::Template;

use super::PageContext;
use crate::models::analytics::{DonorStats, LeaderboardEntry, NgoStats, PlatformStats, VolunteerStats};
use crate::models::booking::BookingDetail;
use crate::models::donation::DonationDetail;
use crate::models::event::{Event, EventListing};
use crate::models::user::{DonorProfile, NgoProfile, VolunteerProfile};

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub ctx: PageContext,
    pub stats: PlatformStats,
    pub top_volunteers: Vec<LeaderboardEntry>,
}

#[derive(Template)]
#[template(path = "ngo/dashboard.html")]
pub struct NgoDashboardTemplate {
    pub ctx: PageContext,
    pub ngo: NgoProfile,
    pub stats: NgoStats,
    pub recent_events: Vec<Event>,
}

#[derive(Template)]
#[template(path = "volunteer/dashboard.html")]
pub struct VolunteerDashboardTemplate {
    pub ctx: PageContext,
    pub volunteer: VolunteerProfile,
    pub stats: VolunteerStats,
    pub upcoming: Vec<BookingDetail>,
    pub recommended: Vec<EventListing>,
}

#[derive(Template)]
#[template(path = "donor/dashboard.html")]
pub struct DonorDashboardTemplate {
    pub ctx: PageContext,
    pub donor: DonorProfile,
    pub stats: DonorStats,
    pub donations: Vec<DonationDetail>,
}
