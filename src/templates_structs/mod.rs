// Template context structures for Askama templates, organized by area.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{SessionUser, current_user, take_flash};

pub const APP_NAME: &str = "NGO Connect";

/// Common context shared by every page, signed in or not.
/// Templates access these as `ctx.user`, `ctx.flash`, etc.
pub struct PageContext {
    pub user: Option<SessionUser>,
    pub flash: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
    pub current_path: String,
}

impl PageContext {
    pub fn build(session: &Session, current_path: &str) -> Self {
        Self {
            user: current_user(session),
            flash: take_flash(session),
            app_name: APP_NAME.to_string(),
            csrf_token: csrf::get_or_create_token(session),
            current_path: current_path.to_string(),
        }
    }

    /// Nav link state for the base layout.
    pub fn is_current(&self, prefix: &str) -> bool {
        self.current_path == prefix || (prefix != "/" && self.current_path.starts_with(prefix))
    }
}

mod admin;
mod common;
mod dashboard;
mod directory;
mod donor;
mod event;

pub use self::admin::{AdminNgosTemplate, AdminUsersTemplate};
pub use self::common::{AboutTemplate, ChatTemplate, HomeTemplate, LoginTemplate, NotFoundTemplate, RegisterTemplate};
pub use self::dashboard::{
    AdminDashboardTemplate, DonorDashboardTemplate, NgoDashboardTemplate, VolunteerDashboardTemplate,
};
pub use self::directory::{
    AchievementsTemplate, EventDetailTemplate, LeaderboardTemplate, NgoDirectoryTemplate, OpportunitiesTemplate,
};
pub use self::donor::DonateTemplate;
pub use self::event::{EventFormTemplate, NgoEventDetailTemplate, NgoEventListTemplate};
