use askama::Template;

use super::PageContext;
use crate::models::user::{NgoProfile, UserSummary};

#[derive(Template)]
#[template(path = "admin/users.html")]
pub struct AdminUsersTemplate {
    pub ctx: PageContext,
    pub users: Vec<UserSummary>,
    pub current_user_id: i64,
}

#[derive(Template)]
#[template(path = "admin/ngos.html")]
pub struct AdminNgosTemplate {
    pub ctx: PageContext,
    pub ngos: Vec<NgoProfile>,
}
