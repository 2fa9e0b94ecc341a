use askama::Template;

use super::PageContext;
use crate::models::user::NgoProfile;

#[derive(Template)]
#[template(path = "donor/donate.html")]
pub struct DonateTemplate {
    pub ctx: PageContext,
    pub ngos: Vec<NgoProfile>,
    /// 0 when nothing is pre-selected.
    pub selected_ngo: i64,
    pub amount: String,
    pub note: String,
    pub errors: Vec<String>,
}
