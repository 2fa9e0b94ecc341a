use askama::Template;

use super::PageContext;
use crate::models::user::RegisterForm;

#[derive(Template)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub email: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
    /// Echo of the submitted form; empty on first render.
    pub form: RegisterForm,
}

#[derive(Template)]
#[template(path = "chat.html")]
pub struct ChatTemplate {
    pub ctx: PageContext,
    pub user_id: i64,
    /// Pre-selected room, e.g. a `dm:` room opened from a profile link.
    pub room: String,
}

#[derive(Template)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate {
    pub ctx: PageContext,
}
