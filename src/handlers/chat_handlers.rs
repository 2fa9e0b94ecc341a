use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::session::{require_active_login, require_login};
use crate::chat::protocol::direct_room;
use crate::chat::socket::{self, ChatUser};
use crate::chat::ChatHub;
use crate::config::Config;
use crate::errors::{AppError, render};
use crate::models::{message, user};
use crate::templates_structs::{ChatTemplate, PageContext};

const HISTORY_LIMIT: i64 = 100;

#[derive(Deserialize)]
pub struct ChatQuery {
    pub room: Option<String>,
    /// Open the private room with this user.
    pub with: Option<i64>,
}

pub async fn page(session: Session, query: web::Query<ChatQuery>) -> Result<HttpResponse, AppError> {
    let me = require_login(&session)?;
    let room = match (query.with, &query.room) {
        (Some(other), _) => direct_room(me.id, other),
        (None, Some(room)) if !room.trim().is_empty() => room.trim().to_string(),
        _ => "general".to_string(),
    };
    render(ChatTemplate { ctx: PageContext::build(&session, "/chat"), user_id: me.id, room })
}

/// With `CLIENT_URL` configured, only that origin may open a socket.
pub fn origin_allowed(client_url: Option<&str>, origin: Option<&str>) -> bool {
    match client_url {
        None => true,
        Some(expected) => origin.is_some_and(|o| o.trim_end_matches('/') == expected),
    }
}

/// GET /ws/chat - upgrade to the chat socket
pub async fn ws_connect(
    req: HttpRequest,
    body: web::Payload,
    session: Session,
    pool: web::Data<PgPool>,
    hub: web::Data<ChatHub>,
    config: web::Data<Config>,
) -> Result<HttpResponse, actix_web::Error> {
    let origin = req.headers().get("origin").and_then(|v| v.to_str().ok());
    if !origin_allowed(config.client_url.as_deref(), origin) {
        log::warn!("Refused chat socket from origin {:?}", origin);
        return Ok(HttpResponse::Forbidden().finish());
    }

    let me = require_active_login(&pool, &session).await?;

    let (response, ws_session, msg_stream) = actix_ws::handle(&req, body)?;
    let chat_user = ChatUser { id: me.id, name: me.display_name };
    let hub = hub.get_ref().clone();
    let pool = pool.get_ref().clone();

    actix_web::rt::spawn(socket::run(hub, pool, chat_user, ws_session, msg_stream));

    Ok(response)
}

/// GET /messages/{user_id} - direct message history with another user
pub async fn history(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let me = require_login(&session)?;
    let other = path.into_inner();
    if user::find_by_id(&pool, other).await?.is_none() {
        return Err(AppError::NotFound);
    }
    let messages = message::find_conversation(&pool, me.id, other, HISTORY_LIMIT).await?;
    Ok(HttpResponse::Ok().json(messages))
}
