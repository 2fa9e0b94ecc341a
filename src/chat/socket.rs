use std::ops::ControlFlow;

use actix_ws::{Message, MessageStream, Session as WsSession};
use sqlx::PgPool;
use tokio::sync::mpsc;

use super::hub::{ChatHub, ConnectionId};
use super::protocol::{self, ClientFrame, ServerFrame};
use crate::models::{message, user};

/// Who is on the other end of a socket.
#[derive(Debug, Clone)]
pub struct ChatUser {
    pub id: i64,
    pub name: String,
}

/// Drive one WebSocket until either side closes, then drop it from every room.
pub async fn run(
    hub: ChatHub,
    pool: PgPool,
    user: ChatUser,
    mut ws: WsSession,
    mut stream: MessageStream,
) {
    let conn = hub.next_connection_id();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    log::info!("Chat connection {conn} opened for user {}", user.id);

    loop {
        tokio::select! {
            Some(out) = rx.recv() => {
                if ws.text(out).await.is_err() {
                    break;
                }
            }
            incoming = stream.recv() => {
                // A closed or broken stream ends the session; our own sender keeps `rx` alive.
                let Some(Ok(msg)) = incoming else { break };
                match msg {
                    Message::Text(text) => {
                        if handle_text(&hub, &pool, &user, conn, &tx, &text).await.is_break() {
                            // Flush the final error frame before closing.
                            while let Ok(out) = rx.try_recv() {
                                let _ = ws.text(out).await;
                            }
                            break;
                        }
                    }
                    Message::Ping(bytes) => {
                        if ws.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    }

    hub.disconnect(conn);
    let _ = ws.close(None).await;
    log::info!("Chat connection {conn} closed for user {}", user.id);
}

/// Apply one client text frame for the connection `conn` of `user`.
///
/// Replies meant for this connection go to `tx`; room traffic goes through
/// the hub. A message is stored before it is broadcast, and a failed store is
/// reported to the room instead. Breaks when the account has been
/// deactivated and the socket should close.
pub async fn handle_text(
    hub: &ChatHub,
    pool: &PgPool,
    user: &ChatUser,
    conn: ConnectionId,
    tx: &mpsc::UnboundedSender<String>,
    text: &str,
) -> ControlFlow<()> {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(f) => f,
        Err(e) => {
            log::debug!("Bad chat frame from user {}: {e}", user.id);
            let _ = tx.send(ServerFrame::error("Unrecognised message").to_json());
            return ControlFlow::Continue(());
        }
    };

    match frame {
        ClientFrame::JoinRoom { room } => {
            if !protocol::may_join(&room, user.id) {
                let _ = tx.send(ServerFrame::error("You cannot join this room").to_json());
                return ControlFlow::Continue(());
            }
            hub.join(&room, conn, tx.clone());
            let notice = ServerFrame::Status { msg: format!("{} has entered the room.", user.name), room: room.clone() };
            hub.broadcast(&room, &notice);
        }
        ClientFrame::LeaveRoom { room } => {
            if !hub.is_member(&room, conn) {
                return ControlFlow::Continue(());
            }
            hub.leave(&room, conn);
            let notice = ServerFrame::Status { msg: format!("{} has left the room.", user.name), room: room.clone() };
            hub.broadcast(&room, &notice);
        }
        ClientFrame::SendMessage { room, message } => {
            if !hub.is_member(&room, conn) {
                let _ = tx.send(ServerFrame::error("Join the room before sending").to_json());
                return ControlFlow::Continue(());
            }
            let body = match protocol::clean_message(&message) {
                Ok(b) => b,
                Err(reason) => {
                    let _ = tx.send(ServerFrame::error(reason).to_json());
                    return ControlFlow::Continue(());
                }
            };

            match user::is_active(pool, user.id).await {
                Ok(true) => {}
                Ok(false) => {
                    log::info!("Closing chat connection {conn}: user {} is deactivated", user.id);
                    hub.disconnect(conn);
                    let _ = tx.send(ServerFrame::error("Your account has been deactivated").to_json());
                    return ControlFlow::Break(());
                }
                Err(e) => {
                    log::error!("Failed to check chat user {}: {e}", user.id);
                    hub.broadcast(&room, &ServerFrame::error("Message could not be delivered"));
                    return ControlFlow::Continue(());
                }
            }

            let receiver = protocol::message_receiver(&room, user.id);
            match message::create(pool, user.id, receiver, &room, body).await {
                Ok(saved) => {
                    hub.broadcast(
                        &room,
                        &ServerFrame::ReceiveMessage {
                            room: room.clone(),
                            sender_id: user.id,
                            sender: user.name.clone(),
                            message: saved.body,
                            timestamp: saved.created_at,
                        },
                    );
                }
                Err(e) => {
                    log::error!("Failed to store chat message from user {} in {room}: {e}", user.id);
                    hub.broadcast(&room, &ServerFrame::error("Message could not be delivered"));
                }
            }
        }
    }
    ControlFlow::Continue(())
}
