use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Frames a browser may send over `/ws/chat`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    JoinRoom {
        room: String,
    },
    LeaveRoom {
        room: String,
    },
    /// Older clients also send `receiver_id`; it is ignored, the receiver
    /// comes from the room via [`message_receiver`].
    SendMessage {
        room: String,
        message: String,
    },
}

/// Frames the server pushes to connections.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Status {
        room: String,
        msg: String,
    },
    ReceiveMessage {
        room: String,
        sender_id: i64,
        sender: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
    Error {
        message: String,
    },
}

impl ServerFrame {
    pub fn error(msg: impl Into<String>) -> Self {
        ServerFrame::Error { message: msg.into() }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"error","message":"encoding failed"}"#.to_string())
    }
}

pub const MAX_ROOM_LEN: usize = 100;
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Canonical private room for two users: `dm:<low>:<high>`.
pub fn direct_room(a: i64, b: i64) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("dm:{lo}:{hi}")
}

/// Whether `user_id` may join `room`.
/// `dm:<a>:<b>` rooms are restricted to their two members; any other
/// non-empty name up to `MAX_ROOM_LEN` is open.
pub fn may_join(room: &str, user_id: i64) -> bool {
    if room.trim().is_empty() || room.len() > MAX_ROOM_LEN {
        return false;
    }
    match room.strip_prefix("dm:") {
        None => true,
        Some(rest) => {
            let mut parts = rest.split(':');
            let (Some(a), Some(b), None) = (parts.next(), parts.next(), parts.next()) else {
                return false;
            };
            match (a.parse::<i64>(), b.parse::<i64>()) {
                (Ok(a), Ok(b)) => user_id == a || user_id == b,
                _ => false,
            }
        }
    }
}

/// The other member of a `dm:<a>:<b>` room, if `user_id` is one of them.
pub fn direct_peer(room: &str, user_id: i64) -> Option<i64> {
    let rest = room.strip_prefix("dm:")?;
    let (a, b) = rest.split_once(':')?;
    let (a, b) = (a.parse::<i64>().ok()?, b.parse::<i64>().ok()?);
    if user_id == a {
        Some(b)
    } else if user_id == b {
        Some(a)
    } else {
        None
    }
}

/// Receiver recorded for a message `sender` posts in `room`: the other member
/// of a direct room, nobody for an open one.
pub fn message_receiver(room: &str, sender: i64) -> Option<i64> {
    direct_peer(room, sender)
}

/// Trimmed message body, or the reason it is rejected.
pub fn clean_message(raw: &str) -> Result<&str, &'static str> {
    let body = raw.trim();
    if body.is_empty() {
        Err("Message is empty")
    } else if body.chars().count() > MAX_MESSAGE_LEN {
        Err("Message is too long")
    } else {
        Ok(body)
    }
}
