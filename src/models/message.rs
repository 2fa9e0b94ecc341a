use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: Option<i64>,
    pub room: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

pub async fn create(
    pool: &PgPool,
    sender_id: i64,
    receiver_id: Option<i64>,
    room: &str,
    body: &str,
) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        "INSERT INTO messages (sender_id, receiver_id, room, body) VALUES ($1, $2, $3, $4) \
         RETURNING id, sender_id, receiver_id, room, body, created_at",
    )
    .bind(sender_id)
    .bind(receiver_id)
    .bind(room)
    .bind(body)
    .fetch_one(pool)
    .await
}

/// The latest `limit` messages exchanged between two users, oldest first.
pub async fn find_conversation(pool: &PgPool, a: i64, b: i64, limit: i64) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        "SELECT * FROM ( \
             SELECT id, sender_id, receiver_id, room, body, created_at FROM messages \
             WHERE (sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 \
         ) recent ORDER BY created_at ASC, id ASC",
    )
    .bind(a)
    .bind(b)
    .bind(limit)
    .fetch_all(pool)
    .await
}
