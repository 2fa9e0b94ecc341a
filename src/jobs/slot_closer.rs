use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;

use crate::models::event;

pub const INTERVAL: Duration = Duration::from_secs(300);

/// Close slots whose end time has passed, every five minutes.
pub fn spawn(pool: PgPool) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(INTERVAL);
        loop {
            interval.tick().await;
            run_once(&pool).await;
        }
    });
}

pub async fn run_once(pool: &PgPool) -> u64 {
    match event::close_finished_slots(pool, Utc::now()).await {
        Ok(0) => 0,
        Ok(n) => {
            log::info!("Slot closer: closed {n} finished slot(s)");
            n
        }
        Err(e) => {
            log::error!("Slot closer failed: {e}");
            0
        }
    }
}
