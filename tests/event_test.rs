//! Event lifecycle: slot generation on create, edits, cancellation and the slot closer.

mod common;

use chrono::{Duration, Utc};

use ngoconnect::jobs::slot_closer;
use ngoconnect::models::booking::{self, BookingError, BookingStatus};
use ngoconnect::models::event::{self, EventUpdate, NewEvent};

use common::*;

#[tokio::test]
async fn create_generates_four_slots_per_day() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let (_, ngo_id) = create_ngo(pool, "gen@ngo.test", "Gen Org").await;

    let new = NewEvent {
        title: "Food drive".to_string(),
        description: "Sorting donations".to_string(),
        location: "Warehouse 3".to_string(),
        start_date: days_from_now(10),
        end_date: days_from_now(12),
        category: "Hunger".to_string(),
        max_volunteers: 8,
        required_skills: vec![],
    };
    let (event_id, count) = event::create_with_slots(pool, ngo_id, &new).await.expect("create");
    assert_eq!(count, 12);

    let slots = event::find_slots(pool, event_id).await.expect("slots");
    assert_eq!(slots.len(), 12);
    assert!(slots.iter().all(|s| s.capacity == 8 && s.booked_count == 0 && !s.is_closed));
    assert!(slots.iter().all(|s| s.end_time - s.start_time == Duration::hours(2)));

    db.teardown().await;
}

#[tokio::test]
async fn capacity_edit_never_drops_below_bookings() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let (_, ngo_id) = create_ngo(pool, "cap@ngo.test", "Cap Org").await;
    let event_id = create_event(pool, ngo_id, 4, 3).await;
    let slot_id = first_slot(pool, event_id).await;

    for i in 0..2 {
        let (_, vid) = create_volunteer(pool, &format!("c{i}@cap.test"), "Cap").await;
        booking::book_slot(pool, vid, slot_id, None, Utc::now()).await.expect("book");
    }

    let upd = EventUpdate {
        title: "River cleanup (rescheduled crew)".to_string(),
        description: String::new(),
        location: "East bank".to_string(),
        category: "Environment".to_string(),
        max_volunteers: 1,
        required_skills: vec![],
    };
    event::update(pool, event_id, &upd).await.expect("update");

    let slots = event::find_slots(pool, event_id).await.expect("slots");
    let booked = slots.iter().find(|s| s.id == slot_id).expect("booked slot");
    assert_eq!(booked.capacity, 2);
    assert!(slots.iter().filter(|s| s.id != slot_id).all(|s| s.capacity == 1));

    let stored = event::find_by_id(pool, event_id).await.expect("query").expect("event");
    assert_eq!(stored.title, "River cleanup (rescheduled crew)");
    assert_eq!(stored.max_volunteers, 1);

    db.teardown().await;
}

#[tokio::test]
async fn cancelling_an_event_keeps_its_history() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let (_, ngo_id) = create_ngo(pool, "stop@ngo.test", "Stop Org").await;
    let (_, vid) = create_volunteer(pool, "stop@vol.test", "Stop").await;
    let event_id = create_event(pool, ngo_id, 3, 4).await;
    let slot_id = first_slot(pool, event_id).await;
    let b = booking::book_slot(pool, vid, slot_id, None, Utc::now()).await.expect("book");

    let outcome = event::cancel(pool, event_id).await.expect("cancel");
    assert_eq!(outcome.closed_slots, 4);
    assert_eq!(outcome.cancelled_bookings, 1);

    let stored = event::find_by_id(pool, event_id).await.expect("query").expect("event kept");
    assert!(stored.is_cancelled());
    assert!(!stored.is_bookable());

    let slots = event::find_slots(pool, event_id).await.expect("slots");
    assert_eq!(slots.len(), 4);
    assert!(slots.iter().all(|s| s.is_closed && s.booked_count == 0));

    let kept = booking::find_by_id(pool, b.id).await.expect("query").expect("booking kept");
    assert_eq!(kept.status, BookingStatus::Cancelled.as_str());

    // A cancelled event cannot be switched back on.
    assert_eq!(event::toggle_active(pool, event_id).await.expect("toggle"), None);
    assert!(event::list_active(pool).await.expect("list").iter().all(|e| e.id != event_id));

    db.teardown().await;
}

#[tokio::test]
async fn cancel_racing_bookings_leaves_no_live_booking() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool().clone();
    let (_, ngo_id) = create_ngo(&pool, "race@ngo.test", "Race Org").await;
    let event_id = create_event(&pool, ngo_id, 3, 10).await;
    let slot_id = first_slot(&pool, event_id).await;

    // Hold the slot so the bookings and the cancel queue up behind it.
    let mut blocker = pool.begin().await.expect("begin");
    sqlx::query("SELECT id FROM time_slots WHERE id = $1 FOR UPDATE")
        .bind(slot_id)
        .execute(&mut *blocker)
        .await
        .expect("lock slot");

    let mut bookers = Vec::new();
    for i in 0..3 {
        let (_, vid) = create_volunteer(&pool, &format!("r{i}@vol.test"), "Racer").await;
        let pool = pool.clone();
        bookers.push(tokio::spawn(async move {
            booking::book_slot(&pool, vid, slot_id, Some(event_id), Utc::now()).await
        }));
    }
    let canceller = {
        let pool = pool.clone();
        tokio::spawn(async move { event::cancel(&pool, event_id).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    blocker.rollback().await.expect("release slot");

    canceller.await.expect("task joins").expect("cancel");
    for b in bookers {
        match b.await.expect("task joins") {
            Ok(_) | Err(BookingError::SlotUnavailable) => {}
            Err(e) => panic!("unexpected booking error: {e}"),
        }
    }

    let live: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE event_id = $1 AND status = 'booked'",
    )
    .bind(event_id)
    .fetch_one(&pool)
    .await
    .expect("count");
    assert_eq!(live, 0);

    let slots = event::find_slots(&pool, event_id).await.expect("slots");
    assert!(slots.iter().all(|s| s.is_closed && s.booked_count == 0));

    db.teardown().await;
}

#[tokio::test]
async fn slot_closer_closes_only_finished_slots() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let (_, ngo_id) = create_ngo(pool, "close@ngo.test", "Close Org").await;
    let event_id = create_event(pool, ngo_id, 1, 2).await;
    let slots = event::find_slots(pool, event_id).await.expect("slots");

    // Pretend the clock sits at the end of the second slot.
    let closed = event::close_finished_slots(pool, slots[1].end_time).await.expect("close");
    assert_eq!(closed, 2);

    let after = event::find_slots(pool, event_id).await.expect("slots");
    let flags: Vec<bool> = after.iter().map(|s| s.is_closed).collect();
    assert_eq!(flags, vec![true, true, false, false]);

    let open = event::find_open_slots(pool, event_id, slots[1].end_time).await.expect("open");
    assert_eq!(open.len(), 2);

    // Nothing in this schema has finished yet in real time.
    assert_eq!(slot_closer::run_once(pool).await, 0);

    db.teardown().await;
}

#[tokio::test]
async fn recommendations_match_skills_or_interests() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let (_, ngo_id) = create_ngo(pool, "rec@ngo.test", "Rec Org").await;
    let matching = create_event(pool, ngo_id, 5, 3).await;

    let other = NewEvent {
        title: "Coding club".to_string(),
        description: String::new(),
        location: "Library".to_string(),
        start_date: days_from_now(5),
        end_date: days_from_now(5),
        category: "Education".to_string(),
        max_volunteers: 3,
        required_skills: vec!["Rust".to_string()],
    };
    let (unrelated, _) = event::create_with_slots(pool, ngo_id, &other).await.expect("create");

    let by_skill = event::find_recommended(pool, &["first AID".to_string()], &[], days_from_now(0), 10)
        .await
        .expect("by skill");
    assert_eq!(by_skill.iter().map(|e| e.id).collect::<Vec<_>>(), vec![matching]);

    let by_interest = event::find_recommended(pool, &[], &["education".to_string()], days_from_now(0), 10)
        .await
        .expect("by interest");
    assert_eq!(by_interest.iter().map(|e| e.id).collect::<Vec<_>>(), vec![unrelated]);

    db.teardown().await;
}
