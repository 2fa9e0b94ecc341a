//! Donation history is append-only and feeds the donor and NGO statistics.

mod common;

use rust_decimal::Decimal;

use ngoconnect::models::{analytics, donation};

use common::*;

#[tokio::test]
async fn donations_cannot_be_edited_or_deleted() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let (_, ngo_id) = create_ngo(pool, "fund@ngo.test", "Fund Org").await;
    let (_, donor_id) = create_donor(pool, "fund@donor.test").await;

    let gift = donation::record(pool, donor_id, ngo_id, Decimal::new(2550, 2), " monthly ")
        .await
        .expect("record");
    assert_eq!(gift.amount, Decimal::new(2550, 2));
    assert_eq!(gift.note, "monthly");

    let update = sqlx::query("UPDATE donations SET amount = 1 WHERE id = $1")
        .bind(gift.id)
        .execute(pool)
        .await;
    assert!(update.is_err());
    let delete = sqlx::query("DELETE FROM donations WHERE id = $1")
        .bind(gift.id)
        .execute(pool)
        .await;
    assert!(delete.is_err());

    let history = donation::find_for_donor(pool, donor_id).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount, Decimal::new(2550, 2));
    assert_eq!(history[0].ngo_name, "Fund Org");

    db.teardown().await;
}

#[tokio::test]
async fn totals_roll_up_per_donor_and_per_ngo() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let (_, first_ngo) = create_ngo(pool, "one@ngo.test", "One Org").await;
    let (_, second_ngo) = create_ngo(pool, "two@ngo.test", "Two Org").await;
    let (_, donor_id) = create_donor(pool, "roll@donor.test").await;

    for (ngo, cents) in [(first_ngo, 1000), (first_ngo, 525), (second_ngo, 10000)] {
        donation::record(pool, donor_id, ngo, Decimal::new(cents, 2), "").await.expect("record");
    }

    let donor = analytics::donor_stats(pool, donor_id).await.expect("donor stats");
    assert_eq!(donor.donation_count, 3);
    assert_eq!(donor.total_amount, Decimal::new(11525, 2));
    assert_eq!(donor.ngos_supported, 2);

    let ngo = analytics::ngo_stats(pool, first_ngo).await.expect("ngo stats");
    assert_eq!(ngo.donation_count, 2);
    assert_eq!(ngo.donations_total, Decimal::new(1525, 2));

    let platform = analytics::platform_stats(pool).await.expect("platform stats");
    assert_eq!(platform.ngos, 2);
    assert_eq!(platform.donations_total, Decimal::new(11525, 2));

    db.teardown().await;
}
