//! Tests for listing maintenance and raised-total corrections.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::MockListingRepository;
use crate::test_support::clock::MutableClock;
use crate::test_support::fixtures::{admin, colombo_sky, investor, listing_draft};

fn catalogue(listings: MockListingRepository) -> ListingCatalogue {
    ListingCatalogue::new(
        Arc::new(listings),
        ListingLocks::new(),
        Arc::new(MutableClock::fixed()),
    )
}

fn colombo_id() -> ListingId {
    ListingId::new("colombo-sky-1").expect("valid id")
}

#[rstest]
#[tokio::test]
async fn investors_cannot_save_listings() {
    let draft = listing_draft("colombo-sky-1", 50_000_000, 0, 500_000, 12.0);
    let err = catalogue(MockListingRepository::new())
        .save(&investor("ann@example.com"), &draft)
        .await
        .expect_err("investor save");
    assert_eq!(Error::from(err).code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn save_generates_slug_when_id_missing() {
    let mut listings = MockListingRepository::new();
    listings.expect_find().returning(|_| Ok(None));
    listings
        .expect_upsert()
        .withf(|listing| listing.id().as_ref() == "harbour-view-lofts-1735689600000")
        .times(1)
        .returning(|_| Ok(()));

    let mut draft = listing_draft("unused", 10_000_000, 0, 100_000, 9.5);
    draft.id = None;
    draft.title = "Harbour View Lofts".to_owned();
    let saved = catalogue(listings)
        .save(&admin(), &draft)
        .await
        .expect("created listing");
    assert_eq!(saved.total_raised(), 0);
}

#[rstest]
#[tokio::test]
async fn invalid_status_is_reported() {
    let mut draft = listing_draft("colombo-sky-1", 50_000_000, 0, 500_000, 12.0);
    draft.status = "Paused".to_owned();
    let mut listings = MockListingRepository::new();
    listings.expect_find().returning(|_| Ok(None));

    let err = catalogue(listings)
        .save(&admin(), &draft)
        .await
        .expect_err("invalid status");
    let error = Error::from(err);
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.reason(), Some("invalid_status"));
}

#[rstest]
#[tokio::test]
async fn updates_cannot_rewrite_raised_total() {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find()
        .returning(|_| Ok(Some(colombo_sky())));
    listings.expect_upsert().never();

    let draft = listing_draft("colombo-sky-1", 50_000_000, 40_000_000, 500_000, 12.0);
    let err = catalogue(listings)
        .save(&admin(), &draft)
        .await
        .expect_err("raised total edit");
    assert_eq!(Error::from(err).reason(), Some("raised_total_not_editable"));
}

#[rstest]
#[tokio::test]
async fn deleting_unknown_listing_is_not_found() {
    let mut listings = MockListingRepository::new();
    listings.expect_delete_cascading().returning(|_| Ok(false));
    let locks = ListingLocks::new();
    let catalogue = ListingCatalogue::new(
        Arc::new(listings),
        locks.clone(),
        Arc::new(MutableClock::fixed()),
    );
    let err = catalogue
        .delete(&admin(), &colombo_id())
        .await
        .expect_err("missing listing");
    assert_eq!(Error::from(err).code(), ErrorCode::NotFound);
    assert!(locks.is_empty());
}

#[rstest]
#[tokio::test]
async fn adjustment_is_audited() {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find()
        .returning(|_| Ok(Some(colombo_sky())));
    listings
        .expect_upsert()
        .withf(|listing| listing.total_raised() == 20_000_000)
        .times(1)
        .returning(|_| Ok(()));
    listings
        .expect_record_adjustment()
        .withf(|adjustment| {
            adjustment.previous_total == 25_000_000
                && adjustment.new_total == 20_000_000
                && adjustment.reason == "refund processed offline"
                && adjustment.actor_email.as_ref() == "admin@stake.com"
        })
        .times(1)
        .returning(|_| Ok(()));

    let listing = catalogue(listings)
        .adjust_raised_total(&admin(), &colombo_id(), 20_000_000, " refund processed offline ")
        .await
        .expect("adjusted");
    assert_eq!(listing.total_raised(), 20_000_000);
}

#[rstest]
#[case(-1)]
#[case(50_000_001)]
#[tokio::test]
async fn adjustment_enforces_bounds(#[case] new_total: i64) {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find()
        .returning(|_| Ok(Some(colombo_sky())));
    listings.expect_upsert().never();
    listings.expect_record_adjustment().never();

    let err = catalogue(listings)
        .adjust_raised_total(&admin(), &colombo_id(), new_total, "correction")
        .await
        .expect_err("out of range");
    assert_eq!(Error::from(err).code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn adjustment_requires_reason() {
    let err = catalogue(MockListingRepository::new())
        .adjust_raised_total(&admin(), &colombo_id(), 1, "   ")
        .await
        .expect_err("missing reason");
    assert_eq!(err, ListingError::MissingReason);
}

#[rstest]
#[tokio::test]
async fn list_is_newest_first() {
    use chrono::{TimeZone, Utc};

    let older = colombo_sky();
    let draft = listing_draft("galle-heritage-1", 75_000_000, 0, 750_000, 15.0);
    let newer = Listing::create(
        ListingId::new("galle-heritage-1").expect("id"),
        &draft,
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().expect("time"),
    )
    .expect("listing");
    let mut listings = MockListingRepository::new();
    listings
        .expect_list()
        .returning(move || Ok(vec![older.clone(), newer.clone()]));

    let ids: Vec<String> = catalogue(listings)
        .list()
        .await
        .expect("list")
        .iter()
        .map(|listing| listing.id().to_string())
        .collect();
    assert_eq!(ids, ["galle-heritage-1", "colombo-sky-1"]);
}
