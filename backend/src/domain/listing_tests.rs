//! Tests for listing validation and funding transitions.

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn draft() -> ListingDraft {
    ListingDraft {
        id: Some("colombo-sky-1".to_owned()),
        title: "Colombo Sky Residences".to_owned(),
        city: "Colombo".to_owned(),
        category: "Residential".to_owned(),
        status: "Active".to_owned(),
        image: "https://images.example.com/colombo.jpg".to_owned(),
        min_investment: 500_000,
        roi: 12.0,
        target_amount: 50_000_000,
        total_raised: Some(25_000_000),
        duration_months: 24,
    }
}

fn build(draft: &ListingDraft) -> Listing {
    let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid time");
    Listing::create(
        ListingId::new("colombo-sky-1").expect("valid id"),
        draft,
        created_at,
    )
    .expect("valid listing")
}

#[rstest]
#[case("Active", ListingStatus::Active)]
#[case("Funding", ListingStatus::Funding)]
#[case("Coming Soon", ListingStatus::ComingSoon)]
#[case("ComingSoon", ListingStatus::ComingSoon)]
fn parses_known_statuses(#[case] raw: &str, #[case] expected: ListingStatus) {
    assert_eq!(raw.parse::<ListingStatus>().expect("known status"), expected);
}

#[rstest]
fn rejects_unknown_status(mut draft: ListingDraft) {
    draft.status = "Closed".to_owned();
    let err = Listing::create(ListingId::new("x-1").expect("id"), &draft, Utc::now())
        .expect_err("unknown status");
    assert_eq!(
        err,
        ListingValidationError::InvalidStatus {
            value: "Closed".to_owned()
        }
    );
}

#[rstest]
#[case::zero_target(|d: &mut ListingDraft| d.target_amount = 0, "targetAmount")]
#[case::negative_minimum(|d: &mut ListingDraft| d.min_investment = -5, "minInvestment")]
#[case::zero_duration(|d: &mut ListingDraft| d.duration_months = 0, "durationMonths")]
#[case::negative_roi(|d: &mut ListingDraft| d.roi = -1.0, "roi")]
#[case::short_title(|d: &mut ListingDraft| d.title = "ab".to_owned(), "title")]
#[case::blank_city(|d: &mut ListingDraft| d.city = "  ".to_owned(), "city")]
#[case::overfunded(|d: &mut ListingDraft| d.total_raised = Some(50_000_001), "totalRaised")]
#[case::negative_raised(|d: &mut ListingDraft| d.total_raised = Some(-1), "totalRaised")]
fn rejects_invalid_drafts(
    mut draft: ListingDraft,
    #[case] mutate: fn(&mut ListingDraft),
    #[case] field: &str,
) {
    mutate(&mut draft);
    let err = Listing::create(ListingId::new("x-1").expect("id"), &draft, Utc::now())
        .expect_err("invalid draft");
    assert_eq!(err.field(), field);
}

#[rstest]
fn admission_checks_run_in_order(draft: ListingDraft) {
    let mut listing = build(&draft);
    assert_eq!(
        listing.admit(100),
        Err(AdmissionRejection::BelowMinimum {
            amount: 100,
            minimum: 500_000
        })
    );
    assert_eq!(
        listing.admit(25_000_001),
        Err(AdmissionRejection::ExceedsRemainingCapacity {
            amount: 25_000_001,
            remaining: 25_000_000
        })
    );

    listing.status = ListingStatus::ComingSoon;
    assert_eq!(
        listing.admit(100),
        Err(AdmissionRejection::NotInvestable {
            status: ListingStatus::ComingSoon
        })
    );
}

#[rstest]
fn filling_the_target_closes_the_listing(draft: ListingDraft) {
    let mut listing = build(&draft);
    listing.record_commitment(500_000).expect("first commit");
    assert_eq!(listing.total_raised(), 25_500_000);
    assert_eq!(listing.status(), ListingStatus::Active);

    listing.record_commitment(24_500_000).expect("filling commit");
    assert_eq!(listing.total_raised(), 50_000_000);
    assert_eq!(listing.status(), ListingStatus::Funding);

    assert!(matches!(
        listing.record_commitment(1),
        Err(AdmissionRejection::NotInvestable { .. })
    ));
    assert_eq!(listing.total_raised(), 50_000_000);
}

#[rstest]
fn revise_keeps_raised_total_and_rejects_edits(mut draft: ListingDraft) {
    let mut listing = build(&draft);
    draft.title = "Colombo Sky Residences II".to_owned();
    draft.total_raised = None;
    listing.revise(&draft).expect("metadata revision");
    assert_eq!(listing.title(), "Colombo Sky Residences II");
    assert_eq!(listing.total_raised(), 25_000_000);

    draft.total_raised = Some(1);
    assert_eq!(
        listing.revise(&draft),
        Err(ListingValidationError::RaisedTotalNotEditable)
    );

    draft.total_raised = Some(25_000_000);
    draft.target_amount = 10_000_000;
    assert!(matches!(
        listing.revise(&draft),
        Err(ListingValidationError::RaisedTotalOutOfRange { .. })
    ));
}

#[rstest]
fn set_raised_total_enforces_bounds(draft: ListingDraft) {
    let mut listing = build(&draft);
    assert_eq!(listing.set_raised_total(10_000_000), Ok(25_000_000));
    assert_eq!(listing.total_raised(), 10_000_000);
    assert!(listing.set_raised_total(-1).is_err());
    assert!(listing.set_raised_total(50_000_001).is_err());
    assert_eq!(listing.total_raised(), 10_000_000);
}

#[rstest]
fn listing_ids_must_be_slugs() {
    assert!(ListingId::new("Colombo Sky").is_err());
    assert_eq!(
        ListingId::new(" kandy-hills-1 ").expect("trimmed slug").as_ref(),
        "kandy-hills-1"
    );
}
