//! Tests for the in-process store and its snapshot files.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::MemoryStore;
use crate::domain::ports::{
    InvestmentRepository, ListingRepository, OtpRepository, TeamInvitePersistenceError,
    TeamInviteRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Email, Investment, InvestmentFilter, InvestmentId, InviteStatus, ListingId, OtpCode,
    OtpRecord, PasswordHash, RaisedTotalAdjustment, TeamInvite, User, UserDraft, UserId,
    UserName, UserRole,
};
use crate::test_support::cap_fs::{path_exists, read_file_to_string, write_file};
use crate::test_support::fixtures::{colombo_sky, listing, listing_draft};

fn user(email: &str) -> User {
    User::new(UserDraft {
        id: UserId::random(),
        email: Email::new(email).expect("email"),
        password_hash: PasswordHash::from_encoded("$argon2id$fixture"),
        name: UserName::new("Ann Perera").expect("name"),
        role: UserRole::Investor,
        is_verified: false,
        created_at: Utc::now(),
    })
}

fn investment(listing_id: &str, user: &User, amount: u64) -> Investment {
    Investment {
        id: InvestmentId::random(),
        listing_id: ListingId::new(listing_id).expect("id"),
        user_id: *user.id(),
        user_email: user.email().clone(),
        amount,
        date: Utc::now(),
    }
}

fn colombo_id() -> ListingId {
    ListingId::new("colombo-sky-1").expect("id")
}

#[fixture]
fn data_dir() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

#[rstest]
#[tokio::test]
async fn user_email_is_unique() {
    let store = MemoryStore::new();
    UserRepository::insert(&store, &user("ann@example.com"))
        .await
        .expect("first insert");
    let err = UserRepository::insert(&store, &user("ann@example.com"))
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, UserPersistenceError::Duplicate { .. }));
}

#[rstest]
#[tokio::test]
async fn invite_pair_is_unique_and_removal_is_idempotent() {
    let store = MemoryStore::new();
    let email = Email::new("bob@example.com").expect("email");
    let invite = TeamInvite::pending(colombo_id(), email.clone(), Utc::now());
    TeamInviteRepository::insert(&store, &invite)
        .await
        .expect("insert");
    let err = TeamInviteRepository::insert(
        &store,
        &TeamInvite::pending(colombo_id(), email.clone(), Utc::now()),
    )
    .await
    .expect_err("duplicate pair");
    assert!(matches!(err, TeamInvitePersistenceError::Duplicate { .. }));
    assert_eq!(
        TeamInviteRepository::list(&store, &colombo_id())
            .await
            .expect("list")
            .len(),
        1
    );

    assert!(TeamInviteRepository::remove(&store, &colombo_id(), &email)
        .await
        .expect("remove"));
    assert!(!TeamInviteRepository::remove(&store, &colombo_id(), &email)
        .await
        .expect("second remove"));
}

#[rstest]
#[tokio::test]
async fn delete_cascades_to_dependents() {
    let store = MemoryStore::new();
    let owner = user("ann@example.com");
    let other = listing(&listing_draft("galle-heritage-1", 75_000_000, 0, 750_000, 15.0));
    ListingRepository::upsert(&store, &colombo_sky()).await.expect("upsert");
    ListingRepository::upsert(&store, &other).await.expect("upsert");
    InvestmentRepository::append(&store, &investment("colombo-sky-1", &owner, 500_000))
        .await
        .expect("append");
    InvestmentRepository::append(&store, &investment("galle-heritage-1", &owner, 750_000))
        .await
        .expect("append");
    TeamInviteRepository::insert(
        &store,
        &TeamInvite::pending(colombo_id(), owner.email().clone(), Utc::now()),
    )
    .await
    .expect("invite");

    assert!(ListingRepository::delete_cascading(&store, &colombo_id())
        .await
        .expect("delete"));
    assert!(!ListingRepository::delete_cascading(&store, &colombo_id())
        .await
        .expect("second delete"));

    let remaining = InvestmentRepository::list(&store, &InvestmentFilter::All)
        .await
        .expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].listing_id.as_ref(), "galle-heritage-1");
    assert!(TeamInviteRepository::list(&store, &colombo_id())
        .await
        .expect("invites")
        .is_empty());
}

#[rstest]
#[tokio::test]
async fn otp_put_overwrites_previous_code() {
    let store = MemoryStore::new();
    let email = Email::new("ann@example.com").expect("email");
    for code in ["111111", "222222"] {
        OtpRepository::put(
            &store,
            &OtpRecord {
                email: email.clone(),
                code: OtpCode::parse(code).expect("code"),
                expires_at: Utc::now(),
            },
        )
        .await
        .expect("put");
    }
    let record = OtpRepository::find(&store, &email)
        .await
        .expect("find")
        .expect("present");
    assert_eq!(record.code.as_str(), "222222");
}

#[rstest]
#[tokio::test]
async fn snapshots_survive_reopen(data_dir: TempDir) {
    let owner = user("ann@example.com");
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).single().expect("time");
    {
        let store = MemoryStore::open(data_dir.path()).expect("open");
        UserRepository::insert(&store, &owner).await.expect("user");
        ListingRepository::upsert(&store, &colombo_sky()).await.expect("listing");
        InvestmentRepository::append(&store, &investment("colombo-sky-1", &owner, 500_000))
            .await
            .expect("investment");
        let mut invite = TeamInvite::pending(colombo_id(), owner.email().clone(), at);
        invite.accept();
        TeamInviteRepository::insert(&store, &invite).await.expect("invite");
        ListingRepository::record_adjustment(
            &store,
            &RaisedTotalAdjustment {
                listing_id: colombo_id(),
                previous_total: 0,
                new_total: 25_000_000,
                reason: "opening balance".to_owned(),
                actor_id: UserId::random(),
                actor_email: Email::new("admin@stake.com").expect("email"),
                at,
            },
        )
        .await
        .expect("adjustment");
    }

    assert!(path_exists(&data_dir.path().join("listings.json")));
    let listings_json =
        read_file_to_string(&data_dir.path().join("listings.json")).expect("read listings");
    assert!(listings_json.contains("\"totalRaised\": 25000000"));

    let reopened = MemoryStore::open(data_dir.path()).expect("reopen");
    let restored = UserRepository::find_by_email(&reopened, owner.email())
        .await
        .expect("find")
        .expect("user restored");
    assert_eq!(restored.id(), owner.id());
    assert_eq!(
        ListingRepository::find(&reopened, &colombo_id())
            .await
            .expect("find")
            .expect("listing restored"),
        colombo_sky()
    );
    let invites = TeamInviteRepository::list(&reopened, &colombo_id())
        .await
        .expect("invites");
    assert_eq!(invites[0].status, InviteStatus::Accepted);
    assert_eq!(
        ListingRepository::adjustments(&reopened, &colombo_id())
            .await
            .expect("adjustments")
            .len(),
        1
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_all_reach_the_snapshot(data_dir: TempDir) {
    let owner = user("ann@example.com");
    {
        let store = Arc::new(MemoryStore::open(data_dir.path()).expect("open"));
        let tasks: Vec<_> = (0..32)
            .map(|n| {
                let store = Arc::clone(&store);
                let entry = investment("colombo-sky-1", &owner, 500_000 + n);
                tokio::spawn(async move { InvestmentRepository::append(&*store, &entry).await })
            })
            .collect();
        for task in tasks {
            task.await.expect("task").expect("append");
        }
    }

    let reopened = MemoryStore::open(data_dir.path()).expect("reopen");
    let entries = InvestmentRepository::list(&reopened, &InvestmentFilter::All)
        .await
        .expect("list");
    assert_eq!(entries.len(), 32);
}

#[rstest]
fn corrupt_rows_fail_to_open(data_dir: TempDir) {
    let mut row = serde_json::to_value(super::models::ListingRow::from(&colombo_sky()))
        .expect("row json");
    row["totalRaised"] = serde_json::json!(60_000_000);
    write_file(
        &data_dir.path().join("listings.json"),
        serde_json::to_string(&vec![row]).expect("json").as_bytes(),
    )
    .expect("write");

    let err = MemoryStore::open(data_dir.path()).expect_err("invalid row");
    assert!(err.to_string().contains("invalid row"), "{err}");
}

#[rstest]
#[tokio::test]
async fn shared_store_serves_every_port() {
    let store = Arc::new(MemoryStore::new());
    let users: Arc<dyn UserRepository> = store.clone();
    let listings: Arc<dyn ListingRepository> = store.clone();
    users.insert(&user("ann@example.com")).await.expect("user");
    listings.upsert(&colombo_sky()).await.expect("listing");
    assert_eq!(listings.list().await.expect("list").len(), 1);
}
