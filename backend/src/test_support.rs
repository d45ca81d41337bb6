//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The backend avoids direct `std::fs` calls. These helpers let test
    //! suites inspect snapshot and upload directories through `cap_std`.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Read a UTF-8 text file through `cap_std`.
    pub fn read_file_to_string(path: &Path) -> io::Result<String> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.read_to_string(Path::new(&file_name))
    }

    /// Write bytes to a file through `cap_std`.
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    /// Return true when `path` exists, false when it does not.
    pub fn path_exists(path: &Path) -> bool {
        let Ok((parent, file_name)) = parent_and_file_name(path) else {
            return false;
        };
        let Ok(directory) = Dir::open_ambient_dir(parent, ambient_authority()) else {
            return false;
        };
        directory.exists(Path::new(&file_name))
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file or directory name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

pub mod clock {
    //! Controllable clock for expiry and ordering tests.

    use std::sync::Mutex;

    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
    use mockable::Clock;

    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Clock pinned to 2025-01-01T00:00:00Z.
        pub fn fixed() -> Self {
            match Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single() {
                Some(now) => Self::new(now),
                None => panic!("fixture timestamp must be valid"),
            }
        }

        pub fn advance_seconds(&self, seconds: i64) {
            *self.lock_clock() += TimeDelta::seconds(seconds);
        }

        fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod fixtures {
    //! Builders for principals and listings used across test suites.

    use chrono::{TimeZone, Utc};

    use crate::domain::{
        Email, Listing, ListingDraft, ListingId, ListingStatus, Principal, UserId, UserRole,
    };

    pub fn investor(email: &str) -> Principal {
        principal(email, UserRole::Investor)
    }

    pub fn admin() -> Principal {
        principal("admin@stake.com", UserRole::Admin)
    }

    pub fn principal(email: &str, role: UserRole) -> Principal {
        match Email::new(email) {
            Ok(email) => Principal::new(UserId::random(), email, role),
            Err(error) => panic!("fixture email '{email}' is invalid: {error}"),
        }
    }

    /// Draft for a listing with the given funding numbers.
    pub fn listing_draft(
        id: &str,
        target_amount: i64,
        total_raised: i64,
        min_investment: i64,
        roi: f64,
    ) -> ListingDraft {
        ListingDraft {
            id: Some(id.to_owned()),
            title: format!("Fixture listing {id}"),
            city: "Colombo".to_owned(),
            category: "Residential".to_owned(),
            status: ListingStatus::Active.as_str().to_owned(),
            image: String::new(),
            min_investment,
            roi,
            target_amount,
            total_raised: Some(total_raised),
            duration_months: 24,
        }
    }

    /// Build a listing directly, bypassing any repository.
    pub fn listing(draft: &ListingDraft) -> Listing {
        let id = match draft.id.as_deref().map(ListingId::new) {
            Some(Ok(id)) => id,
            other => panic!("fixture listing id must be a valid slug: {other:?}"),
        };
        let created_at = match Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single() {
            Some(at) => at,
            None => panic!("fixture timestamp must be valid"),
        };
        match Listing::create(id, draft, created_at) {
            Ok(listing) => listing,
            Err(error) => panic!("fixture listing must be valid: {error}"),
        }
    }

    /// The reference listing: target 50M, raised 25M, minimum 500k, Active.
    pub fn colombo_sky() -> Listing {
        listing(&listing_draft(
            "colombo-sky-1",
            50_000_000,
            25_000_000,
            500_000,
            12.0,
        ))
    }
}

pub mod app {
    //! In-memory application state for HTTP integration tests.
    //!
    //! Verification codes are always [`TEST_OTP`] and are echoed in
    //! responses. Password hashing uses cheap Argon2 parameters.

    use std::sync::Arc;

    use actix_web::cookie::{Key, SameSite};
    use actix_web::web;
    use argon2::Params;
    use chrono::TimeDelta;
    use tempfile::TempDir;

    use super::clock::MutableClock;
    use crate::domain::{DEFAULT_OTP_TTL_SECONDS, DemoSeeder, FixedCodeGenerator, SeedOutcome};
    use crate::inbound::http::health::HealthState;
    use crate::inbound::http::state::HttpState;
    use crate::outbound::{Argon2Hasher, LocalImageStore, LoggingOtpMailer, MemoryStore};
    use crate::server::{AppDependencies, StateOptions, StatePorts, build_http_state};

    pub const TEST_OTP: &str = "123456";

    /// State plus the handles tests need to inspect or steer it.
    pub struct TestState {
        pub http: HttpState,
        pub store: Arc<MemoryStore>,
        pub clock: Arc<MutableClock>,
        pub hasher: Arc<Argon2Hasher>,
        /// Keeps the upload directory alive for the test's duration.
        pub uploads: TempDir,
    }

    impl TestState {
        /// Wire services over an empty store with a clock fixed at
        /// 2025-01-01T00:00:00Z.
        pub fn new() -> Self {
            let clock = Arc::new(MutableClock::fixed());
            let store = Arc::new(MemoryStore::new());
            let uploads = match tempfile::tempdir() {
                Ok(dir) => dir,
                Err(error) => panic!("upload temp dir: {error}"),
            };
            let images = match LocalImageStore::open(uploads.path(), clock.clone()) {
                Ok(images) => images,
                Err(error) => panic!("upload store: {error}"),
            };
            let params = match Params::new(1024, 1, 1, None) {
                Ok(params) => params,
                Err(error) => panic!("argon2 params: {error}"),
            };
            let hasher = Arc::new(Argon2Hasher::with_params(params));
            let http = build_http_state(
                StatePorts {
                    store: store.clone(),
                    images: Arc::new(images),
                    hasher: hasher.clone(),
                    mailer: Arc::new(LoggingOtpMailer::new()),
                    codes: Arc::new(FixedCodeGenerator(TEST_OTP)),
                    clock: clock.clone(),
                },
                StateOptions {
                    otp_ttl: TimeDelta::seconds(DEFAULT_OTP_TTL_SECONDS),
                    expose_dev_otp: true,
                },
            );
            Self {
                http,
                store,
                clock,
                hasher,
                uploads,
            }
        }

        /// Insert the demo accounts and listings.
        pub async fn seed_demo(&self) -> SeedOutcome {
            let seeder = DemoSeeder::new(
                self.store.clone(),
                self.store.clone(),
                self.hasher.clone(),
                self.clock.clone(),
            );
            match seeder.seed().await {
                Ok(outcome) => outcome,
                Err(error) => panic!("demo seeding failed: {error}"),
            }
        }

        /// App dependencies with a fresh key and an insecure cookie.
        pub fn app_dependencies(&self) -> AppDependencies {
            AppDependencies {
                health_state: web::Data::new(HealthState::new(self.clock.clone())),
                http_state: web::Data::new(self.http.clone()),
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
            }
        }
    }

    impl Default for TestState {
        fn default() -> Self {
            Self::new()
        }
    }
}
