//! Builders that wire storage adapters into the domain services behind
//! [`HttpState`].

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::TimeDelta;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{ImageStore, OtpMailer, PasswordHasher};
use crate::domain::{
    AccountService, AccountServiceDeps, CodeGenerator, DemoSeeder, Error, InvestmentLedger,
    ListingCatalogue, ListingLocks, OtpVerifier, PortfolioProjector, RandomCodeGenerator,
    TeamInviteRegistry,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::{Argon2Hasher, LocalImageStore, LoggingOtpMailer, MemoryStore, SnapshotError};

use super::AppSettings;

/// Adapters the services are built from.
pub struct StatePorts {
    pub store: Arc<MemoryStore>,
    pub images: Arc<dyn ImageStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub mailer: Arc<dyn OtpMailer>,
    pub codes: Arc<dyn CodeGenerator>,
    pub clock: Arc<dyn Clock>,
}

/// Tunables applied while building services.
#[derive(Debug, Clone, Copy)]
pub struct StateOptions {
    pub otp_ttl: TimeDelta,
    pub expose_dev_otp: bool,
}

/// Build every service over one store. Listing writes share a single
/// [`ListingLocks`] so commits, adjustments and deletions serialise per
/// listing.
pub fn build_http_state(ports: StatePorts, options: StateOptions) -> HttpState {
    let StatePorts {
        store,
        images,
        hasher,
        mailer,
        codes,
        clock,
    } = ports;
    let locks = ListingLocks::new();

    let verifier = OtpVerifier::new(store.clone(), store.clone(), codes, clock.clone())
        .with_ttl(options.otp_ttl);
    let accounts = AccountService::new(AccountServiceDeps {
        users: store.clone(),
        hasher,
        verifier,
        mailer,
        clock: clock.clone(),
    })
    .exposing_dev_otp(options.expose_dev_otp);

    HttpState {
        accounts,
        listings: ListingCatalogue::new(store.clone(), locks.clone(), clock.clone()),
        ledger: InvestmentLedger::new(store.clone(), store.clone(), locks, clock.clone()),
        portfolio: PortfolioProjector::new(store.clone(), store.clone()),
        teams: TeamInviteRegistry::new(store.clone(), store, clock.clone()),
        images,
        clock,
    }
}

/// Failures while preparing runtime state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load data snapshots: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("failed to open upload directory {path}: {source}")]
    Uploads {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to seed demo data: {0}")]
    Seed(#[source] Error),
}

/// Open storage, build the services and optionally seed demo data.
pub async fn build_runtime_state(settings: &AppSettings) -> Result<HttpState, StartupError> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store = Arc::new(match settings.data_dir.as_deref() {
        Some(dir) => MemoryStore::open(dir)?,
        None => MemoryStore::new(),
    });
    let upload_dir = settings.upload_dir();
    let images = LocalImageStore::open(&upload_dir, clock.clone()).map_err(|source| {
        StartupError::Uploads {
            path: upload_dir.clone(),
            source,
        }
    })?;
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());

    if settings.seed_demo_data() {
        DemoSeeder::new(store.clone(), store.clone(), hasher.clone(), clock.clone())
            .seed()
            .await
            .map_err(StartupError::Seed)?;
    }

    Ok(build_http_state(
        StatePorts {
            store,
            images: Arc::new(images),
            hasher,
            mailer: Arc::new(LoggingOtpMailer::new()),
            codes: Arc::new(RandomCodeGenerator),
            clock,
        },
        StateOptions {
            otp_ttl: settings.otp_ttl(),
            expose_dev_otp: settings.expose_dev_otp(),
        },
    ))
}
