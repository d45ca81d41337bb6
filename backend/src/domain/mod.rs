//! Domain primitives, aggregates and services.
//!
//! Purpose: define the marketplace's entities and the rules that govern
//! them, independent of HTTP and storage. Services depend only on the
//! driven ports in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode — transport agnostic failure payload.
//! - User, Principal, Listing, Investment, TeamInvite, OtpRecord — entities.
//! - InvestmentLedger — admits and records commitments under a per-listing
//!   lock.
//! - ListingCatalogue, TeamInviteRegistry, OtpVerifier, AccountService,
//!   PortfolioProjector — the remaining use cases.

pub mod account_service;
pub mod auth;
pub mod demo_data;
pub mod error;
pub mod image;
pub mod investment;
pub mod invite_registry;
pub mod ledger;
pub mod listing;
pub mod listing_service;
pub mod locks;
pub mod otp;
pub mod otp_verifier;
pub mod ports;
pub mod projector;
mod slug;
pub mod team_invite;
pub mod user;

pub use self::account_service::{AccountError, AccountService, AccountServiceDeps, CodeDispatch};
pub use self::auth::{
    AccessDenied, CredentialsValidationError, LoginCredentials, PASSWORD_MIN_LEN, Principal,
    Registration,
};
pub use self::demo_data::{DemoSeeder, SeedOutcome};
pub use self::error::{Error, ErrorCode};
pub use self::image::{
    ImageUpload, ImageUploadError, MAX_IMAGE_BYTES, StoredImage, UPLOADS_PREFIX,
    content_type_for, is_safe_stored_name,
};
pub use self::investment::{Investment, InvestmentFilter, InvestmentId};
pub use self::invite_registry::{InviteError, TeamInviteRegistry};
pub use self::ledger::{InvestmentLedger, LedgerError};
pub use self::listing::{
    AdmissionRejection, Listing, ListingDraft, ListingId, ListingStatus, ListingValidationError,
    RaisedTotalAdjustment,
};
pub use self::listing_service::{ListingCatalogue, ListingError};
pub use self::locks::{ListingGuard, ListingLocks};
#[cfg(any(test, feature = "test-support"))]
pub use self::otp::FixedCodeGenerator;
pub use self::otp::{CodeGenerator, OtpCode, OtpRecord, RandomCodeGenerator};
pub use self::otp_verifier::{DEFAULT_OTP_TTL_SECONDS, OtpError, OtpVerifier};
pub use self::projector::{
    InvestorSummary, PortfolioProjector, ProjectionError, investable_step, investor_summary,
    progress_percent, progress_percent_of, remaining_capacity, snap_to_step,
};
pub use self::team_invite::{InviteId, InviteStatus, TeamInvite};
pub use self::user::{
    Email, PasswordHash, USER_NAME_MAX, USER_NAME_MIN, User, UserDraft, UserId, UserName,
    UserRole, UserValidationError,
};

