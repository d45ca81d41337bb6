//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod image_store;
mod investment_repository;
mod listing_repository;
mod otp_mailer;
mod otp_repository;
mod password_hasher;
mod team_invite_repository;
mod user_repository;

#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use investment_repository::MockInvestmentRepository;
pub use investment_repository::{InvestmentPersistenceError, InvestmentRepository};
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingPersistenceError, ListingRepository};
#[cfg(test)]
pub use otp_mailer::MockOtpMailer;
pub use otp_mailer::{OtpMailer, OtpMailerError};
#[cfg(test)]
pub use otp_repository::MockOtpRepository;
pub use otp_repository::{OtpPersistenceError, OtpRepository};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use team_invite_repository::MockTeamInviteRepository;
pub use team_invite_repository::{TeamInvitePersistenceError, TeamInviteRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
