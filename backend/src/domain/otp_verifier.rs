//! OTP verifier: issues single-use email codes and redeems them.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    OtpPersistenceError, OtpRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{CodeGenerator, Email, Error, ErrorCode, OtpCode, OtpRecord, User};

/// Default lifetime of an issued code, in seconds.
pub const DEFAULT_OTP_TTL_SECONDS: i64 = 600;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OtpError {
    #[error("no pending verification code")]
    NoPendingCode,
    #[error("verification code expired")]
    Expired,
    #[error("verification code does not match")]
    CodeMismatch,
    #[error("no account for {email}")]
    UnknownUser { email: Email },
    #[error(transparent)]
    Otps(#[from] OtpPersistenceError),
    #[error(transparent)]
    Users(#[from] UserPersistenceError),
}

impl OtpError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoPendingCode => "no_pending_code",
            Self::Expired => "expired",
            Self::CodeMismatch => "code_mismatch",
            Self::UnknownUser { .. } => "unknown_user",
            Self::Otps(_) | Self::Users(_) => "persistence",
        }
    }

    pub(crate) fn code(&self) -> ErrorCode {
        match self {
            Self::NoPendingCode | Self::Expired | Self::CodeMismatch => ErrorCode::InvalidRequest,
            Self::UnknownUser { .. } => ErrorCode::NotFound,
            Self::Otps(err) => err.code(),
            Self::Users(err) => err.code(),
        }
    }
}

impl From<OtpError> for Error {
    fn from(err: OtpError) -> Self {
        Error::new(err.code(), err.to_string()).with_reason(err.reason())
    }
}

/// Issues and redeems verification codes. At most one code is live per email.
#[derive(Clone)]
pub struct OtpVerifier {
    otps: Arc<dyn OtpRepository>,
    users: Arc<dyn UserRepository>,
    generator: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl OtpVerifier {
    pub fn new(
        otps: Arc<dyn OtpRepository>,
        users: Arc<dyn UserRepository>,
        generator: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            otps,
            users,
            generator,
            clock,
            ttl: TimeDelta::seconds(DEFAULT_OTP_TTL_SECONDS),
        }
    }

    /// Override the code lifetime.
    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    /// Generate a code for `email`, replacing any pending one.
    pub async fn issue(&self, email: &Email) -> Result<OtpCode, OtpError> {
        let code = self.generator.generate();
        let record = OtpRecord {
            email: email.clone(),
            code: code.clone(),
            expires_at: self.clock.utc() + self.ttl,
        };
        self.otps.put(&record).await?;
        debug!(email = %email, expires_at = %record.expires_at, "verification code issued");
        Ok(code)
    }

    /// Redeem `code` for `email` and mark the owning user verified.
    ///
    /// The pending record is cleared on success and on expiry, so a code can
    /// be redeemed at most once.
    pub async fn verify(&self, email: &Email, code: &str) -> Result<User, OtpError> {
        let record = self
            .otps
            .find(email)
            .await?
            .ok_or(OtpError::NoPendingCode)?;
        if record.is_expired(self.clock.utc()) {
            self.otps.delete(email).await?;
            return Err(OtpError::Expired);
        }
        if OtpCode::parse(code).as_ref() != Some(&record.code) {
            return Err(OtpError::CodeMismatch);
        }

        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| OtpError::UnknownUser {
                email: email.clone(),
            })?;
        user.mark_verified();
        self.users.update(&user).await?;
        self.otps.delete(email).await?;
        Ok(user)
    }
}

#[cfg(test)]
#[path = "otp_verifier_tests.rs"]
mod tests;
