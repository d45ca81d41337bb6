//! Account service: registration, login and email verification.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    OtpMailer, PasswordHasher, PasswordHasherError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    CredentialsValidationError, Email, Error, ErrorCode, LoginCredentials, OtpCode, OtpError,
    OtpVerifier, Registration, User, UserDraft, UserId, UserRole,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Invalid(#[from] CredentialsValidationError),
    #[error("user already exists")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email not verified")]
    NotVerified,
    #[error("user not found")]
    UnknownUser,
    #[error("email already verified")]
    AlreadyVerified,
    #[error(transparent)]
    Otp(#[from] OtpError),
    #[error(transparent)]
    Users(UserPersistenceError),
    #[error(transparent)]
    Hasher(#[from] PasswordHasherError),
}

impl From<UserPersistenceError> for AccountError {
    fn from(err: UserPersistenceError) -> Self {
        match err {
            UserPersistenceError::Duplicate { .. } => Self::EmailTaken,
            other => Self::Users(other),
        }
    }
}

impl AccountError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "invalid_input",
            Self::EmailTaken => "email_taken",
            Self::InvalidCredentials => "invalid_credentials",
            Self::NotVerified => "not_verified",
            Self::UnknownUser => "unknown_user",
            Self::AlreadyVerified => "already_verified",
            Self::Otp(err) => err.reason(),
            Self::Users(_) | Self::Hasher(_) => "internal",
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::Invalid(_) => ErrorCode::InvalidRequest,
            Self::EmailTaken | Self::AlreadyVerified => ErrorCode::StateConflict,
            Self::InvalidCredentials => ErrorCode::Unauthorized,
            Self::NotVerified => ErrorCode::Forbidden,
            Self::UnknownUser => ErrorCode::NotFound,
            Self::Otp(err) => err.code(),
            Self::Users(err) => err.code(),
            Self::Hasher(err) => err.code(),
        }
    }
}

impl From<AccountError> for Error {
    fn from(err: AccountError) -> Self {
        let mut error = Error::new(err.code(), err.to_string()).with_reason(err.reason());
        if let AccountError::Invalid(invalid) = &err {
            error = error.with_field(invalid.field());
        }
        error
    }
}

/// Result of an operation that sent a verification code.
///
/// `dev_otp` carries the raw code only when the service was built with
/// code exposure enabled.
#[derive(Debug, Clone)]
pub struct CodeDispatch<T> {
    pub value: T,
    pub dev_otp: Option<OtpCode>,
}

/// Identity store operations.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    verifier: OtpVerifier,
    mailer: Arc<dyn OtpMailer>,
    clock: Arc<dyn Clock>,
    expose_dev_otp: bool,
}

/// Parameter object for [`AccountService::new`].
pub struct AccountServiceDeps {
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub verifier: OtpVerifier,
    pub mailer: Arc<dyn OtpMailer>,
    pub clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(deps: AccountServiceDeps) -> Self {
        let AccountServiceDeps {
            users,
            hasher,
            verifier,
            mailer,
            clock,
        } = deps;
        Self {
            users,
            hasher,
            verifier,
            mailer,
            clock,
            expose_dev_otp: false,
        }
    }

    /// Return issued codes to callers. Development only.
    pub fn exposing_dev_otp(mut self, expose: bool) -> Self {
        self.expose_dev_otp = expose;
        self
    }

    /// Create an unverified investor and send them a verification code.
    ///
    /// Mail delivery failures are logged; the account is still created.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<CodeDispatch<User>, AccountError> {
        let registration = Registration::try_from_parts(name, email, password)?;
        if self
            .users
            .find_by_email(registration.email())
            .await?
            .is_some()
        {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = self.hasher.hash(registration.password()).await?;
        let user = User::new(UserDraft {
            id: UserId::random(),
            email: registration.email().clone(),
            password_hash,
            name: registration.name().clone(),
            role: UserRole::Investor,
            is_verified: false,
            created_at: self.clock.utc(),
        });
        self.users.insert(&user).await?;
        info!(user_id = %user.id(), email = %user.email(), "account registered");

        let code = self.verifier.issue(user.email()).await?;
        self.deliver(user.email(), &code).await;
        Ok(self.dispatch(user, code))
    }

    /// Check credentials. Unverified accounts are refused.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        let user = self
            .users
            .find_by_email(credentials.email())
            .await?
            .ok_or(AccountError::InvalidCredentials)?;
        if !self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await?
        {
            return Err(AccountError::InvalidCredentials);
        }
        if !user.is_verified() {
            return Err(AccountError::NotVerified);
        }
        Ok(user)
    }

    /// Redeem a verification code for an existing account.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<User, AccountError> {
        let email = Self::parse_email(email)?;
        if self.users.find_by_email(&email).await?.is_none() {
            return Err(AccountError::UnknownUser);
        }
        let user = self.verifier.verify(&email, code).await?;
        info!(user_id = %user.id(), "email verified");
        Ok(user)
    }

    /// Issue a fresh code for an unverified account.
    pub async fn resend_otp(&self, email: &str) -> Result<CodeDispatch<()>, AccountError> {
        let email = Self::parse_email(email)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::UnknownUser)?;
        if user.is_verified() {
            return Err(AccountError::AlreadyVerified);
        }
        let code = self.verifier.issue(&email).await?;
        self.deliver(&email, &code).await;
        Ok(self.dispatch((), code))
    }

    /// Look up the account behind a session.
    pub async fn find_user(&self, id: &UserId) -> Result<Option<User>, AccountError> {
        Ok(self.users.find_by_id(id).await?)
    }

    fn parse_email(raw: &str) -> Result<Email, AccountError> {
        Email::new(raw)
            .map_err(|err| AccountError::Invalid(CredentialsValidationError::Email(err)))
    }

    async fn deliver(&self, email: &Email, code: &OtpCode) {
        if let Err(err) = self.mailer.send_otp(email, code).await {
            warn!(email = %email, error = %err, "verification email not delivered");
        }
    }

    fn dispatch<T>(&self, value: T, code: OtpCode) -> CodeDispatch<T> {
        CodeDispatch {
            value,
            dev_otp: self.expose_dev_otp.then_some(code),
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
