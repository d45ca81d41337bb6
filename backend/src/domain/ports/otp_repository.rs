//! Port for pending verification codes keyed by email.
use async_trait::async_trait;

use crate::domain::{Email, OtpRecord};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by OTP repository adapters.
    pub enum OtpPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "otp repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError,
            "otp repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Store a code, replacing any pending code for the same email.
    async fn put(&self, record: &OtpRecord) -> Result<(), OtpPersistenceError>;

    async fn find(&self, email: &Email) -> Result<Option<OtpRecord>, OtpPersistenceError>;

    async fn delete(&self, email: &Email) -> Result<(), OtpPersistenceError>;
}
