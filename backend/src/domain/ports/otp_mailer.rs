//! Port for delivering verification codes.
use async_trait::async_trait;

use crate::domain::{Email, OtpCode};

use super::define_port_error;

define_port_error! {
    /// Delivery failures. Callers log these and carry on.
    pub enum OtpMailerError {
        /// The relay rejected or dropped the message.
        Delivery { message: String } => ServiceUnavailable, "otp delivery failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, to: &Email, code: &OtpCode) -> Result<(), OtpMailerError>;
}
