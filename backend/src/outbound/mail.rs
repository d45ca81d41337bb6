//! Development mail adapter.
//!
//! Implements the `OtpMailer` port without an SMTP relay: every code is
//! written to the log at `warn` so an operator can complete verification
//! locally. Deployments wanting real delivery provide another adapter.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{OtpMailer, OtpMailerError};
use crate::domain::{Email, OtpCode};

/// Mailer that logs codes instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LoggingOtpMailer;

impl LoggingOtpMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OtpMailer for LoggingOtpMailer {
    async fn send_otp(&self, to: &Email, code: &OtpCode) -> Result<(), OtpMailerError> {
        warn!(
            email = %to,
            code = code.as_str(),
            "no mail relay configured; verification code logged"
        );
        Ok(())
    }
}
