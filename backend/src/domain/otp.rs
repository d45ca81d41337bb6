//! One-time email verification codes.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use zeroize::Zeroizing;

use super::user::Email;

/// Number of digits in an issued code.
pub const OTP_DIGITS: usize = 6;

/// Six-digit numeric verification code.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(Zeroizing<String>);

impl OtpCode {
    /// Parse a caller-supplied code. Surrounding whitespace is ignored.
    ///
    /// # Examples
    /// ```
    /// use propvest::domain::OtpCode;
    ///
    /// assert!(OtpCode::parse(" 123456 ").is_some());
    /// assert!(OtpCode::parse("12345").is_none());
    /// assert!(OtpCode::parse("12a456").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (trimmed.len() == OTP_DIGITS && trimmed.chars().all(|ch| ch.is_ascii_digit()))
            .then(|| Self(Zeroizing::new(trimmed.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(<redacted>)")
    }
}

/// Pending code for an email address. At most one exists per email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub email: Email,
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Source of fresh verification codes.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> OtpCode;
}

/// Generator backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> OtpCode {
        let value: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        OtpCode(Zeroizing::new(value.to_string()))
    }
}

/// Generator returning the same code every time.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
pub struct FixedCodeGenerator(pub &'static str);

#[cfg(any(test, feature = "test-support"))]
impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self) -> OtpCode {
        OtpCode(Zeroizing::new(self.0.to_owned()))
    }
}
