//! Authentication primitives: credentials, registration input and the
//! role guard applied before every mutating operation.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{Email, UserId, UserName, UserRole, UserValidationError};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Domain error returned when credential or registration payloads are
/// invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or malformed.
    Email(UserValidationError),
    /// Name was missing or out of bounds.
    Name(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password is shorter than [`PASSWORD_MIN_LEN`].
    PasswordTooShort { min: usize },
}

impl CredentialsValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Name(_) => "name",
            Self::EmptyPassword | Self::PasswordTooShort { .. } => "password",
        }
    }
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) | Self::Name(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password required"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is normalised.
/// - `password` is non-empty and retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use propvest::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Admin@Stake.com", "admin123").unwrap();
/// assert_eq!(creds.email().as_ref(), "admin@stake.com");
/// assert_eq!(creds.password(), "admin123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(CredentialsValidationError::Email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated self-service registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: UserName,
    email: Email,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw registration inputs.
    ///
    /// # Examples
    /// ```
    /// use propvest::domain::{CredentialsValidationError, Registration};
    ///
    /// let err = Registration::try_from_parts("Ann", "ann@example.com", "123").unwrap_err();
    /// assert_eq!(err, CredentialsValidationError::PasswordTooShort { min: 6 });
    /// ```
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let name = UserName::new(name).map_err(CredentialsValidationError::Name)?;
        let email = Email::new(email).map_err(CredentialsValidationError::Email)?;
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(CredentialsValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        Ok(Self {
            name,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raised when a principal lacks the role an operation requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("insufficient permissions: {required} role required")]
pub struct AccessDenied {
    pub required: UserRole,
    pub actual: UserRole,
}

/// Verified identity presented by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub email: Email,
    pub role: UserRole,
}

impl Principal {
    pub fn new(user_id: UserId, email: Email, role: UserRole) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    /// Guard an operation behind `required`.
    ///
    /// # Examples
    /// ```
    /// use propvest::domain::{Email, Principal, UserId, UserRole};
    ///
    /// let admin = Principal::new(
    ///     UserId::random(),
    ///     Email::new("admin@stake.com").unwrap(),
    ///     UserRole::Admin,
    /// );
    /// assert!(admin.require_role(UserRole::Admin).is_ok());
    /// assert!(admin.require_role(UserRole::Investor).is_err());
    /// ```
    pub fn require_role(&self, required: UserRole) -> Result<(), AccessDenied> {
        if self.role == required {
            Ok(())
        } else {
            Err(AccessDenied {
                required,
                actual: self.role,
            })
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", "email")]
    #[case("not-an-email", "pw", "email")]
    #[case("user@example.com", "", "password")]
    fn invalid_credentials(#[case] email: &str, #[case] password: &str, #[case] field: &str) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    #[case("A", "a@example.com", "secret1", "name")]
    #[case("Ann", "bad", "secret1", "email")]
    #[case("Ann", "a@example.com", "12345", "password")]
    fn invalid_registration(
        #[case] name: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let err = Registration::try_from_parts(name, email, password)
            .expect_err("invalid registration must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn registration_trims_name_and_normalises_email() {
        let registration = Registration::try_from_parts("  Ann Perera ", "Ann@Example.com", "secret1")
            .expect("valid registration");
        assert_eq!(registration.name().as_ref(), "Ann Perera");
        assert_eq!(registration.email().as_ref(), "ann@example.com");
    }

    #[rstest]
    #[case(UserRole::Admin, UserRole::Investor)]
    #[case(UserRole::Investor, UserRole::Admin)]
    fn guard_rejects_other_roles(#[case] actual: UserRole, #[case] required: UserRole) {
        let principal = Principal::new(
            UserId::random(),
            Email::new("someone@example.com").expect("valid email"),
            actual,
        );
        let denied = principal.require_role(required).expect_err("wrong role");
        assert_eq!(denied, AccessDenied { required, actual });
    }
}
