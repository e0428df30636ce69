//! Login credentials type.

use std::fmt;

use crate::error::PreconditionError;

/// Shortest password the login form accepts.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Email and password used for a single login call.
///
/// Credentials are never persisted. The password is hidden from `Debug`
/// output so a stray `?credentials` in a log line does not leak it.
///
/// # Example
///
/// ```
/// use escooly_core::Credentials;
///
/// let creds = Credentials::new("a@b.com", "secret12");
/// assert_eq!(creds.email(), "a@b.com");
/// assert!(creds.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    ///
    /// Only for building the login request body.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Check the login form before anything is sent.
    ///
    /// The email must be present and well formed, and the password must
    /// be present and at least [`MIN_PASSWORD_LENGTH`] characters. The
    /// email is checked first, so a form with both fields empty reports
    /// the missing email.
    pub fn validate(&self) -> Result<(), PreconditionError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(PreconditionError::MissingEmail);
        }
        if !is_email(email) {
            return Err(PreconditionError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(PreconditionError::MissingPassword);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(PreconditionError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace and no empty domain labels.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
