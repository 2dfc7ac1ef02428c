//! Login credentials type.

use std::fmt;

/// Login credentials for the Rinnai account.
///
/// Holds the account identity (the e-mail address the account was registered
/// with) and its password.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use rinnai_core::Credentials;
///
/// let creds = Credentials::new("user@example.com", "hunter2");
/// assert_eq!(creds.identity(), "user@example.com");
/// ```
#[derive(Clone)]
pub struct Credentials {
    identity: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(identity: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            password: password.into(),
        }
    }

    /// Returns the account identity.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
