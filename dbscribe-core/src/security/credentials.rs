//! Secure credential container with automatic memory zeroing.

use zeroize::{Zeroize, Zeroizing};

/// SQL login that zeroes its memory on drop.
///
/// # Example
///
/// ```rust
/// use dbscribe_core::security::Credentials;
///
/// let creds = Credentials::new("reader".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "reader");
/// assert!(creds.has_password());
/// assert!(!format!("{creds:?}").contains("secret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Gets the password, if any
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Checks if password is present without exposing it
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Replaces the password, zeroing the previous one
    pub fn set_password(&mut self, password: String) {
        self.password.zeroize();
        *self.password = Some(password);
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username.as_str())
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_with_password() {
        let creds = Credentials::new("sa_reader".to_string(), Some("P@ssw0rd!".to_string()));
        assert_eq!(creds.username(), "sa_reader");
        assert_eq!(creds.password(), Some("P@ssw0rd!"));
        assert!(creds.has_password());
    }

    #[test]
    fn test_login_without_password() {
        let creds = Credentials::new("sa_reader".to_string(), None);
        assert!(!creds.has_password());
        assert_eq!(creds.password(), None);
    }

    #[test]
    fn test_prompted_password_replaces_missing_one() {
        let mut creds = Credentials::new("sa_reader".to_string(), None);
        creds.set_password("prompted".to_string());
        assert_eq!(creds.password(), Some("prompted"));
        creds.set_password("retyped".to_string());
        assert_eq!(creds.password(), Some("retyped"));
        assert_eq!(creds.username(), "sa_reader");
    }

    #[test]
    fn test_debug_never_prints_password() {
        let creds = Credentials::new("sa_reader".to_string(), Some("P@ssw0rd!".to_string()));
        let debug = format!("{creds:?}");
        assert!(debug.contains("sa_reader"));
        assert!(!debug.contains("P@ssw0rd!"));
    }
}
