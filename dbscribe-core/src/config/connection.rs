//! SQL Server connection settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::security::Credentials;

/// Connection section of the configuration file.
///
/// # Security
/// `password` is only held until [`ConnectionConfig::take_credentials`] moves
/// it into a zeroizing container. It is never serialized, and `Debug` and
/// `Display` never print it.
///
/// # Example
/// ```rust
/// use dbscribe_core::config::ConnectionConfig;
///
/// let config = ConnectionConfig::new("localhost".to_string())
///     .with_port(1433)
///     .with_database("Sales".to_string())
///     .with_username("reader".to_string());
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.to_string(), "ConnectionConfig(localhost:1433/Sales)");
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Server host name or address
    pub host: String,
    /// TCP port; ignored when `instance` is set
    pub port: Option<u16>,
    /// Named instance, resolved through the SQL Browser service
    pub instance: Option<String>,
    /// Database to document
    pub database: Option<String>,
    /// SQL login name
    pub username: Option<String>,
    /// SQL login password
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// ADO.NET connection string; when set, the fields above are ignored
    #[serde(skip_serializing)]
    pub connection_string: Option<String>,
    /// Accept the server certificate without validation
    pub trust_server_certificate: bool,
    /// Seconds to wait for the TCP connection and login
    pub connect_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: Some(1433),
            instance: None,
            database: None,
            username: None,
            password: None,
            connection_string: None,
            trust_server_certificate: false,
            connect_timeout_secs: 30,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(connection_string) = &self.connection_string {
            return write!(
                f,
                "ConnectionConfig({})",
                crate::error::redact_database_url(connection_string)
            );
        }
        write!(
            f,
            "ConnectionConfig({}{}{})",
            self.host,
            match (&self.instance, self.port) {
                (Some(instance), _) => format!("\\{instance}"),
                (None, Some(port)) => format!(":{port}"),
                (None, None) => String::new(),
            },
            self.database
                .as_ref()
                .map_or_else(String::new, |db| format!("/{db}"))
        )
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("instance", &self.instance)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl ConnectionConfig {
    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are missing or invalid
    pub fn validate(&self) -> crate::Result<()> {
        if self.connect_timeout_secs == 0 {
            return Err(crate::error::DbScribeError::configuration(
                "connect_timeout_secs must be greater than 0",
            ));
        }

        if let Some(connection_string) = &self.connection_string {
            if connection_string.trim().is_empty() {
                return Err(crate::error::DbScribeError::configuration(
                    "connection_string cannot be empty",
                ));
            }
            return Ok(());
        }

        if self.host.trim().is_empty() {
            return Err(crate::error::DbScribeError::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == Some(0) {
            return Err(crate::error::DbScribeError::configuration(
                "port must be greater than 0",
            ));
        }

        if self.database.as_deref().is_none_or(|db| db.trim().is_empty()) {
            return Err(crate::error::DbScribeError::configuration(
                "database is required unless connection_string is set",
            ));
        }

        Ok(())
    }

    /// Creates a new connection config with defaults for everything but the host.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Builder method to set username.
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Builder method to set the named instance.
    pub fn with_instance(mut self, instance: String) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// True when a password still needs to be supplied from outside the file.
    ///
    /// Connection strings carry their own credentials, and a config without a
    /// username has nothing to authenticate.
    pub fn needs_password(&self) -> bool {
        self.connection_string.is_none() && self.username.is_some() && self.password.is_none()
    }

    /// Moves the login out of the config into a zeroizing container.
    pub fn take_credentials(&mut self) -> Credentials {
        Credentials::new(
            self.username.clone().unwrap_or_default(),
            self.password.take(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid() -> ConnectionConfig {
        ConnectionConfig::new("db.internal".to_string()).with_database("Sales".to_string())
    }

    #[test]
    fn test_connection_config_default() {
        let config = ConnectionConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, Some(1433));
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert!(!config.trust_server_certificate);
    }

    #[test]
    fn test_connection_config_validation() {
        assert!(valid().validate().is_ok());

        let config = ConnectionConfig {
            host: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            port: Some(0),
            ..valid()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            database: None,
            ..valid()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            connect_timeout_secs: 0,
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connection_string_skips_field_validation() {
        let config = ConnectionConfig {
            host: String::new(),
            database: None,
            connection_string: Some("server=tcp:localhost,1433;database=Sales".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = ConnectionConfig {
            connection_string: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            connection_string: Some("server=tcp:localhost,1433;database=Sales".to_string()),
            connect_timeout_secs: 0,
            ..Default::default()
        };
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_display_and_debug_hide_credentials() {
        let mut config = valid()
            .with_port(1433)
            .with_username("reader".to_string());
        config.password = Some("hunter2".to_string());

        let display = config.to_string();
        assert_eq!(display, "ConnectionConfig(db.internal:1433/Sales)");
        assert!(!display.contains("reader"));

        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("****"));
    }

    #[test]
    fn test_display_named_instance() {
        let config = valid().with_instance("SQLEXPRESS".to_string());
        assert_eq!(
            config.to_string(),
            "ConnectionConfig(db.internal\\SQLEXPRESS/Sales)"
        );
    }

    #[test]
    fn test_display_connection_string_is_opaque() {
        let config = ConnectionConfig {
            connection_string: Some("server=x;password=secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.to_string(), "ConnectionConfig(<redacted>)");
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_take_credentials_moves_password() {
        let mut config = valid().with_username("reader".to_string());
        config.password = Some("hunter2".to_string());
        assert!(!config.needs_password());

        let creds = config.take_credentials();
        assert_eq!(creds.username(), "reader");
        assert_eq!(creds.password(), Some("hunter2"));
        assert!(config.password.is_none());
        assert!(config.needs_password());
    }

    #[test]
    fn test_password_never_serialized() {
        let mut config = valid().with_username("reader".to_string());
        config.password = Some("hunter2".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("password"));
    }
}
