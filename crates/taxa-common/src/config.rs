//! Database connection configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxaError};

// ============================================================================
// Database Configuration Constants
// ============================================================================

/// Default database driver.
pub const DEFAULT_DRIVERNAME: &str = "sqlite";

/// In-memory SQLite URL used when no database is named.
pub const SQLITE_MEMORY_URL: &str = "sqlite::memory:";

/// Connection settings for the taxonomy database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub drivername: String,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            drivername: DEFAULT_DRIVERNAME.to_string(),
            database: None,
            username: None,
            password: None,
            host: None,
            port: None,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a SQLite database file
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            database: Some(path.into()),
            ..Self::default()
        }
    }

    /// Whether this configuration targets SQLite
    pub fn is_sqlite(&self) -> bool {
        self.drivername.eq_ignore_ascii_case("sqlite")
    }

    /// Build the sqlx connection URL
    pub fn url(&self) -> Result<String> {
        let driver = self.drivername.to_lowercase();

        match driver.as_str() {
            "sqlite" => Ok(match self.database.as_deref() {
                None | Some("") | Some(":memory:") => SQLITE_MEMORY_URL.to_string(),
                Some(path) => format!("sqlite://{}?mode=rwc", path),
            }),
            "postgres" | "postgresql" => {
                let database = self
                    .database
                    .as_deref()
                    .ok_or_else(|| TaxaError::config("a database name is required for postgres"))?;

                let mut url = String::from("postgres://");
                if let Some(ref username) = self.username {
                    url.push_str(&urlencoding::encode(username));
                    if let Some(ref password) = self.password {
                        url.push(':');
                        url.push_str(&urlencoding::encode(password));
                    }
                    url.push('@');
                }
                url.push_str(self.host.as_deref().unwrap_or("localhost"));
                if let Some(port) = self.port {
                    url.push_str(&format!(":{}", port));
                }
                url.push('/');
                url.push_str(database);

                Ok(url)
            },
            other => Err(TaxaError::config(format!(
                "unsupported driver '{}', expected sqlite or postgres",
                other
            ))),
        }
    }
}
