//! Server configuration loaded from environment variables.

use std::env;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Shared secret expected in bearer tokens; `None` disables auth.
    pub auth_secret: Option<String>,
    /// Default page size for record browsing.
    pub records_page_size: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let auth_secret = env::var("AUTH_SECRET").ok().filter(|s| !s.is_empty());

        let records_page_size = env::var("RECORDS_PAGE_SIZE")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidPageSize)?;
        if records_page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }

        Ok(Config {
            host,
            port,
            database_url,
            auth_secret,
            records_page_size,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("PORT must be a valid port number")]
    InvalidPort,

    #[error("RECORDS_PAGE_SIZE must be a positive integer")]
    InvalidPageSize,
}
