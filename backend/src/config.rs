use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Server port (default: 5000)
    pub port: u16,
    /// Log level (default: info)
    pub log_level: String,
    /// CORS allowed origins (comma-separated, default: *)
    pub cors_origins: String,
    /// Deployment environment (default: development)
    pub environment: String,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadsConfig,
    pub mail: MailConfig,
}

/// SQLite storage settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL, e.g. `sqlite:data/clubhouse.db` or `sqlite::memory:`
    pub url: String,
}

/// Session and registration settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Token lifetime and inactivity window, in minutes (default: 60)
    pub session_ttl_minutes: i64,
    /// Maximum number of admin accounts (default: 3)
    pub registration_limit: u32,
    /// Bootstrap super admin, seeded at startup when all three are set
    pub superadmin_name: Option<String>,
    pub superadmin_email: Option<String>,
    pub superadmin_password: Option<String>,
}

/// File upload settings.
#[derive(Debug, Clone)]
pub struct UploadsConfig {
    /// Root directory for stored files (default: uploads)
    pub path: String,
}

/// Outbound mail settings. Delivery is disabled when `api_url` is unset.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// HTTP mail API endpoint
    pub api_url: Option<String>,
    /// Bearer key for the mail API
    pub api_key: Option<String>,
    /// Sender address (default: noreply@clubhouse.local)
    pub from: String,
    /// Recipient for admin notification mail
    pub admin_email: Option<String>,
    /// Name used in mail templates (default: Clubhouse)
    pub site_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            cors_origins: env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:data/clubhouse.db".to_string()),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .map_err(|_| ConfigError::MissingEnvVar("JWT_SECRET"))?,
                session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber("SESSION_TTL_MINUTES"))?,
                registration_limit: env::var("ADMIN_REGISTRATION_LIMIT")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber("ADMIN_REGISTRATION_LIMIT"))?,
                superadmin_name: env::var("SUPERADMIN_NAME").ok(),
                superadmin_email: env::var("SUPERADMIN_EMAIL").ok(),
                superadmin_password: env::var("SUPERADMIN_PASSWORD").ok(),
            },
            uploads: UploadsConfig {
                path: env::var("UPLOADS_PATH").unwrap_or_else(|_| "uploads".to_string()),
            },
            mail: MailConfig {
                api_url: env::var("MAIL_API_URL").ok(),
                api_key: env::var("MAIL_API_KEY").ok(),
                from: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "noreply@clubhouse.local".to_string()),
                admin_email: env::var("ADMIN_EMAIL").ok(),
                site_name: env::var("SITE_NAME").unwrap_or_else(|_| "Clubhouse".to_string()),
            },
        })
    }

    /// Whether 500 responses should hide error details.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid numeric value for {0}")]
    InvalidNumber(&'static str),
}
