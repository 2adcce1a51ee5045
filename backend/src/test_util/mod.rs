//! Shared fixtures for handler and integration tests.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::TokenKeys;
use crate::config::{AuthConfig, Config, DatabaseConfig, MailConfig, UploadsConfig};
use crate::db::Database;
use crate::mail::Mailer;
use crate::models::Admin;
use crate::realtime::Broadcaster;
use crate::AppState;

/// Password every fixture admin logs in with.
pub const TEST_PASSWORD: &str = "password123";

pub fn test_config(uploads_path: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 5000,
        log_level: "debug".to_string(),
        cors_origins: "*".to_string(),
        environment: "development".to_string(),
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
            session_ttl_minutes: 60,
            registration_limit: 3,
            superadmin_name: None,
            superadmin_email: None,
            superadmin_password: None,
        },
        uploads: UploadsConfig {
            path: uploads_path.to_string(),
        },
        mail: MailConfig {
            api_url: None,
            api_key: None,
            from: "noreply@club.test".to_string(),
            admin_email: None,
            site_name: "Clubhouse".to_string(),
        },
    }
}

/// In-memory state with a throwaway uploads directory and mail disabled.
pub fn create_test_state() -> Arc<AppState> {
    let uploads = std::env::temp_dir().join(format!("clubhouse-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&uploads).unwrap();
    let config = test_config(&uploads.to_string_lossy());

    let db = Arc::new(Database::open(&config.database.url).unwrap());
    let token_keys = TokenKeys::new(&config.auth.jwt_secret, config.auth.session_ttl_minutes);
    let mailer = Arc::new(Mailer::new(config.mail.clone()));

    Arc::new(AppState {
        db,
        token_keys,
        broadcaster: Broadcaster::new(),
        mailer,
        config,
    })
}

/// Insert an admin directly, bypassing the registration governor.
pub fn insert_test_admin(state: &AppState, email: &str, super_admin: bool) -> Admin {
    // Low bcrypt cost keeps the suite fast.
    let password_hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    let now = Utc::now();
    let admin = Admin {
        id: uuid::Uuid::new_v4().to_string(),
        name: email.split('@').next().unwrap_or("admin").to_string(),
        email: email.to_lowercase(),
        password_hash,
        role: "admin".to_string(),
        super_admin,
        avatar: None,
        last_active_at: now,
        created_at: now,
    };
    state.db.insert_admin(&admin).unwrap();
    admin
}
