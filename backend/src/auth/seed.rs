//! Startup seeding of the bootstrap super admin.

use chrono::Utc;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::db::{Database, DbError};
use crate::models::Admin;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Password hash failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Ensure the configured super admin exists. Skips quietly when the env
/// credentials are absent or a super admin is already present; promotes
/// an existing account rather than duplicating it.
pub fn seed_super_admin(db: &Database, config: &AuthConfig) -> Result<(), SeedError> {
    let (email, password) = match (&config.superadmin_email, &config.superadmin_password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            tracing::info!(
                "SUPERADMIN_EMAIL and SUPERADMIN_PASSWORD not set, skipping super admin seeding"
            );
            return Ok(());
        }
    };
    let email = email.to_lowercase();

    if db.count_super_admins()? > 0 {
        tracing::info!("Super admin already exists, skipping seeding");
        return Ok(());
    }

    if let Some(existing) = db.find_admin_by_email(&email)? {
        db.promote_to_super_admin(&existing.id)?;
        tracing::info!("Promoted existing admin to super admin: {}", existing.email);
        return Ok(());
    }

    let now = Utc::now();
    let admin = Admin {
        id: Uuid::new_v4().to_string(),
        name: config
            .superadmin_name
            .clone()
            .unwrap_or_else(|| "Super Admin".to_string()),
        email,
        password_hash: bcrypt::hash(password, bcrypt::DEFAULT_COST)?,
        role: "admin".to_string(),
        super_admin: true,
        avatar: None,
        last_active_at: now,
        created_at: now,
    };
    db.insert_admin(&admin)?;
    tracing::info!("Super admin created: {}", admin.email);
    Ok(())
}
