use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clubhouse_backend::auth::{seed_super_admin, TokenKeys};
use clubhouse_backend::mail::Mailer;
use clubhouse_backend::realtime::Broadcaster;
use clubhouse_backend::{build_router, AppState, Config, Database};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting {} API", config.mail.site_name);
    if config.is_production() && config.cors_origins.trim() == "*" {
        tracing::warn!("CORS_ORIGINS is not set, accepting requests from any origin");
    }

    // Open the database and make sure upload directories exist before the
    // first multipart request arrives.
    let db = Arc::new(Database::open(&config.database.url)?);
    for subdir in ["gallery", "documents", "avatars"] {
        tokio::fs::create_dir_all(format!("{}/{}", config.uploads.path, subdir)).await?;
    }

    seed_super_admin(&db, &config.auth)?;

    let token_keys = TokenKeys::new(&config.auth.jwt_secret, config.auth.session_ttl_minutes);
    let mailer = Arc::new(Mailer::new(config.mail.clone()));
    if !mailer.is_enabled() {
        tracing::warn!("MAIL_API_URL not set, outgoing email is disabled");
    }

    let state = Arc::new(AppState {
        db,
        token_keys,
        broadcaster: Broadcaster::new(),
        mailer,
        config,
    });

    let app = build_router(state.clone());

    // Start server
    let addr = format!("{}:{}", state.config.host, state.config.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
