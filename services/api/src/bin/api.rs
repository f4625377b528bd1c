//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, ImageHostAdapter, LogNotifier, SmtpNotifier},
    config::Config,
    error::ApiError,
    web::{router, ApiDoc, AppState},
};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use storefront_core::{
    users, DatabaseService, DeliveryNotifier, ExternalIdentity, ImageStorageService,
    InMemoryDatabase, NotificationService,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Store ---
    let db: Arc<dyn DatabaseService> = if config.uses_memory_store() {
        warn!("Using the in-memory store; all data is lost on shutdown");
        Arc::new(InMemoryDatabase::new())
    } else {
        info!("Connecting to database...");
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;
        let db_adapter = DbAdapter::new(db_pool);
        info!("Running database migrations...");
        db_adapter.run_migrations().await?;
        info!("Database migrations complete.");
        Arc::new(db_adapter)
    };

    // --- 3. Initialize Service Adapters ---
    let notifier: Arc<dyn NotificationService> = match SmtpNotifier::from_config(&config.mail)? {
        Some(smtp) => {
            info!(host = ?config.mail.smtp_host, "Delivery emails will be sent over SMTP");
            Arc::new(smtp)
        }
        None => {
            warn!("SMTP is not configured; delivery emails will only be logged");
            Arc::new(LogNotifier)
        }
    };
    let delivery = Arc::new(DeliveryNotifier::new(notifier, config.notify_timeout));

    let images: Option<Arc<dyn ImageStorageService>> = match &config.image_api_key {
        Some(api_key) => Some(Arc::new(ImageHostAdapter::new(
            reqwest::Client::new(),
            config.image_upload_url.clone(),
            api_key.clone(),
        ))),
        None => {
            warn!("IMAGE_API_KEY is not set; image uploads are disabled");
            None
        }
    };

    // --- 4. Seed the First Admin ---
    if let Some(seed) = &config.bootstrap_admin {
        let name = seed
            .email
            .split('@')
            .next()
            .unwrap_or("admin")
            .to_string();
        users::bootstrap_admin(
            db.as_ref(),
            ExternalIdentity {
                subject: seed.subject.clone(),
                name,
                email: seed.email.clone(),
                avatar_url: None,
            },
        )
        .await?;
    }

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db,
        config: config.clone(),
        delivery,
        images,
    });

    // --- 6. Create the Web Router ---
    let app = Router::new()
        .merge(router(app_state)?)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
