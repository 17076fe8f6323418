use sea_orm::{Database, DatabaseConnection};
use std::{error::Error, sync::Arc, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shop_backend::audit::{AuditClient, HttpAuditClient, TracingAuditClient};
use shop_backend::entities::setup_schema;
use shop_backend::storage::{LocalStorage, ObjectStorage};
use shop_backend::{create_api_router, AppState, Config};

const AUDIT_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db: DatabaseConnection = Database::connect(&config.database_url).await?;
    setup_schema(&db).await?;
    let shared_db = Arc::new(db);

    let storage: Arc<dyn ObjectStorage> = Arc::new(LocalStorage::new(
        config.storage_dir.clone(),
        config.public_url.clone(),
    ));
    let audit: Arc<dyn AuditClient> = match &config.audit_url {
        Some(url) => Arc::new(HttpAuditClient::new(url.clone(), AUDIT_TIMEOUT)?),
        None => {
            warn!("AUDIT_URL is not set, audit events only go to the log");
            Arc::new(TracingAuditClient)
        }
    };

    let state = AppState::new(&config, shared_db, storage, audit);
    if let Some(seed) = &config.admin {
        state.auth.ensure_admin(seed).await?;
    }

    let app = create_api_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
