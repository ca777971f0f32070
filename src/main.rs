use sea_orm::{Database, DatabaseConnection};
use std::{error::Error, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use barq_motors::api::create_api_router;
use barq_motors::config::AppConfig;
use barq_motors::entities::{bootstrap_admin, setup_schema};
use barq_motors::realtime::MessageHub;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let db: DatabaseConnection = Database::connect(&config.database_url).await?;
    setup_schema(&db).await?;
    bootstrap_admin(&db, &config).await?;

    let shared_db = Arc::new(db);
    let hub = Arc::new(MessageHub::new());
    let bind_addr = config.bind_addr.clone();

    let app = create_api_router(shared_db, hub, Arc::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
