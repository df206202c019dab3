use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use statdash::config::Settings;
use statdash::interface::DashboardInterface;
use statdash::persist::Database;
use statdash::registry::REGISTRY_VERSION;
use statdash::server::router;
use statdash::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;
    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db = Arc::new(Database::new(settings.persistence_mode())?);
    info!(
        database = %settings.database.path,
        registry = REGISTRY_VERSION,
        max_tables = settings.limits.max_tables,
        time_budget_ms = settings.limits.time_budget_ms,
        "statdash starting"
    );
    let interface = Arc::new(DashboardInterface::new(db, settings.limits()));

    let listener = tokio::net::TcpListener::bind(&settings.server.bind).await?;
    info!(bind = %settings.server.bind, "listening");
    axum::serve(listener, router(interface)).await?;
    Ok(())
}
