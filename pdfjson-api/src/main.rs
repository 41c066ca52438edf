use anyhow::Result;
use pdfjson_api::{app, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfjson_api=debug,pdfjson=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    if !config.public_root.is_dir() {
        warn!(
            "Public directory {} does not exist, static files will return 404",
            config.public_root.display()
        );
    }

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("pdfjson API listening on http://{addr}");
    info!("Serving static files from {}", config.public_root.display());

    axum::serve(listener, app(&config)).await?;

    Ok(())
}
