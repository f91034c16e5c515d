use clap::Parser;
use tracing_subscriber::EnvFilter;

use checkgate::{CheckgateError, CheckgateServer, ServerConfig, StoreKind};
use checkgate_store::{MemoryStore, RedisStore, StoreBackend, TimeoutStore};

#[tokio::main]
async fn main() -> Result<(), CheckgateError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    let backend: StoreBackend = match config.store {
        StoreKind::Redis => RedisStore::connect(&config.redis_url()).await?.into(),
        StoreKind::Memory => {
            tracing::warn!("using in-memory store; codes are not shared between replicas");
            MemoryStore::new().into()
        }
    };
    tracing::info!(store = backend.kind(), mode = ?config.mode, "store ready");
    let store = TimeoutStore::new(backend, &config.store_config());

    let server = CheckgateServer::builder()
        .bind(&config.bind_addr())
        .session_config(config.session_config())
        .report_interval(config.report_interval())
        .build(store)
        .await?;

    // The store connection closes when the server (and its manager) drops.
    server.run().await?;
    tracing::info!("goodbye");
    Ok(())
}
