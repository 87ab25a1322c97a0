use catalog::config::{Config, CoverStorageKind};
use catalog::covers::{CoverStorage, DiskCoverStorage, InlineCoverStorage};
use catalog::http::{AppState, HttpServer, HttpServerConfig};
use catalog::render::TemplateRenderer;
use catalog::sqlite::Sqlite;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = dotenvy::dotenv() {
        tracing::debug!("no .env file loaded: {err}");
    }
    let config = Config::from_env()?;

    let sqlite = Sqlite::new(config.database_url()).await?;
    let covers: Arc<dyn CoverStorage> = match config.cover_storage() {
        CoverStorageKind::Inline => Arc::new(InlineCoverStorage),
        CoverStorageKind::File => {
            let storage = DiskCoverStorage::new(config.upload_root().to_path_buf());
            storage.initialize().await?;
            Arc::new(storage)
        }
    };
    tracing::info!(cover_storage = ?config.cover_storage(), "storage ready");

    let state = AppState::new(Arc::new(sqlite), covers, Arc::new(TemplateRenderer::new()?));
    let server_config = HttpServerConfig::new(config.server_port(), config.upload_root());
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
