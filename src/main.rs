use datasetiq_bridge::api::HttpSeriesClient;
use datasetiq_bridge::commands::{self, Command, Shell};
use datasetiq_bridge::config::BridgeConfig;
use datasetiq_bridge::session::Session;
use datasetiq_bridge::sheet::GridSheet;
use datasetiq_bridge::storage::{CredentialStore, FileStore};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::load()?;

    // Console (stderr) + daily rolling file
    let log_dir = BridgeConfig::log_dir();
    let (file_layer, _guard) = if config.logging.file {
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "datasetiq-bridge.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(non_blocking);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    tracing::info!("DataSetIQ bridge starting (API: {})", config.api.base_url);

    let credentials = match config.store_path() {
        Some(path) if config.storage.enabled => {
            let store = FileStore::new(path);
            tracing::info!("Using store at {:?}", store.path());
            CredentialStore::new(Arc::new(store))
        }
        _ => {
            tracing::warn!("Persistent storage disabled");
            CredentialStore::unsupported()
        }
    };

    let api = Arc::new(HttpSeriesClient::new(&config.api)?);
    let sheet = Arc::new(GridSheet::new());
    let session = Session::new(credentials, api, sheet.clone());
    session.bootstrap().await;

    let shell = Shell::new(session.clone(), sheet);
    let mut stdout = tokio::io::stdout();
    let initial = commands::render(&session.snapshot().await);
    stdout.write_all(format!("{}\nType `help` for commands.\n> ", initial).as_bytes()).await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let output = match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => match shell.execute(command).await {
                Ok(text) => text,
                Err(e) => format!("Error: {}", e),
            },
            Err(e) => e,
        };
        stdout.write_all(format!("{}\n> ", output).as_bytes()).await?;
        stdout.flush().await?;
    }

    tracing::info!("DataSetIQ bridge exiting");
    Ok(())
}
