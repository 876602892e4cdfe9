use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bus_search::config::{ConfigError, WorkerConfig};
use bus_search::loader::Loader;
use bus_search::remote::{FetchError, HttpSource};
use bus_search::store::{DiskStore, StoreError};
use bus_search::worker::{self, Corpus, Routes, Stops, WorkerError};

const USAGE: &str = "usage: bus-search <routes|stops>";

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("{}", USAGE)]
    Usage,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error("stdio: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries protocol messages only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Usage) => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %e, "bus-search failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let kind = std::env::args().nth(1).ok_or(AppError::Usage)?;
    let config = WorkerConfig::from_env()?;

    let store = DiskStore::open(&config.cache_dir).await?;
    let source = HttpSource::new(config.remote.clone())?;
    let loader = Loader::new(store, source);

    info!(
        kind,
        cache_dir = %config.cache_dir.display(),
        base_url = %config.remote.base_url,
        "starting worker"
    );

    match kind.as_str() {
        "routes" => serve::<Routes>(loader, &config).await,
        "stops" => serve::<Stops>(loader, &config).await,
        _ => Err(AppError::Usage),
    }
}

/// Bridge stdin lines to the worker and its messages to stdout lines.
async fn serve<C: Corpus>(
    loader: Loader<DiskStore, HttpSource>,
    config: &WorkerConfig,
) -> Result<(), AppError> {
    let mut worker = worker::spawn::<C, _, _>(loader, config);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let ready = worker.recv_raw().await.ok_or(WorkerError::Closed)?;
    write_line(&mut stdout, &ready).await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        worker.send_raw(line).await?;
        let reply = worker.recv_raw().await.ok_or(WorkerError::Closed)?;
        write_line(&mut stdout, &reply).await?;
    }

    info!("stdin closed, shutting down");
    worker.shutdown().await?;
    Ok(())
}

async fn write_line(stdout: &mut tokio::io::Stdout, line: &str) -> std::io::Result<()> {
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
