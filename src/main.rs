use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use spikelab::application::ports::{ArtifactStore, JobRepository};
use spikelab::application::services::{AnalysisWorker, JobService};
use spikelab::domain::BaselineProfiles;
use spikelab::infrastructure::analysis::PassthroughAnalyzer;
use spikelab::infrastructure::auth::StaticTokenVerifier;
use spikelab::infrastructure::observability::{init_tracing, TracingConfig};
use spikelab::infrastructure::persistence::{create_pool, InMemoryJobRepository, PgJobRepository};
use spikelab::infrastructure::storage::LocalArtifactStore;
use spikelab::presentation::config::DatabaseBackend;
use spikelab::presentation::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().map_err(anyhow::Error::msg)?;

    init_tracing(
        TracingConfig::new(settings.server.environment.to_string()),
        settings.server.port,
    );

    let baselines = match &settings.baselines.profiles_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading baselines file {}", path))?;
            BaselineProfiles::from_json(&json).context("parsing baselines file")?
        }
        None => BaselineProfiles::builtin(),
    };
    tracing::info!(
        profiles = %baselines.names().collect::<Vec<_>>().join(", "),
        "Baseline profiles loaded"
    );

    let repository: Arc<dyn JobRepository> = match settings.database.backend {
        DatabaseBackend::Memory => Arc::new(InMemoryJobRepository::new()),
        DatabaseBackend::Postgres => {
            let url = settings
                .database
                .url
                .clone()
                .context("DATABASE_URL required for postgres backend")?;
            let pool = create_pool(&url, settings.database.max_connections)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            Arc::new(PgJobRepository::new(pool))
        }
    };

    let artifact_store: Arc<dyn ArtifactStore> = Arc::new(
        LocalArtifactStore::new(
            PathBuf::from(&settings.storage.root_path),
            settings.server.public_base_url.clone(),
        )
        .map_err(|e| anyhow::anyhow!(e))?,
    );

    let auth_verifier = Arc::new(
        StaticTokenVerifier::from_spec(&settings.auth.tokens).map_err(anyhow::Error::msg)?,
    );

    let (worker_sender, worker_receiver) = mpsc::channel(settings.worker.queue_capacity);

    let worker = AnalysisWorker::new(
        worker_receiver,
        Arc::clone(&repository),
        Arc::clone(&artifact_store),
        Arc::new(PassthroughAnalyzer),
    );
    tokio::spawn(worker.run());

    let job_service = Arc::new(JobService::new(
        repository,
        Arc::clone(&artifact_store),
        worker_sender,
        chrono::Duration::seconds(settings.storage.upload_ttl_secs),
        chrono::Duration::seconds(settings.storage.download_ttl_secs),
    ));

    let state = AppState {
        job_service,
        artifact_store,
        auth_verifier,
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
