use crate::config::ServerConfig;
use crate::error::ServerResult;
use corpus::DocumentStore;
use generation::GenConfig;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use ragline::PipelineConfig;
use retrieval::Retriever;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Retriever over the corpus store, index artifact, and embedding provider
    pub retriever: Arc<Retriever>,

    /// Generation settings applied to every answer
    pub generation: GenConfig,

    /// Caps in-flight provider calls; queries past the cap wait here
    pub provider_permits: Arc<Semaphore>,

    /// Prometheus recorder handle, present when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create server state from the pipeline config file the server config points at
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline = PipelineConfig::load(&config.pipeline_config)?;
        Self::with_pipeline(config, pipeline)
    }

    /// Create server state from an already-loaded pipeline config.
    ///
    /// Opens the corpus store and loads the index artifact and manifest.
    /// Fails up front when the artifacts are missing or disagree with each
    /// other, so a misconfigured server never starts serving queries.
    pub fn with_pipeline(config: ServerConfig, pipeline: PipelineConfig) -> ServerResult<Self> {
        let store = DocumentStore::open(&pipeline.corpus.store_path)?;
        let retriever = Retriever::open(
            store,
            &pipeline.index.artifact_path,
            &pipeline.index.manifest_path,
            &pipeline.index.compression_config(),
            pipeline.embedding.clone(),
            pipeline.retrieval.default_k,
        )?;

        // install_recorder registers a process-global recorder; a second
        // install in the same process fails and leaves this handle unset
        let metrics = if config.metrics_enabled {
            PrometheusBuilder::new().install_recorder().ok()
        } else {
            None
        };

        Ok(Self {
            provider_permits: Arc::new(Semaphore::new(config.max_concurrent_queries)),
            config: Arc::new(config),
            retriever: Arc::new(retriever),
            generation: pipeline.generation,
            metrics,
        })
    }
}
