//! Application state.

use std::sync::Arc;

use tracing::info;

use scout_analysis::{AnalysisConfig, AnalysisGateway};
use scout_media::{AcquireConfig, MediaAcquirer};
use scout_pipeline::{PipelineConfig, PipelineCoordinator};
use scout_realtime::{NotificationHub, RealtimeNotifier};
use scout_store::InMemoryStore;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<InMemoryStore>,
    pub hub: Arc<NotificationHub>,
    pub pipeline: PipelineCoordinator,
}

impl AppState {
    /// Create application state from environment configuration.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let gateway = AnalysisGateway::from_config(AnalysisConfig::from_env())?;
        let acquirer = MediaAcquirer::from_config(AcquireConfig::from_env());
        Ok(Self::with_components(config, gateway, acquirer, PipelineConfig::from_env()).await)
    }

    /// Wire state around explicit collaborators.
    pub async fn with_components(
        config: ApiConfig,
        gateway: AnalysisGateway,
        acquirer: MediaAcquirer,
        pipeline_config: PipelineConfig,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new());
        if config.seed_test_player && store.seed_test_player().await {
            info!("Seeded test player for local development");
        }

        let hub = Arc::new(NotificationHub::new());
        let pipeline = PipelineCoordinator::new(
            store.clone(),
            store.clone(),
            acquirer,
            gateway,
            RealtimeNotifier::new(hub.clone()),
            pipeline_config,
        );

        Self {
            config,
            store,
            hub,
            pipeline,
        }
    }
}
