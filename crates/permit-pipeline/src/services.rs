//! Collaborators the orchestrator is wired against
use permit_core::{
    BlobStore, DesignPlatform, DocumentFetcher, EventLog, ReasoningService, SearchService,
    StateStore,
};
use std::sync::Arc;

/// Storage and outbound services shared by every run.
#[derive(Clone)]
pub struct PipelineServices {
    pub state: Arc<dyn StateStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub events: Arc<dyn EventLog>,
    pub platform: Arc<dyn DesignPlatform>,
    pub search: Arc<dyn SearchService>,
    pub reasoning: Arc<dyn ReasoningService>,
    pub fetcher: Arc<dyn DocumentFetcher>,
}
