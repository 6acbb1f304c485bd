//! Stand-in for services without credentials. Every call fails with
//! `NotConfigured`, which the pipeline absorbs like any other outage.
use async_trait::async_trait;
use permit_core::{
    DesignPlatform, FetchedDocument, ReasoningService, SearchHit, SearchQuery, SearchService,
    ServiceError, ServiceResult, UpstreamProject, UpstreamSystem,
};

#[derive(Debug, Clone)]
pub struct Unconfigured {
    service: &'static str,
}

impl Unconfigured {
    pub fn new(service: &'static str) -> Self {
        Self { service }
    }

    fn error(&self) -> ServiceError {
        ServiceError::NotConfigured(format!("{} is not configured", self.service))
    }
}

#[async_trait]
impl DesignPlatform for Unconfigured {
    async fn fetch_project(&self, _external_id: &str) -> ServiceResult<UpstreamProject> {
        Err(self.error())
    }

    async fn fetch_systems(&self, _external_id: &str) -> ServiceResult<Vec<UpstreamSystem>> {
        Err(self.error())
    }

    async fn fetch_site_layout(&self, _system_id: &str) -> ServiceResult<FetchedDocument> {
        Err(self.error())
    }
}

#[async_trait]
impl SearchService for Unconfigured {
    async fn search(&self, _query: &SearchQuery) -> ServiceResult<Vec<SearchHit>> {
        Err(self.error())
    }
}

#[async_trait]
impl ReasoningService for Unconfigured {
    async fn complete(&self, _prompt: &str) -> ServiceResult<String> {
        Err(self.error())
    }
}
