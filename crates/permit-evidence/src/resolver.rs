//! Specification Resolver
//!
//! Per component: plan ranked queries, search (scoped before unscoped), have
//! each hit independently judged, and download the first accepted candidate
//! under the document policy. The first accepted candidate ends the search
//! for that component whatever its download outcome.

use crate::citation::cite;
use crate::domains::DomainTable;
use crate::extract::extract_specs;
use crate::fetch::{DocumentPolicy, MAX_DOCUMENT_BYTES};
use crate::query::{plan_queries, PlannedQuery};
use crate::validation::{is_affirmative, validation_prompt};
use futures::stream::{self, StreamExt};
use permit_core::{
    Component, ComponentSpecification, DocumentFetcher, FetchedDocument, ReasoningService,
    ResolutionOutcome, SearchHit, SearchQuery, SearchService, ServiceError, StageOutcome,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Search results requested per query, and the most ever considered
pub const MAX_RESULTS_PER_QUERY: u8 = 5;

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Components resolved at once
    pub concurrency: usize,
    pub results_per_query: u8,
    /// Applied to every search, validation, and download
    pub call_timeout: Duration,
    /// Pause between consecutive searches for one component
    pub inter_request_delay: Duration,
    pub max_document_bytes: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            results_per_query: MAX_RESULTS_PER_QUERY,
            call_timeout: Duration::from_secs(20),
            inter_request_delay: Duration::from_millis(500),
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }
}

/// A specification together with the datasheet bytes that back it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub specification: ComponentSpecification,
    /// Present exactly when `specification.spec_sheet_url` is
    pub document: Option<FetchedDocument>,
}

impl Resolution {
    fn unresolved(component: Component, outcome: ResolutionOutcome) -> Self {
        Self {
            specification: ComponentSpecification::unresolved(component, outcome),
            document: None,
        }
    }
}

pub struct SpecificationResolver {
    search: Arc<dyn SearchService>,
    reasoning: Arc<dyn ReasoningService>,
    fetcher: Arc<dyn DocumentFetcher>,
    domains: DomainTable,
    config: ResolverConfig,
}

impl SpecificationResolver {
    pub fn new(
        search: Arc<dyn SearchService>,
        reasoning: Arc<dyn ReasoningService>,
        fetcher: Arc<dyn DocumentFetcher>,
    ) -> Self {
        Self {
            search,
            reasoning,
            fetcher,
            domains: DomainTable::new(),
            config: ResolverConfig::default(),
        }
    }

    pub fn with_domains(mut self, domains: DomainTable) -> Self {
        self.domains = domains;
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve every component. The output has the input's length and order.
    pub async fn resolve_all(&self, components: &[Component]) -> StageOutcome<Vec<Resolution>> {
        let resolutions: Vec<Resolution> = stream::iter(components.iter().cloned())
            .map(|component| self.resolve(component))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let reasons = resolutions
            .iter()
            .filter_map(|r| match &r.specification.outcome {
                ResolutionOutcome::Failed { reason } => Some(format!(
                    "row {} ({}): {}",
                    r.specification.component.row,
                    r.specification.component.label(),
                    reason
                )),
                _ => None,
            })
            .collect();

        let resolved = resolutions.iter().filter(|r| r.document.is_some()).count();
        tracing::info!(
            components = components.len(),
            resolved,
            "specification resolution finished"
        );

        StageOutcome::from_reasons(resolutions, reasons)
    }

    /// Resolve one component. Never fails; service errors become an unresolved outcome.
    pub async fn resolve(&self, component: Component) -> Resolution {
        let plan = plan_queries(&component, &self.domains);
        let mut last_failure: Option<String> = None;

        for (index, planned) in plan.iter().enumerate() {
            if index > 0 && !self.config.inter_request_delay.is_zero() {
                tokio::time::sleep(self.config.inter_request_delay).await;
            }

            let hits = match self.bounded(self.search.search(&self.search_query(planned))).await {
                Ok(hits) => hits,
                Err(err) => {
                    tracing::warn!(row = component.row, query = %planned.text, error = %err, "search failed");
                    last_failure = Some(format!("search failed: {}", err));
                    continue;
                }
            };

            let limit = usize::from(self.config.results_per_query.min(MAX_RESULTS_PER_QUERY));
            for hit in hits.into_iter().take(limit) {
                match self.validate(&component, &hit).await {
                    Ok(true) => return self.accept(component, planned, hit).await,
                    Ok(false) => {
                        tracing::debug!(row = component.row, url = %hit.url, "candidate rejected by validation");
                    }
                    Err(err) => {
                        tracing::warn!(row = component.row, url = %hit.url, error = %err, "validation failed");
                        last_failure = Some(format!("validation failed: {}", err));
                    }
                }
            }
        }

        let outcome = match last_failure {
            Some(reason) => ResolutionOutcome::Failed { reason },
            None => ResolutionOutcome::NotFound,
        };
        tracing::info!(row = component.row, part = %component.label(), "no datasheet found");
        Resolution::unresolved(component, outcome)
    }

    /// Download a validated candidate and attach it if the policy allows.
    async fn accept(&self, component: Component, planned: &PlannedQuery, hit: SearchHit) -> Resolution {
        let policy = DocumentPolicy::new(self.config.max_document_bytes);
        let mut validated_specs = hit.text.as_deref().map(extract_specs).unwrap_or_default();

        let document = match self
            .bounded(self.fetcher.fetch(&hit.url, self.config.max_document_bytes))
            .await
        {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(row = component.row, url = %hit.url, error = %err, "datasheet download failed");
                let mut resolution = Resolution::unresolved(
                    component,
                    ResolutionOutcome::Failed {
                        reason: format!("download failed: {}", err),
                    },
                );
                resolution.specification.validated_specs = validated_specs;
                return resolution;
            }
        };

        if let Err(reason) = policy.check(&document) {
            tracing::warn!(row = component.row, url = %hit.url, %reason, "datasheet refused");
            let mut resolution =
                Resolution::unresolved(component, ResolutionOutcome::Rejected { reason });
            resolution.specification.validated_specs = validated_specs;
            return resolution;
        }

        if let Ok(body) = std::str::from_utf8(&document.bytes) {
            validated_specs.fill_from(extract_specs(body));
        }

        tracing::info!(row = component.row, url = %hit.url, bytes = document.bytes.len(), "datasheet resolved");
        Resolution {
            specification: ComponentSpecification {
                citation: Some(cite(&hit.url, &planned.text, hit.text.as_deref(), &document.bytes)),
                spec_sheet_url: Some(hit.url),
                validated_specs,
                outcome: ResolutionOutcome::Resolved,
                component,
            },
            document: Some(document),
        }
    }

    async fn validate(&self, component: &Component, hit: &SearchHit) -> Result<bool, ServiceError> {
        let answer = self
            .bounded(self.reasoning.complete(&validation_prompt(component, hit)))
            .await?;
        Ok(is_affirmative(&answer))
    }

    fn search_query(&self, planned: &PlannedQuery) -> SearchQuery {
        SearchQuery {
            text: planned.text.clone(),
            include_domains: planned.include_domains.clone(),
            num_results: self.config.results_per_query.min(MAX_RESULTS_PER_QUERY),
            include_text: true,
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(format!(
                "no answer within {}s",
                self.config.call_timeout.as_secs()
            ))),
        }
    }
}
