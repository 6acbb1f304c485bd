//! Orchestrator: runs the stages in order and owns every status transition.
//!
//! The persisted status is the only lock. Each transition is a
//! compare-and-set against the status this orchestrator last wrote, so a
//! second request for the same project loses the race deterministically and
//! is answered with `ConcurrencyConflict`. A run that cannot finish moves
//! its project to `failed`, which releases the lock.

use crate::config::PipelineConfig;
use crate::lock::RunLock;
use crate::services::PipelineServices;
use permit_core::{
    ComponentSpecification, EventKind, EventLog, PermitError, PermitPacket, PermitResult,
    ProjectMetadata, ResolutionOutcome, RunContext, RunEvent, RunRecord, RunStatus, StageId,
    StageOutcome, StageTimer, StateStore,
};
use permit_docs::{DocumentAssembler, TemplateRenderer};
use permit_evidence::{DomainTable, SpecificationResolver};
use permit_feasibility::{FeasibilityGate, FeasibilityScorer, GateVerdict};
use permit_ingest::IngestionAdapter;
use permit_package::Packager;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;

const MAX_PROJECT_ID_LEN: usize = 128;

/// Start (or restart) analysis of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub project_id: String,
    pub external_project_id: String,
    #[serde(default)]
    pub project_metadata: ProjectMetadata,
}

/// Project ids namespace blob paths, so only `[A-Za-z0-9._-]` is accepted.
pub fn validate_project_id(project_id: &str) -> PermitResult<()> {
    let valid = !project_id.is_empty()
        && project_id.len() <= MAX_PROJECT_ID_LEN
        && !project_id.chars().all(|c| c == '.')
        && project_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(PermitError::InvalidRequest(format!(
            "project id {:?} must be 1-{} characters of [A-Za-z0-9._-]",
            project_id, MAX_PROJECT_ID_LEN
        )))
    }
}

/// A finished generation: the packet plus the specifications it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub packet: PermitPacket,
    pub specifications: Vec<ComponentSpecification>,
}

/// Entry point for every run. Cheap to clone.
///
/// Runs execute on their own tokio task. A caller that stops waiting (client
/// disconnect, request timeout) leaves the run going, and the run still ends
/// in a settled status.
#[derive(Clone)]
pub struct Orchestrator {
    pipeline: Arc<Pipeline>,
}

impl Orchestrator {
    pub fn new(services: PipelineServices, config: PipelineConfig, renderer: TemplateRenderer) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(services, config, renderer)),
        }
    }

    /// Ingest, score and gate a project.
    ///
    /// A project may be (re)analyzed when it has no record yet or is
    /// `analyzed`, `ready_for_generation` or `failed`. Rejected and generated
    /// projects are final; pending and generating ones are in flight.
    pub async fn analyze(&self, request: AnalyzeRequest) -> PermitResult<RunRecord> {
        let pipeline = self.pipeline.clone();
        detached(async move { pipeline.analyze(request).await }).await
    }

    /// Resolve, assemble and package. `regenerate` is required to leave
    /// `generated`; a fresh run id is issued for every attempt after the first
    /// so earlier artifacts are never touched.
    pub async fn generate(&self, project_id: &str, regenerate: bool) -> PermitResult<Generation> {
        let pipeline = self.pipeline.clone();
        let project_id = project_id.to_string();
        detached(async move { pipeline.generate(&project_id, regenerate).await }).await
    }

    /// Current run record for a project.
    pub async fn status(&self, project_id: &str) -> PermitResult<RunRecord> {
        validate_project_id(project_id)?;
        self.pipeline
            .state
            .get(project_id)
            .await?
            .ok_or_else(|| PermitError::NotFound(format!("project {}", project_id)))
    }

    /// Every event recorded for a project, oldest first.
    pub async fn events(&self, project_id: &str) -> PermitResult<Vec<RunEvent>> {
        validate_project_id(project_id)?;
        Ok(self.pipeline.events.list(project_id).await?)
    }
}

async fn detached<T, F>(run: F) -> PermitResult<T>
where
    T: Send + 'static,
    F: Future<Output = PermitResult<T>> + Send + 'static,
{
    match tokio::spawn(run).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(%err, "run task aborted");
            Err(PermitError::RunAborted(err.to_string()))
        }
    }
}

struct Pipeline {
    state: Arc<dyn StateStore>,
    events: Arc<dyn EventLog>,
    ingest: IngestionAdapter,
    scorer: FeasibilityScorer,
    gate: FeasibilityGate,
    resolver: SpecificationResolver,
    assembler: DocumentAssembler,
    packager: Packager,
}

impl Pipeline {
    fn new(services: PipelineServices, config: PipelineConfig, renderer: TemplateRenderer) -> Self {
        let resolver = SpecificationResolver::new(
            services.search.clone(),
            services.reasoning.clone(),
            services.fetcher.clone(),
        )
        .with_domains(DomainTable::with_overrides(&config.manufacturer_domains))
        .with_config(config.resolver.clone());

        Self {
            ingest: IngestionAdapter::new(services.platform.clone(), config.ingest_timeout),
            scorer: FeasibilityScorer::new(services.reasoning.clone(), config.scorer_timeout),
            gate: FeasibilityGate::new(),
            resolver,
            assembler: DocumentAssembler::new(
                renderer,
                services.blobs.clone(),
                services.platform.clone(),
                config.layout_timeout,
            ),
            packager: Packager::new(services.blobs),
            state: services.state,
            events: services.events,
        }
    }

    // ========================================================================
    // ANALYSIS: pending → analyzed → rejected | ready_for_generation
    // ========================================================================

    async fn analyze(&self, request: AnalyzeRequest) -> PermitResult<RunRecord> {
        validate_project_id(&request.project_id)?;
        let external_id = request.external_project_id.trim().to_string();
        if external_id.is_empty() {
            return Err(PermitError::InvalidRequest(
                "externalProjectId is required".to_string(),
            ));
        }

        let previous = self.state.get(&request.project_id).await?;
        if let Some(prev) = &previous {
            if !matches!(
                prev.status,
                RunStatus::Analyzed | RunStatus::ReadyForGeneration | RunStatus::Failed
            ) {
                return Err(PermitError::ConcurrencyConflict {
                    current: prev.status,
                });
            }
        }

        let ctx = RunContext::new(&request.project_id);
        let mut record = RunRecord::new(
            &ctx.project_id,
            &ctx.run_id,
            &external_id,
            request.project_metadata,
        );
        if let Some(prev) = &previous {
            record.superseded_runs = prev.superseded_runs.clone();
        }
        self.state
            .compare_and_set(previous.as_ref().map(|r| r.status), record.clone())
            .await?;
        let lock = RunLock::acquired(self.state.clone(), &record.project_id, &record.run_id);

        let outcome = self.run_analysis(record, &external_id).await;
        lock.release();
        outcome
    }

    async fn run_analysis(&self, mut record: RunRecord, external_id: &str) -> PermitResult<RunRecord> {
        self.emit(
            &record,
            EventKind::AnalysisStarted,
            format!("analysis started for {}", external_id),
            None,
        )
        .await;
        tracing::info!(project_id = %record.project_id, run_id = %record.run_id, "analysis started");

        // Ingestion
        let timer = StageTimer::start(StageId::Ingest, &json!({ "externalProjectId": external_id }));
        let ingested = self.ingest.ingest(external_id).await;
        record.stages.push(timer.finish(&ingested));
        let (ingested, ingest_reasons) = ingested.into_parts();
        if !ingest_reasons.is_empty() {
            self.emit(
                &record,
                EventKind::IngestionDegraded,
                "design platform data incomplete; continuing with placeholders",
                Some(json!({ "reasons": ingest_reasons })),
            )
            .await;
        }

        record.system.project_info =
            ProjectMetadata::merged(&record.requested_metadata, &ingested.metadata);
        record.system.components = ingested.components;
        record.system.system_id = ingested.system_id;
        record.system.degraded = ingested.degraded;
        let low_confidence: Vec<String> = ingested.notes.iter().map(|n| n.as_issue()).collect();
        if let Err(err) = self.persist(&record).await {
            return Err(self.abandon(&record, RunStatus::Pending, err).await);
        }

        // Scoring
        let timer = StageTimer::start(
            StageId::Score,
            &json!({
                "components": record.system.components,
                "metadata": record.system.project_info,
            }),
        );
        let report = self
            .scorer
            .score(
                &record.system.components,
                &record.system.project_info,
                &low_confidence,
            )
            .await;
        record.stages.push(timer.finish(&report));
        let (report, _) = report.into_parts();
        let score = report.score.clone();
        record.system.feasibility_score = Some(report.score);
        record.system.issues = report.issues;
        record.system.recommendations = report.recommendations;
        self.emit(
            &record,
            EventKind::Scored,
            format!("feasibility score {}", score.value),
            Some(json!({ "score": score.value, "estimated": score.estimated })),
        )
        .await;

        let analyzed = record.advanced(RunStatus::Analyzed);
        if let Err(err) = self.transition(RunStatus::Pending, &analyzed).await {
            return Err(self.abandon(&record, RunStatus::Pending, err).await);
        }
        let mut record = analyzed;

        // Gate
        let timer = StageTimer::start(StageId::Gate, &score);
        let verdict = self.gate.evaluate(&score);
        record.stages.push(timer.finish_value(&verdict));

        if let GateVerdict::Reject { reason, .. } = &verdict {
            let mut rejected = record.advanced(RunStatus::Rejected);
            rejected.error = Some(reason.clone());
            if let Err(err) = self.transition(RunStatus::Analyzed, &rejected).await {
                return Err(self.abandon(&record, RunStatus::Analyzed, err).await);
            }
            self.emit(
                &rejected,
                EventKind::Rejected,
                reason.clone(),
                Some(json!({ "score": score.value, "issues": rejected.system.issues })),
            )
            .await;
            tracing::info!(project_id = %rejected.project_id, score = score.value, "project rejected");
        }
        if let Some(err) = verdict.into_error(&record.system.issues) {
            return Err(err);
        }

        let ready = record.advanced(RunStatus::ReadyForGeneration);
        if let Err(err) = self.transition(RunStatus::Analyzed, &ready).await {
            return Err(self.abandon(&record, RunStatus::Analyzed, err).await);
        }
        self.emit(
            &ready,
            EventKind::Ready,
            "ready for generation",
            Some(json!({ "score": score.value, "estimated": score.estimated })),
        )
        .await;
        tracing::info!(project_id = %ready.project_id, score = score.value, "project ready for generation");
        Ok(ready)
    }

    // ========================================================================
    // GENERATION: ready_for_generation | failed | generated → generating → …
    // ========================================================================

    async fn generate(&self, project_id: &str, regenerate: bool) -> PermitResult<Generation> {
        validate_project_id(project_id)?;
        let current = self
            .state
            .get(project_id)
            .await?
            .ok_or_else(|| PermitError::NotFound(format!("project {}", project_id)))?;

        if !current.status.can_transition(RunStatus::Generating, regenerate) || !self.passed_gate(&current) {
            return Err(PermitError::ConcurrencyConflict {
                current: current.status,
            });
        }

        let ctx = if current.status == RunStatus::ReadyForGeneration {
            RunContext::for_run(project_id, &current.run_id)
        } else {
            RunContext::new(project_id)
        };

        let mut record = current.advanced(RunStatus::Generating);
        if ctx.run_id != current.run_id {
            if current.packet.is_some() {
                record.superseded_runs.push(current.run_id.clone());
            }
            record.run_id = ctx.run_id.clone();
        }
        record.packet = None;
        record.error = None;
        record.stages.retain(|s| matches!(s.stage, StageId::Ingest | StageId::Score | StageId::Gate));
        self.transition(current.status, &record).await?;
        let lock = RunLock::acquired(self.state.clone(), project_id, &ctx.run_id);

        let outcome = self.run_generation(&ctx, record, regenerate).await;
        lock.release();
        outcome
    }

    /// A `failed` record may come from an analysis that never reached the
    /// gate; only records carrying a passing score may generate.
    fn passed_gate(&self, record: &RunRecord) -> bool {
        record
            .system
            .feasibility_score
            .as_ref()
            .map_or(false, |score| !self.gate.evaluate(score).is_rejected())
    }

    async fn run_generation(
        &self,
        ctx: &RunContext,
        mut record: RunRecord,
        regenerate: bool,
    ) -> PermitResult<Generation> {
        self.emit(
            &record,
            EventKind::GenerationStarted,
            "generation started",
            Some(json!({ "regenerate": regenerate })),
        )
        .await;
        tracing::info!(project_id = %ctx.project_id, run_id = %ctx.run_id, regenerate, "generation started");

        // Resolution
        let timer = StageTimer::start(StageId::Resolve, &record.system.components);
        let (resolutions, reasons) = self
            .resolver
            .resolve_all(&record.system.components)
            .await
            .into_parts();
        let specifications: Vec<ComponentSpecification> =
            resolutions.iter().map(|r| r.specification.clone()).collect();
        record
            .stages
            .push(timer.finish(&StageOutcome::from_reasons(specifications.clone(), reasons)));
        for spec in &specifications {
            self.emit_specification(&record, spec).await;
        }
        record.system.specifications = specifications;
        if let Err(err) = self.persist(&record).await {
            return Err(self.abandon(&record, RunStatus::Generating, err).await);
        }

        // Assembly
        let timer = StageTimer::start(StageId::Assemble, &record.system);
        let assembled = self.assembler.assemble(ctx, &record.system, resolutions).await;
        let documents = match assembled {
            Ok(documents) => documents,
            Err(err) => return Err(self.fail(&record, err.to_string()).await),
        };
        record.stages.push(timer.finish(&documents));
        let (documents, _) = documents.into_parts();

        // Packaging
        let timer = StageTimer::start(StageId::Package, &documents);
        let packaged = self.packager.package(ctx, documents).await;
        let packet = match packaged {
            Ok(packet) => packet,
            Err(err) => return Err(self.fail(&record, err.to_string()).await),
        };
        record.stages.push(timer.finish_value(&packet.package));

        let mut generated = record.advanced(RunStatus::Generated);
        generated.packet = Some(packet.clone());
        if let Err(err) = self.transition(RunStatus::Generating, &generated).await {
            tracing::warn!(project_id = %ctx.project_id, path = %packet.package.path, "packet stored but run not recorded");
            return Err(self.abandon(&record, RunStatus::Generating, err).await);
        }
        self.emit(
            &generated,
            EventKind::Generated,
            format!("permit packet generated at {}", packet.package.url),
            Some(json!({
                "url": packet.package.url,
                "totalPages": packet.metadata.total_pages,
                "packageSize": packet.metadata.package_size,
                "synthesizedSpecifications": packet.specifications.synthesized,
            })),
        )
        .await;
        tracing::info!(
            project_id = %ctx.project_id,
            run_id = %ctx.run_id,
            pages = packet.metadata.total_pages,
            bytes = packet.metadata.package_size,
            "permit packet generated"
        );

        Ok(Generation {
            packet,
            specifications: generated.system.specifications,
        })
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    /// Assembly or packaging gave up. The run moves to `failed`.
    async fn fail(&self, record: &RunRecord, message: String) -> PermitError {
        self.abandon(record, RunStatus::Generating, PermitError::PackagingFailure(message))
            .await
    }

    /// Record a run that cannot continue: best-effort `held → failed` write
    /// plus a failure event. Returns `err` for the caller.
    async fn abandon(&self, record: &RunRecord, held: RunStatus, err: PermitError) -> PermitError {
        let kind = if held == RunStatus::Generating {
            EventKind::GenerationFailed
        } else {
            EventKind::AnalysisFailed
        };
        tracing::error!(project_id = %record.project_id, run_id = %record.run_id, %err, ?kind, "run failed");

        let mut failed = record.advanced(RunStatus::Failed);
        failed.error = Some(err.to_string());
        if let Err(write_err) = self.transition(held, &failed).await {
            tracing::error!(project_id = %failed.project_id, err = %write_err, "could not record failed status");
        }
        self.emit(&failed, kind, err.to_string(), None).await;
        err
    }

    /// Status-changing write guarded by the status this run expects to replace.
    async fn transition(&self, from: RunStatus, record: &RunRecord) -> PermitResult<()> {
        self.state
            .compare_and_set(Some(from), record.clone())
            .await
            .map_err(PermitError::from)
    }

    /// Progress write that keeps the status unchanged.
    async fn persist(&self, record: &RunRecord) -> PermitResult<()> {
        self.transition(record.status, record).await
    }

    async fn emit_specification(&self, record: &RunRecord, spec: &ComponentSpecification) {
        let label = spec.component.label();
        match (&spec.outcome, &spec.spec_sheet_url) {
            (ResolutionOutcome::Resolved, Some(url)) => {
                self.emit(
                    record,
                    EventKind::SpecificationResolved,
                    format!("row {}: {} resolved", spec.component.row, label),
                    Some(json!({ "row": spec.component.row, "url": url })),
                )
                .await
            }
            (outcome, _) => {
                self.emit(
                    record,
                    EventKind::SpecificationUnresolved,
                    format!("row {}: {} unresolved", spec.component.row, label),
                    Some(json!({ "row": spec.component.row, "outcome": outcome })),
                )
                .await
            }
        }
    }

    /// Events are best effort; a failing log never fails the run.
    async fn emit(
        &self,
        record: &RunRecord,
        kind: EventKind,
        message: impl Into<String>,
        data: Option<Value>,
    ) {
        let mut event = RunEvent::new(&record.project_id, &record.run_id, kind, message);
        if let Some(data) = data {
            event = event.with_data(data);
        }
        if let Err(err) = self.events.append(event).await {
            tracing::warn!(project_id = %record.project_id, ?kind, %err, "event not recorded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_id_validation() {
        assert!(validate_project_id("proj-1").is_ok());
        assert!(validate_project_id("ACME_2024.roof").is_ok());
        assert!(validate_project_id("").is_err());
        assert!(validate_project_id("..").is_err());
        assert!(validate_project_id("a/b").is_err());
        assert!(validate_project_id("has space").is_err());
        assert!(validate_project_id(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_analyze_request_wire_names() {
        let request: AnalyzeRequest = serde_json::from_value(json!({
            "projectId": "proj-1",
            "externalProjectId": "os-77",
            "projectMetadata": { "address": "12 Elm St" }
        }))
        .unwrap();
        assert_eq!(request.external_project_id, "os-77");
        assert_eq!(request.project_metadata.address.as_deref(), Some("12 Elm St"));

        let bare: AnalyzeRequest =
            serde_json::from_value(json!({ "projectId": "p", "externalProjectId": "e" })).unwrap();
        assert_eq!(bare.project_metadata, ProjectMetadata::default());
    }
}
