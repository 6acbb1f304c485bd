//! API Handlers
use crate::error::{ApiError, ApiResult};
use crate::metrics::PipelineMetrics;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use permit_core::{
    PermitError, PermitPacket, ResolutionOutcome, RunEvent, RunRecord, RunStatus, PERMIT_VERSION,
};
use permit_pipeline::{AnalyzeRequest, Orchestrator};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub metrics: Arc<PipelineMetrics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub regenerate: bool,
}

/// One component's resolution, as shown to callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationView {
    pub row: u32,
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_sheet_url: Option<String>,
    pub outcome: ResolutionOutcome,
}

/// Project status and results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub project_id: String,
    pub run_id: String,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feasibility_score: Option<u8>,
    pub estimated: bool,
    pub degraded: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub specifications: Vec<SpecificationView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packet: Option<PermitPacket>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub superseded_runs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<RunRecord> for ProjectView {
    fn from(record: RunRecord) -> Self {
        let score = record.system.feasibility_score.as_ref();
        Self {
            feasibility_score: score.map(|s| s.value),
            estimated: score.map(|s| s.estimated).unwrap_or(false),
            degraded: record.system.degraded || record.stages.iter().any(|s| s.degraded),
            specifications: record
                .system
                .specifications
                .iter()
                .map(|spec| SpecificationView {
                    row: spec.component.row,
                    component: spec.component.label(),
                    spec_sheet_url: spec.spec_sheet_url.clone(),
                    outcome: spec.outcome.clone(),
                })
                .collect(),
            issues: record.system.issues,
            recommendations: record.system.recommendations,
            project_id: record.project_id,
            run_id: record.run_id,
            status: record.status,
            packet: record.packet,
            superseded_runs: record.superseded_runs,
            error: record.error,
            updated_at: record.updated_at,
        }
    }
}

/// JSON body or `BadRequest`. An empty body yields the default.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))
}

fn count_failure(metrics: &PipelineMetrics, err: &PermitError) {
    match err {
        PermitError::ConcurrencyConflict { .. } => metrics.conflicts.inc(),
        PermitError::PackagingFailure(_) => metrics.generation_failures.inc(),
        _ => {}
    }
}

pub async fn analyze(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<ProjectView>> {
    let request: AnalyzeRequest = parse_body(&body)?;
    match state.orchestrator.analyze(request).await {
        Ok(record) => {
            state.metrics.analyses.inc();
            Ok(Json(record.into()))
        }
        Err(err) => {
            if let PermitError::ThresholdRejection { .. } = err {
                state.metrics.analyses.inc();
                state.metrics.rejections.inc();
            }
            count_failure(&state.metrics, &err);
            Err(err.into())
        }
    }
}

pub async fn generate(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<PermitPacket>> {
    let request: GenerateRequest = parse_body(&body)?;
    match state
        .orchestrator
        .generate(&project_id, request.regenerate)
        .await
    {
        Ok(generation) => {
            state.metrics.generations.inc();
            let resolved = generation
                .specifications
                .iter()
                .filter(|s| s.is_resolved())
                .count();
            state
                .metrics
                .record_specifications(resolved, generation.specifications.len() - resolved);
            Ok(Json(generation.packet))
        }
        Err(err) => {
            count_failure(&state.metrics, &err);
            Err(err.into())
        }
    }
}

pub async fn project_status(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ProjectView>> {
    let record = state.orchestrator.status(&project_id).await?;
    Ok(Json(record.into()))
}

pub async fn project_events(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<RunEvent>>> {
    Ok(Json(state.orchestrator.events(&project_id).await?))
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": PERMIT_VERSION })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let text = state
        .metrics
        .encode()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    ))
}
