//! Run events: append-only trail of what each run did
//!
//! Every absorbed failure ends up here so a degraded run can be told apart
//! from a clean one after the fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AnalysisStarted,
    IngestionDegraded,
    Scored,
    Rejected,
    Ready,
    AnalysisFailed,
    GenerationStarted,
    SpecificationResolved,
    SpecificationUnresolved,
    Generated,
    GenerationFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEvent {
    pub id: String,
    pub project_id: String,
    pub run_id: String,
    pub kind: EventKind,
    pub message: String,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RunEvent {
    pub fn new(
        project_id: impl Into<String>,
        run_id: impl Into<String>,
        kind: EventKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            run_id: run_id.into(),
            kind,
            message: message.into(),
            at: Utc::now(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}
