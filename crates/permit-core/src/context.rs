//! Run Context: identity shared by every stage of one run
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    pub project_id: String,
    pub run_id: String,
    pub trace_id: String,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            run_id: uuid::Uuid::new_v4().to_string(),
            trace_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
        }
    }

    /// Context for a run whose id was issued earlier.
    pub fn for_run(project_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Self::new(project_id)
        }
    }

    /// Blob path prefix for everything written during this run.
    pub fn blob_prefix(&self) -> String {
        format!("{}/runs/{}", self.project_id, self.run_id)
    }
}
