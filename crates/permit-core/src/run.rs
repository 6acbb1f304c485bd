//! Persisted per-project run record
use crate::data_model::{PermitPacket, ProjectMetadata, SystemConfiguration};
use crate::runner::StageRecord;
use crate::status::RunStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub project_id: String,
    pub run_id: String,
    pub external_project_id: String,
    /// Caller-supplied metadata, kept for re-analysis
    pub requested_metadata: ProjectMetadata,
    pub status: RunStatus,
    pub system: SystemConfiguration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet: Option<PermitPacket>,
    /// Runs whose packets were superseded by a regeneration
    #[serde(default)]
    pub superseded_runs: Vec<String>,
    #[serde(default)]
    pub stages: Vec<StageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RunRecord {
    pub fn new(
        project_id: impl Into<String>,
        run_id: impl Into<String>,
        external_project_id: impl Into<String>,
        requested_metadata: ProjectMetadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            project_id: project_id.into(),
            run_id: run_id.into(),
            external_project_id: external_project_id.into(),
            system: SystemConfiguration {
                project_info: requested_metadata.clone(),
                ..Default::default()
            },
            requested_metadata,
            status: RunStatus::Pending,
            packet: None,
            superseded_runs: Vec::new(),
            stages: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this record moved to `next`, stamped with the current time.
    pub fn advanced(&self, next: RunStatus) -> Self {
        let mut record = self.clone();
        record.status = next;
        record.updated_at = Utc::now();
        record
    }
}
