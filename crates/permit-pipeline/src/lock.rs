//! The status lock a run holds while it is `pending` or `generating`.
//!
//! A run that stops without writing its own outcome (panic, runtime
//! shutdown) would leave the project locked. Dropping an unreleased
//! [`RunLock`] moves the run to `failed` instead, which re-opens analysis
//! and generation.

use permit_core::{PermitResult, RunStatus, StateStore};
use std::sync::Arc;

pub const INTERRUPTED: &str = "run interrupted before it recorded an outcome";

pub(crate) struct RunLock {
    state: Arc<dyn StateStore>,
    project_id: String,
    run_id: String,
    held: bool,
}

impl RunLock {
    /// Taken right after the compare-and-set that claimed the project.
    pub(crate) fn acquired(state: Arc<dyn StateStore>, project_id: &str, run_id: &str) -> Self {
        Self {
            state,
            project_id: project_id.to_string(),
            run_id: run_id.to_string(),
            held: true,
        }
    }

    /// The run wrote its own outcome.
    pub(crate) fn release(mut self) {
        self.held = false;
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if !self.held {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::error!(project_id = %self.project_id, run_id = %self.run_id, "no runtime to release run lock");
            return;
        };
        let state = self.state.clone();
        let project_id = std::mem::take(&mut self.project_id);
        let run_id = std::mem::take(&mut self.run_id);
        handle.spawn(async move {
            match release_interrupted(state.as_ref(), &project_id, &run_id).await {
                Ok(true) => tracing::warn!(%project_id, %run_id, "interrupted run moved to failed"),
                Ok(false) => {}
                Err(err) => tracing::error!(%project_id, %run_id, %err, "could not release run lock"),
            }
        });
    }
}

/// Move `run_id` to `failed` if it still holds the project's lock.
/// Returns whether a write happened.
pub async fn release_interrupted(
    state: &dyn StateStore,
    project_id: &str,
    run_id: &str,
) -> PermitResult<bool> {
    let Some(record) = state.get(project_id).await? else {
        return Ok(false);
    };
    if record.run_id != run_id
        || !matches!(record.status, RunStatus::Pending | RunStatus::Generating)
    {
        return Ok(false);
    }
    let mut failed = record.advanced(RunStatus::Failed);
    failed.error = Some(INTERRUPTED.to_string());
    state.compare_and_set(Some(record.status), failed).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_core::{InMemoryStateStore, ProjectMetadata, RunRecord};
    use std::time::Duration;

    async fn store_with(status: RunStatus) -> Arc<InMemoryStateStore> {
        let store = Arc::new(InMemoryStateStore::new());
        let record = RunRecord::new("proj-1", "run-1", "os-1", ProjectMetadata::default())
            .advanced(status);
        store.upsert(record).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_dropped_lock_fails_the_run() {
        let store = store_with(RunStatus::Generating).await;
        drop(RunLock::acquired(store.clone(), "proj-1", "run-1"));

        let mut status = RunStatus::Generating;
        for _ in 0..100 {
            status = store.get("proj-1").await.unwrap().unwrap().status;
            if status != RunStatus::Generating {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        assert_eq!(status, RunStatus::Failed);
        let record = store.get("proj-1").await.unwrap().unwrap();
        assert_eq!(record.error.as_deref(), Some(INTERRUPTED));
    }

    #[tokio::test]
    async fn test_released_lock_writes_nothing() {
        let store = store_with(RunStatus::Pending).await;
        RunLock::acquired(store.clone(), "proj-1", "run-1").release();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            store.get("proj-1").await.unwrap().unwrap().status,
            RunStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_other_runs_and_settled_states_are_left_alone() {
        let store = store_with(RunStatus::Generating).await;
        assert!(!release_interrupted(store.as_ref(), "proj-1", "run-2").await.unwrap());
        assert!(!release_interrupted(store.as_ref(), "ghost", "run-1").await.unwrap());

        let store = store_with(RunStatus::ReadyForGeneration).await;
        assert!(!release_interrupted(store.as_ref(), "proj-1", "run-1").await.unwrap());

        let store = store_with(RunStatus::Pending).await;
        assert!(release_interrupted(store.as_ref(), "proj-1", "run-1").await.unwrap());
        assert_eq!(
            store.get("proj-1").await.unwrap().unwrap().status,
            RunStatus::Failed
        );
    }
}
