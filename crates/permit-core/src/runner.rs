//! Stage Recorder: hashes stage input/output and collects per-stage timing
use crate::stage::{StageId, StageOutcome};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    pub stage: StageId,
    pub in_hash: String,
    pub out_hash: String,
    pub latency_ms: u64,
    pub degraded: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Open timer for one stage. Created before the stage runs.
pub struct StageTimer {
    stage: StageId,
    in_hash: String,
    start: Instant,
}

impl StageTimer {
    pub fn start<I: Serialize + ?Sized>(stage: StageId, input: &I) -> Self {
        Self {
            stage,
            in_hash: hash_json(input),
            start: Instant::now(),
        }
    }

    /// Close the timer against a stage outcome.
    pub fn finish<T: Serialize>(self, outcome: &StageOutcome<T>) -> StageRecord {
        StageRecord {
            stage: self.stage,
            in_hash: self.in_hash,
            out_hash: hash_json(outcome.value()),
            latency_ms: self.start.elapsed().as_millis() as u64,
            degraded: outcome.is_degraded(),
            reasons: outcome.reasons().to_vec(),
        }
    }

    /// Close the timer for a stage that produced a plain value.
    pub fn finish_value<T: Serialize + ?Sized>(self, output: &T) -> StageRecord {
        StageRecord {
            stage: self.stage,
            in_hash: self.in_hash,
            out_hash: hash_json(output),
            latency_ms: self.start.elapsed().as_millis() as u64,
            degraded: false,
            reasons: Vec::new(),
        }
    }
}

pub fn hash_bytes(data: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(data))
}

pub fn hash_json<T: Serialize + ?Sized>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    hash_bytes(&bytes)
}
