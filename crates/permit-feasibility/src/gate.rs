//! Feasibility gate
//!
//! Decides whether an analyzed project may proceed to packet generation.
//! The threshold is exact and has no override.

use permit_core::{FeasibilityScore, PermitError};
use serde::{Deserialize, Serialize};

/// Scores strictly below this are rejected
pub const REJECTION_THRESHOLD: u8 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum GateVerdict {
    Proceed { score: u8 },
    Reject { score: u8, reason: String },
}

impl GateVerdict {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Reject { .. })
    }

    /// Terminal error carried back to the caller on rejection.
    pub fn into_error(self, issues: &[String]) -> Option<PermitError> {
        match self {
            Self::Proceed { .. } => None,
            Self::Reject { score, .. } => Some(PermitError::ThresholdRejection {
                score,
                threshold: REJECTION_THRESHOLD,
                issues: issues.to_vec(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeasibilityGate;

impl FeasibilityGate {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, score: &FeasibilityScore) -> GateVerdict {
        if score.value < REJECTION_THRESHOLD {
            let estimate = if score.estimated { " (estimated)" } else { "" };
            GateVerdict::Reject {
                score: score.value,
                reason: format!(
                    "feasibility score {}{} is below the required {}",
                    score.value, estimate, REJECTION_THRESHOLD
                ),
            }
        } else {
            GateVerdict::Proceed { score: score.value }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(value: u8) -> FeasibilityScore {
        FeasibilityScore {
            value,
            estimated: false,
        }
    }

    #[test]
    fn test_threshold_is_exact() {
        let gate = FeasibilityGate::new();
        assert!(gate.evaluate(&score(59)).is_rejected());
        assert_eq!(gate.evaluate(&score(60)), GateVerdict::Proceed { score: 60 });
        assert!(!gate.evaluate(&score(100)).is_rejected());
        assert!(gate.evaluate(&score(0)).is_rejected());
    }

    #[test]
    fn test_rejection_error_carries_issues() {
        let verdict = FeasibilityGate::new().evaluate(&score(41));
        let err = verdict
            .into_error(&["Array exceeds roof area".to_string()])
            .unwrap();
        match err {
            PermitError::ThresholdRejection {
                score,
                threshold,
                issues,
            } => {
                assert_eq!(score, 41);
                assert_eq!(threshold, 60);
                assert_eq!(issues.len(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
