//! Run status state machine
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted status of a project run.
///
/// ```text
/// pending → analyzed → rejected
///                    → ready_for_generation → generating → generated
///                                                        → failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Analyzed,
    Rejected,
    ReadyForGeneration,
    Generating,
    Generated,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Analyzed => "analyzed",
            Self::Rejected => "rejected",
            Self::ReadyForGeneration => "ready_for_generation",
            Self::Generating => "generating",
            Self::Generated => "generated",
            Self::Failed => "failed",
        }
    }

    /// Rejected and generated runs are never mutated again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Generated)
    }

    /// Whether `self → next` is a legal edge. `regenerate` opens
    /// `generated → generating`.
    pub fn can_transition(&self, next: RunStatus, regenerate: bool) -> bool {
        use RunStatus::*;
        match (self, next) {
            (Pending, Analyzed) => true,
            (Analyzed, Rejected) | (Analyzed, ReadyForGeneration) => true,
            (ReadyForGeneration, Generating) => true,
            (Failed, Generating) => true,
            (Generated, Generating) => regenerate,
            (Generating, Generated) | (Generating, Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::RunStatus::*;

    #[test]
    fn test_happy_path_edges() {
        assert!(Pending.can_transition(Analyzed, false));
        assert!(Analyzed.can_transition(ReadyForGeneration, false));
        assert!(ReadyForGeneration.can_transition(Generating, false));
        assert!(Generating.can_transition(Generated, false));
    }

    #[test]
    fn test_rejected_is_terminal() {
        assert!(Rejected.is_terminal());
        for next in [Pending, Analyzed, ReadyForGeneration, Generating, Generated, Failed] {
            assert!(!Rejected.can_transition(next, true));
        }
    }

    #[test]
    fn test_generation_guards() {
        assert!(!Generating.can_transition(Generating, true));
        assert!(!Generated.can_transition(Generating, false));
        assert!(Generated.can_transition(Generating, true));
        assert!(Failed.can_transition(Generating, false));
        assert!(!Analyzed.can_transition(Generating, false));
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&ReadyForGeneration).unwrap();
        assert_eq!(json, "\"ready_for_generation\"");
        assert_eq!(ReadyForGeneration.to_string(), "ready_for_generation");
    }
}
