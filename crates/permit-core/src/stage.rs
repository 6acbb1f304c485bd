//! Stage outcomes: every stage before packaging degrades instead of failing
use serde::{Deserialize, Serialize};

/// Stage identifiers, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Ingest,
    Score,
    Gate,
    Resolve,
    Assemble,
    Package,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Score => "score",
            Self::Gate => "gate",
            Self::Resolve => "resolve",
            Self::Assemble => "assemble",
            Self::Package => "package",
        }
    }
}

/// Result of a stage that absorbs its own external failures.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Complete(T),
    Degraded { value: T, reasons: Vec<String> },
}

impl<T> StageOutcome<T> {
    /// Build from a value and the reasons collected while producing it.
    pub fn from_reasons(value: T, reasons: Vec<String>) -> Self {
        if reasons.is_empty() {
            Self::Complete(value)
        } else {
            Self::Degraded { value, reasons }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Complete(value) => value,
            Self::Degraded { value, .. } => value,
        }
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            Self::Complete(_) => &[],
            Self::Degraded { reasons, .. } => reasons,
        }
    }

    pub fn into_parts(self) -> (T, Vec<String>) {
        match self {
            Self::Complete(value) => (value, Vec::new()),
            Self::Degraded { value, reasons } => (value, reasons),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StageOutcome<U> {
        match self {
            Self::Complete(value) => StageOutcome::Complete(f(value)),
            Self::Degraded { value, reasons } => StageOutcome::Degraded {
                value: f(value),
                reasons,
            },
        }
    }
}
