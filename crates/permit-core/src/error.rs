//! Unified Error Model
use crate::status::RunStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PermitError {
    #[error("UPSTREAM/{0}")]
    UpstreamUnavailable(String),

    #[error("SCORING/{0}")]
    ScoringUnavailable(String),

    #[error("EVIDENCE/NOT_FOUND: {0}")]
    EvidenceNotFound(String),

    #[error("EVIDENCE/REJECTED: {0}")]
    EvidenceRejected(String),

    #[error("THRESHOLD/score {score} below {threshold}")]
    ThresholdRejection {
        score: u8,
        threshold: u8,
        issues: Vec<String>,
    },

    #[error("PACKAGING/{0}")]
    PackagingFailure(String),

    #[error("CONFLICT/project is {current}")]
    ConcurrencyConflict { current: RunStatus },

    #[error("NOT_FOUND/{0}")]
    NotFound(String),

    #[error("STORE/{0}")]
    Store(String),

    #[error("REQUEST/{0}")]
    InvalidRequest(String),

    #[error("RUN/{0}")]
    RunAborted(String),
}

/// Failure of a single outbound service call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("TIMEOUT/{0}")]
    Timeout(String),

    #[error("HTTP/{status}: {message}")]
    Http { status: u16, message: String },

    #[error("TRANSPORT/{0}")]
    Transport(String),

    #[error("DECODE/{0}")]
    Decode(String),

    #[error("CONFIG/{0}")]
    NotConfigured(String),
}

/// Failure of a storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("STORE/CONFLICT: expected {expected:?}, found {found:?}")]
    Conflict {
        expected: Option<RunStatus>,
        found: Option<RunStatus>,
    },

    #[error("STORE/NOT_FOUND: {0}")]
    NotFound(String),

    #[error("STORE/EXISTS: {0}")]
    AlreadyExists(String),

    #[error("STORE/IO: {0}")]
    Io(String),

    #[error("STORE/SERIALIZE: {0}")]
    Serialize(String),
}

impl From<StoreError> for PermitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict {
                found: Some(current),
                ..
            } => PermitError::ConcurrencyConflict { current },
            StoreError::NotFound(what) => PermitError::NotFound(what),
            other => PermitError::Store(other.to_string()),
        }
    }
}

pub type PermitResult<T> = Result<T, PermitError>;
pub type ServiceResult<T> = Result<T, ServiceError>;
pub type StoreResult<T> = Result<T, StoreError>;
