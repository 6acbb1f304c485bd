use permit_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocsError {
    #[error("TEMPLATE/{0}")]
    Template(String),

    #[error("RENDER/{template}: {message}")]
    Render { template: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type DocsResult<T> = Result<T, DocsError>;
