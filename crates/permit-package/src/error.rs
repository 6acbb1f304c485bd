use permit_core::{PermitError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("ARCHIVE/{0}")]
    Archive(String),

    #[error("MANIFEST/{0}")]
    Manifest(String),

    #[error("UPLOAD/{0}")]
    Upload(StoreError),

    #[error("SOURCE/{path}: {source}")]
    Source { path: String, source: StoreError },
}

impl From<zip::result::ZipError> for PackageError {
    fn from(err: zip::result::ZipError) -> Self {
        PackageError::Archive(err.to_string())
    }
}

impl From<std::io::Error> for PackageError {
    fn from(err: std::io::Error) -> Self {
        PackageError::Archive(err.to_string())
    }
}

impl From<PackageError> for PermitError {
    fn from(err: PackageError) -> Self {
        PermitError::PackagingFailure(err.to_string())
    }
}

pub type PackageResult<T> = Result<T, PackageError>;
