//! Permit Package: the single downloadable packet artifact
//!
//! Collects every assembled document into one zip with a `manifest.json`,
//! uploads it under the run's blob prefix, and returns the `PermitPacket`
//! with `{generatedAt, totalPages, packageSize}`.

pub mod error;
pub mod manifest;
pub mod packager;

pub use error::{PackageError, PackageResult};
pub use manifest::{ManifestEntry, PacketManifest, MANIFEST_NAME};
pub use packager::{build_archive, Packager, ZIP_MIME};
