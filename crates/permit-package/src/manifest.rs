//! `manifest.json` written at the root of every packet archive.

use chrono::{DateTime, Utc};
use permit_core::{DocumentKind, DocumentRef};
use serde::{Deserialize, Serialize};

pub const MANIFEST_NAME: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketManifest {
    pub project_id: String,
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub total_pages: u32,
    pub documents: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub kind: DocumentKind,
    /// Path inside the archive
    pub entry: String,
    pub mime: String,
    pub size: u64,
    pub pages: u32,
    pub hash: String,
}

impl ManifestEntry {
    pub fn new(doc: &DocumentRef, entry: String) -> Self {
        Self {
            kind: doc.kind,
            entry,
            mime: doc.mime.clone(),
            size: doc.size,
            pages: doc.pages,
            hash: doc.hash.clone(),
        }
    }
}
