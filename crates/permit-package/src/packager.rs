//! Packager: one zip per run, with a manifest, uploaded next to its documents.

use crate::error::{PackageError, PackageResult};
use crate::manifest::{ManifestEntry, PacketManifest, MANIFEST_NAME};
use chrono::Utc;
use permit_core::{
    hash_bytes, BlobStore, DocumentKind, DocumentRef, PacketMetadata, PermitPacket, RunContext,
};
use permit_docs::AssembledDocuments;
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const ZIP_MIME: &str = "application/zip";

pub struct Packager {
    blobs: Arc<dyn BlobStore>,
}

impl Packager {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Archive every assembled document and upload the result. Any failure
    /// is fatal; nothing is written at the package path unless the upload
    /// completes.
    pub async fn package(
        &self,
        ctx: &RunContext,
        documents: AssembledDocuments,
    ) -> PackageResult<PermitPacket> {
        let prefix = format!("{}/", ctx.blob_prefix());
        let generated_at = Utc::now();

        let mut entries = Vec::new();
        let mut files = Vec::new();
        for doc in documents.all() {
            let bytes = self
                .blobs
                .get(&doc.path)
                .await
                .map_err(|source| PackageError::Source {
                    path: doc.path.clone(),
                    source,
                })?;
            let entry = doc.path.strip_prefix(&prefix).unwrap_or(&doc.path).to_string();
            entries.push(ManifestEntry::new(doc, entry.clone()));
            files.push((entry, bytes));
        }

        let total_pages: u32 = entries.iter().map(|e| e.pages).sum();
        let manifest = PacketManifest {
            project_id: ctx.project_id.clone(),
            run_id: ctx.run_id.clone(),
            generated_at,
            total_pages,
            documents: entries,
        };

        let archive = build_archive(&manifest, &files)?;
        let hash = hash_bytes(&archive);
        let path = format!("{}/{}.zip", ctx.blob_prefix(), DocumentKind::Package.slug());
        let blob = self
            .blobs
            .put(&path, archive, ZIP_MIME)
            .await
            .map_err(PackageError::Upload)?;

        tracing::info!(
            project_id = %ctx.project_id,
            run_id = %ctx.run_id,
            documents = files.len(),
            total_pages,
            package_size = blob.size,
            "permit packet uploaded"
        );

        Ok(PermitPacket {
            project_id: ctx.project_id.clone(),
            run_id: ctx.run_id.clone(),
            application_form: documents.application_form,
            site_layout: documents.site_layout,
            electrical_diagram: documents.electrical_diagram,
            specifications: documents.specifications,
            structural_calculations: documents.structural_calculations,
            interconnection_application: documents.interconnection_application,
            package: DocumentRef {
                kind: DocumentKind::Package,
                path: blob.path,
                url: blob.url,
                mime: ZIP_MIME.to_string(),
                size: blob.size,
                pages: total_pages,
                hash,
            },
            metadata: PacketMetadata {
                generated_at,
                total_pages,
                package_size: blob.size,
            },
        })
    }
}

/// Zip `manifest.json` followed by each file, in order.
pub fn build_archive(
    manifest: &PacketManifest,
    files: &[(String, Vec<u8>)],
) -> PackageResult<Vec<u8>> {
    let manifest_json =
        serde_json::to_vec_pretty(manifest).map_err(|e| PackageError::Manifest(e.to_string()))?;
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(MANIFEST_NAME, options)?;
    zip.write_all(&manifest_json)?;
    for (name, bytes) in files {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(bytes)?;
    }
    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_archive_starts_with_manifest() {
        let manifest = PacketManifest {
            project_id: "p".to_string(),
            run_id: "r".to_string(),
            generated_at: Utc::now(),
            total_pages: 1,
            documents: Vec::new(),
        };
        let archive = build_archive(
            &manifest,
            &[("application-form.md".to_string(), b"# Form".to_vec())],
        )
        .unwrap();

        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        assert_eq!(zip.len(), 2);
        assert_eq!(zip.by_index(0).unwrap().name(), MANIFEST_NAME);

        let mut body = String::new();
        zip.by_name("application-form.md")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "# Form");
    }
}
