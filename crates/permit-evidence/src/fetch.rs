//! Download acceptance policy for validated datasheets.

use permit_core::FetchedDocument;

/// Hard cap on a downloaded datasheet
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

pub const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/x-pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentPolicy {
    pub max_bytes: u64,
}

impl Default for DocumentPolicy {
    fn default() -> Self {
        Self {
            max_bytes: MAX_DOCUMENT_BYTES,
        }
    }
}

impl DocumentPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// `Err` carries the refusal reason.
    pub fn check(&self, document: &FetchedDocument) -> Result<(), String> {
        let mime = document
            .content_type
            .as_deref()
            .map(essence)
            .unwrap_or_default();

        if !DOCUMENT_MIME_TYPES.contains(&mime.as_str()) {
            let shown = if mime.is_empty() { "missing" } else { mime.as_str() };
            return Err(format!("content type {} is not a document", shown));
        }

        if document.exceeded_limit || document.bytes.len() as u64 > self.max_bytes {
            return Err(format!(
                "document exceeds the {} byte limit",
                self.max_bytes
            ));
        }

        Ok(())
    }
}

/// MIME type without parameters, lowercased.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content_type: Option<&str>, len: usize, exceeded: bool) -> FetchedDocument {
        FetchedDocument {
            url: "https://example.com/sheet.pdf".to_string(),
            content_type: content_type.map(str::to_string),
            bytes: vec![0u8; len],
            exceeded_limit: exceeded,
        }
    }

    #[test]
    fn test_accepts_documents_within_limit() {
        let policy = DocumentPolicy::default();
        assert!(policy.check(&doc(Some("application/pdf"), 2 * 1024 * 1024, false)).is_ok());
        assert!(policy
            .check(&doc(Some("Application/PDF; charset=binary"), 10, false))
            .is_ok());
        assert!(policy
            .check(&doc(
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
                10,
                false
            ))
            .is_ok());
    }

    #[test]
    fn test_rejects_non_documents() {
        let policy = DocumentPolicy::default();
        let err = policy.check(&doc(Some("text/html"), 10, false)).unwrap_err();
        assert!(err.contains("text/html"));
        assert!(policy.check(&doc(None, 10, false)).is_err());
    }

    #[test]
    fn test_rejects_oversized() {
        let policy = DocumentPolicy::new(1024);
        assert!(policy.check(&doc(Some("application/pdf"), 1024, false)).is_ok());
        assert!(policy.check(&doc(Some("application/pdf"), 1025, false)).is_err());
        assert!(policy.check(&doc(Some("application/pdf"), 10, true)).is_err());
    }
}
