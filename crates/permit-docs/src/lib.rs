//! Permit Docs: document assembly for permit packets
//!
//! Renders the application form, site layout, one-line diagram,
//! specification dossier, and the conditional structural and
//! interconnection documents from a `SystemConfiguration`, storing each in
//! the blob store.
//!
//! # Example
//!
//! ```ignore
//! use permit_docs::{DocumentAssembler, TemplateRenderer};
//!
//! let assembler = DocumentAssembler::new(
//!     TemplateRenderer::embedded()?,
//!     blobs,
//!     platform,
//!     Duration::from_secs(20),
//! );
//! let documents = assembler.assemble(&ctx, &system, resolutions).await?;
//! for doc in documents.value().all() {
//!     println!("{} -> {}", doc.path, doc.url);
//! }
//! ```

pub mod assembler;
pub mod diagram;
pub mod error;
pub mod pages;
pub mod renderer;
pub mod requirements;
pub mod templates;

pub use assembler::{AssembledDocuments, DocumentAssembler, MARKDOWN_MIME};
pub use diagram::{DiagramGroup, OneLineDiagram};
pub use error::{DocsError, DocsResult};
pub use pages::count_pages;
pub use renderer::TemplateRenderer;
pub use requirements::{
    requires_interconnection, requires_structural, RequiredDocuments,
    INTERCONNECTION_KW_THRESHOLD, STRUCTURAL_KW_THRESHOLD,
};
pub use templates::TemplatesFile;
