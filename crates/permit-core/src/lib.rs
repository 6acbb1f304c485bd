//! Permit Core: canonical model, run state machine, stage outcomes, and the
//! contracts every pipeline stage talks through.

pub mod context;
pub mod data_model;
pub mod error;
pub mod events;
pub mod run;
pub mod runner;
pub mod services;
pub mod stage;
pub mod status;
pub mod store;
pub mod upstream;

pub use context::RunContext;
pub use data_model::{
    Component, ComponentSpecification, DocumentKind, DocumentRef, EvidenceCitation,
    FeasibilityScore, PacketMetadata, PermitPacket, ProjectMetadata, ResolutionOutcome,
    SpecificationDossier, SystemConfiguration, ValidatedSpecs,
};
pub use error::{PermitError, PermitResult, ServiceError, ServiceResult, StoreError, StoreResult};
pub use events::{EventKind, RunEvent};
pub use run::RunRecord;
pub use runner::{hash_bytes, hash_json, StageRecord, StageTimer};
pub use services::{
    DesignPlatform, DocumentFetcher, FetchedDocument, ReasoningService, SearchHit, SearchQuery,
    SearchService,
};
pub use stage::{StageId, StageOutcome};
pub use status::RunStatus;
pub use store::{
    BlobStore, EventLog, InMemoryBlobStore, InMemoryEventLog, InMemoryStateStore, LocalBlobStore,
    StateStore, StoredBlob,
};
pub use upstream::{UpstreamPart, UpstreamProject, UpstreamSystem};

/// Version reported by the service
pub const PERMIT_VERSION: &str = "1.0.0";
