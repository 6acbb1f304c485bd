//! Permit Pipeline: the orchestrator that turns a design-platform project
//! into a permit packet.
//!
//! # Pipeline Flow
//!
//! ```text
//! analyze:   Ingest → Score → Gate ──► rejected
//!                                  └─► ready_for_generation
//! generate:  Resolve → Assemble → Package ──► generated
//!                                         └─► failed (retry allowed)
//! ```
//!
//! Every stage before packaging degrades instead of failing. Only threshold
//! rejection, packaging failure and concurrency conflicts reach the caller.
//! Runs execute on their own task and always settle: a run that cannot
//! finish leaves its project `failed`, never `pending` or `generating`.

pub mod config;
mod lock;
pub mod orchestrator;
pub mod services;

pub use config::PipelineConfig;
pub use lock::INTERRUPTED;
pub use orchestrator::{validate_project_id, AnalyzeRequest, Generation, Orchestrator};
pub use services::PipelineServices;
