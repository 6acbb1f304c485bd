//! Permit Evidence: datasheet resolution with independent validation
//!
//! For every component the resolver searches for the manufacturer datasheet,
//! asks the reasoning service to confirm each candidate, and downloads the
//! first confirmed one under a type and size policy. Only a confirmed,
//! downloaded datasheet ever sets `specSheetUrl`.
//!
//! # Example
//!
//! ```ignore
//! use permit_evidence::{ResolverConfig, SpecificationResolver};
//!
//! let resolver = SpecificationResolver::new(search, reasoning, fetcher)
//!     .with_config(ResolverConfig::default());
//!
//! let outcome = resolver.resolve_all(&components).await;
//! for resolution in outcome.value() {
//!     println!("{:?}", resolution.specification.outcome);
//! }
//! ```

pub mod citation;
pub mod domains;
pub mod extract;
pub mod fetch;
pub mod query;
pub mod resolver;
pub mod validation;

pub use citation::{cite, MAX_QUOTE_WORDS};
pub use domains::DomainTable;
pub use extract::extract_specs;
pub use fetch::{DocumentPolicy, DOCUMENT_MIME_TYPES, MAX_DOCUMENT_BYTES};
pub use query::{plan_queries, PlannedQuery, ProductClass};
pub use resolver::{Resolution, ResolverConfig, SpecificationResolver, MAX_RESULTS_PER_QUERY};
