//! Permit Feasibility: scoring and the generation gate
//!
//! Asks the reasoning service for a 0-100 feasibility score, a list of
//! issues, and recommendations, then gates the run on the score.
//!
//! # Example
//!
//! ```ignore
//! use permit_feasibility::{FeasibilityGate, FeasibilityScorer};
//!
//! let scorer = FeasibilityScorer::new(reasoning, Duration::from_secs(30));
//! let report = scorer.score(&components, &metadata, &[]).await;
//!
//! let verdict = FeasibilityGate::new().evaluate(&report.value().score);
//! println!("{:?}", verdict);
//! ```

pub mod extract;
pub mod gate;
pub mod prompts;
pub mod scorer;

pub use gate::{FeasibilityGate, GateVerdict, REJECTION_THRESHOLD};
pub use scorer::{FeasibilityReport, FeasibilityScorer, DEFAULT_SCORE};
