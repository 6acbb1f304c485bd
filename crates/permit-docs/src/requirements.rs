//! Conditional document predicates.

use permit_core::SystemConfiguration;
use serde::{Deserialize, Serialize};

/// Structural calculations above this nameplate size (kW, exclusive)
pub const STRUCTURAL_KW_THRESHOLD: f64 = 10.0;
/// Interconnection application above this nameplate size (kW, exclusive)
pub const INTERCONNECTION_KW_THRESHOLD: f64 = 5.0;

const STRUCTURAL_MOUNTING_KEYWORDS: &[&str] = &["ground", "ballast"];

/// Why structural calculations are needed. Empty when they are not.
pub fn structural_reasons(system: &SystemConfiguration) -> Vec<String> {
    let mut reasons = Vec::new();
    if let Some(kw) = system.project_info.system_size_kw {
        if kw > STRUCTURAL_KW_THRESHOLD {
            reasons.push(format!(
                "nameplate {:.2} kW exceeds {} kW",
                kw, STRUCTURAL_KW_THRESHOLD
            ));
        }
    }
    if let Some(mounting) = system.project_info.mounting_type.as_deref() {
        let lower = mounting.to_ascii_lowercase();
        if STRUCTURAL_MOUNTING_KEYWORDS.iter().any(|k| lower.contains(k)) {
            reasons.push(format!("{} installation", mounting.trim()));
        }
    }
    reasons
}

pub fn requires_structural(system: &SystemConfiguration) -> bool {
    !structural_reasons(system).is_empty()
}

pub fn requires_interconnection(system: &SystemConfiguration) -> bool {
    system
        .project_info
        .system_size_kw
        .map(|kw| kw > INTERCONNECTION_KW_THRESHOLD)
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredDocuments {
    pub structural: bool,
    pub interconnection: bool,
}

impl RequiredDocuments {
    pub fn for_system(system: &SystemConfiguration) -> Self {
        Self {
            structural: requires_structural(system),
            interconnection: requires_interconnection(system),
        }
    }
}
