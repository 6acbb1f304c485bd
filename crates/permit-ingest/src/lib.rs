//! Permit Ingest: design-platform records to canonical components
//!
//! The only place loosely typed upstream data is accepted. Output is a dense,
//! row-numbered `Component` list in a fixed group order: modules, then
//! inverters, then every other part, each group in upstream order.
//!
//! # Example
//!
//! ```ignore
//! use permit_ingest::IngestionAdapter;
//!
//! let adapter = IngestionAdapter::new(platform, Duration::from_secs(20));
//! let outcome = adapter.ingest("opensolar-123").await;
//! if outcome.is_degraded() {
//!     println!("placeholder data: {:?}", outcome.reasons());
//! }
//! ```

pub mod entities;
pub mod normalizer;

use normalizer::{clean_text, coerce_quantity, Quantity, DEFAULT_QUANTITY};
use permit_core::upstream::{UpstreamPart, UpstreamProject, UpstreamSystem};
use permit_core::{Component, DesignPlatform, ProjectMetadata, ServiceError, StageOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Something the adapter changed or dropped while normalizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestNote {
    /// Quantity was missing or non-numeric and was set to "1"
    QuantityDefaulted {
        row: u32,
        part: String,
        raw: Option<String>,
    },
    /// Line dropped from the canonical set
    Rejected { part: String, reason: String },
}

impl IngestNote {
    /// Low-confidence issue text for the feasibility report.
    pub fn as_issue(&self) -> String {
        match self {
            Self::QuantityDefaulted { row, part, raw } => match raw {
                Some(raw) => format!(
                    "Low confidence: quantity for row {} ({}) was \"{}\"; assumed 1",
                    row, part, raw
                ),
                None => format!(
                    "Low confidence: quantity for row {} ({}) was missing; assumed 1",
                    row, part
                ),
            },
            Self::Rejected { part, reason } => {
                format!("Component {} excluded from BOM: {}", part, reason)
            }
        }
    }
}

/// Canonical data produced from one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestedProject {
    pub components: Vec<Component>,
    /// Technical and contact fields the platform supplied
    pub metadata: ProjectMetadata,
    pub system_id: Option<String>,
    pub notes: Vec<IngestNote>,
    /// True when the platform could not be reached
    pub degraded: bool,
}

/// Normalize one system's BOM lines into canonical components.
pub fn normalize_system(system: &UpstreamSystem) -> (Vec<Component>, Vec<IngestNote>) {
    let mut components = Vec::new();
    let mut notes = Vec::new();

    let groups: [(&[UpstreamPart], PartGroup); 3] = [
        (&system.modules, PartGroup::Module),
        (&system.inverters, PartGroup::Inverter),
        (&system.others, PartGroup::Other),
    ];

    for (parts, group) in groups {
        for part in parts {
            let row = components.len() as u32 + 1;
            match normalize_part(part, group, row) {
                Ok((component, note)) => {
                    components.push(component);
                    notes.extend(note);
                }
                Err(note) => notes.push(note),
            }
        }
    }

    (components, notes)
}

#[derive(Debug, Clone, Copy)]
enum PartGroup {
    Module,
    Inverter,
    Other,
}

fn normalize_part(
    part: &UpstreamPart,
    group: PartGroup,
    row: u32,
) -> Result<(Component, Option<IngestNote>), IngestNote> {
    let code = clean_text(part.code.as_deref());
    let name = clean_text(part.name.as_deref());
    let part_name = name
        .clone()
        .or_else(|| code.clone())
        .unwrap_or_else(|| "Unknown part".to_string());
    let part_number = code.or(name).unwrap_or_else(|| part_name.clone());
    let manufacturer =
        clean_text(part.manufacturer_name.as_deref()).unwrap_or_else(|| "Unknown".to_string());

    let (qty, note) = match coerce_quantity(part.quantity.as_ref()) {
        Quantity::Parsed(qty) => (qty, None),
        Quantity::Defaulted { raw } => (
            DEFAULT_QUANTITY.to_string(),
            Some(IngestNote::QuantityDefaulted {
                row,
                part: part_name.clone(),
                raw,
            }),
        ),
        Quantity::Negative { raw } => {
            return Err(IngestNote::Rejected {
                part: part_name,
                reason: format!("negative quantity {}", raw),
            })
        }
    };

    let category = match group {
        PartGroup::Module => entities::CATEGORY_MODULE.to_string(),
        PartGroup::Inverter => entities::classify_inverter(&part_number),
        PartGroup::Other => entities::classify(part.category.as_deref(), &part_name),
    };

    Ok((
        Component {
            row,
            part_name,
            part_number,
            manufacturer,
            qty,
            category,
        },
        note,
    ))
}

/// Project metadata as the platform reports it.
pub fn platform_metadata(project: &UpstreamProject, system: Option<&UpstreamSystem>) -> ProjectMetadata {
    ProjectMetadata {
        address: clean_text(project.address.as_deref()),
        system_size_kw: system.and_then(|s| s.kw_stc).filter(|kw| kw.is_finite() && *kw > 0.0),
        roof_type: clean_text(project.roof_type.as_deref()),
        mounting_type: system.and_then(|s| clean_text(s.mounting_type.as_deref())),
        utility: clean_text(project.utility.as_deref()),
        jurisdiction: clean_text(project.jurisdiction.as_deref()),
        customer_name: clean_text(project.customer_name.as_deref()),
        customer_email: clean_text(project.customer_email.as_deref()),
        customer_phone: clean_text(project.customer_phone.as_deref()),
    }
}

/// Fetches a project from the design platform and normalizes it.
pub struct IngestionAdapter {
    platform: Arc<dyn DesignPlatform>,
    timeout: Duration,
}

impl IngestionAdapter {
    pub fn new(platform: Arc<dyn DesignPlatform>, timeout: Duration) -> Self {
        Self { platform, timeout }
    }

    /// Never fails: an unreachable platform yields an empty, degraded set.
    pub async fn ingest(&self, external_id: &str) -> StageOutcome<IngestedProject> {
        let project = match self.call(self.platform.fetch_project(external_id)).await {
            Ok(project) => project,
            Err(err) => return degraded(format!("project fetch failed: {}", err)),
        };
        let systems = match self.call(self.platform.fetch_systems(external_id)).await {
            Ok(systems) => systems,
            Err(err) => {
                let mut outcome = degraded(format!("system fetch failed: {}", err));
                if let StageOutcome::Degraded { value, .. } = &mut outcome {
                    value.metadata = platform_metadata(&project, None);
                }
                return outcome;
            }
        };

        let system = systems.first();
        let (components, notes) = system.map(normalize_system).unwrap_or_default();
        tracing::info!(
            external_id,
            components = components.len(),
            notes = notes.len(),
            "ingested design-platform project"
        );

        let reasons = if system.is_none() {
            vec!["project has no design system".to_string()]
        } else {
            Vec::new()
        };

        StageOutcome::from_reasons(
            IngestedProject {
                components,
                metadata: platform_metadata(&project, system),
                system_id: system.map(|s| s.id.clone()),
                notes,
                degraded: false,
            },
            reasons,
        )
    }

    async fn call<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, ServiceError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(format!(
                "design platform did not answer within {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

fn degraded(reason: String) -> StageOutcome<IngestedProject> {
    tracing::warn!(%reason, "design platform unavailable; continuing with placeholder data");
    StageOutcome::Degraded {
        value: IngestedProject {
            degraded: true,
            ..Default::default()
        },
        reasons: vec![reason],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn part(code: &str, manufacturer: &str, quantity: serde_json::Value) -> UpstreamPart {
        UpstreamPart {
            code: Some(code.to_string()),
            manufacturer_name: Some(manufacturer.to_string()),
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    #[test]
    fn test_group_order_and_dense_rows() {
        let system = UpstreamSystem {
            id: "sys-1".to_string(),
            others: vec![part("XR100 Rail", "IronRidge", json!(12))],
            inverters: vec![part("IQ8PLUS-72-2-US", "Enphase", json!("20"))],
            modules: vec![
                part("Q.PEAK DUO 400", "Qcells", json!(20)),
                part("REC400AA", "REC", json!(2)),
            ],
            ..Default::default()
        };

        let (components, notes) = normalize_system(&system);
        assert!(notes.is_empty());
        let rows: Vec<u32> = components.iter().map(|c| c.row).collect();
        assert_eq!(rows, vec![1, 2, 3, 4]);
        assert_eq!(components[0].part_number, "Q.PEAK DUO 400");
        assert_eq!(components[1].part_number, "REC400AA");
        assert_eq!(components[2].category, entities::CATEGORY_MICROINVERTER);
        assert_eq!(components[3].category, entities::CATEGORY_MOUNTING);
    }

    #[test]
    fn test_rejected_lines_keep_rows_dense() {
        let system = UpstreamSystem {
            id: "sys-1".to_string(),
            modules: vec![
                part("Q.PEAK DUO 400", "Qcells", json!(20)),
                part("BROKEN", "Nobody", json!(-3)),
            ],
            others: vec![part("XR100 Rail", "IronRidge", json!("lots"))],
            ..Default::default()
        };

        let (components, notes) = normalize_system(&system);
        assert_eq!(components.len(), 2);
        assert_eq!(components[1].row, 2);
        assert_eq!(components[1].qty, "1");
        assert!(matches!(notes[0], IngestNote::Rejected { .. }));
        assert_eq!(
            notes[1],
            IngestNote::QuantityDefaulted {
                row: 2,
                part: "XR100 Rail".to_string(),
                raw: Some("lots".to_string()),
            }
        );
        assert!(notes[1].as_issue().starts_with("Low confidence"));
    }

    #[test]
    fn test_platform_metadata_ignores_blank_fields() {
        let project = UpstreamProject {
            id: "p".to_string(),
            address: Some(" 12 Elm St ".to_string()),
            utility: Some("".to_string()),
            ..Default::default()
        };
        let system = UpstreamSystem {
            id: "s".to_string(),
            kw_stc: Some(8.4),
            mounting_type: Some("Ground Mount".to_string()),
            ..Default::default()
        };

        let metadata = platform_metadata(&project, Some(&system));
        assert_eq!(metadata.address.as_deref(), Some("12 Elm St"));
        assert_eq!(metadata.utility, None);
        assert_eq!(metadata.system_size_kw, Some(8.4));
        assert_eq!(metadata.mounting_type.as_deref(), Some("Ground Mount"));
    }
}
