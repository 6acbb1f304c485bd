//! Data Model: Component, ProjectMetadata, SystemConfiguration, PermitPacket
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One physical part in the bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Dense, 1-based sequence position within one system
    pub row: u32,
    pub part_name: String,
    pub part_number: String,
    pub manufacturer: String,
    /// String-encoded non-negative integer
    pub qty: String,
    /// Free-text classification (ex: "Solar Module", "Inverter")
    pub category: String,
}

impl Component {
    /// Parsed quantity. The ingestion boundary guarantees this parses.
    pub fn quantity(&self) -> u32 {
        self.qty.trim().parse().unwrap_or(1)
    }

    /// Human label used in prompts and documents.
    pub fn label(&self) -> String {
        if self.part_number.is_empty() || self.part_number == self.part_name {
            format!("{} {}", self.manufacturer, self.part_name).trim().to_string()
        } else {
            format!("{} {} ({})", self.manufacturer, self.part_name, self.part_number)
                .trim()
                .to_string()
        }
    }
}

/// Descriptive context for the installation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Nameplate DC size in kW
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_size_kw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roof_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mounting_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
}

impl ProjectMetadata {
    /// Merge caller input with platform data. Platform values win on conflict.
    pub fn merged(caller: &ProjectMetadata, platform: &ProjectMetadata) -> ProjectMetadata {
        fn pick<T: Clone>(platform: &Option<T>, caller: &Option<T>) -> Option<T> {
            platform.clone().or_else(|| caller.clone())
        }

        ProjectMetadata {
            address: pick(&platform.address, &caller.address),
            system_size_kw: pick(&platform.system_size_kw, &caller.system_size_kw),
            roof_type: pick(&platform.roof_type, &caller.roof_type),
            mounting_type: pick(&platform.mounting_type, &caller.mounting_type),
            utility: pick(&platform.utility, &caller.utility),
            jurisdiction: pick(&platform.jurisdiction, &caller.jurisdiction),
            customer_name: pick(&platform.customer_name, &caller.customer_name),
            customer_email: pick(&platform.customer_email, &caller.customer_email),
            customer_phone: pick(&platform.customer_phone, &caller.customer_phone),
        }
    }
}

/// Feasibility output attached to a system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityScore {
    /// 0..=100
    pub value: u8,
    /// True when the default was used instead of a service-returned value
    pub estimated: bool,
}

/// Independently fillable specification fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedSpecs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
}

impl ValidatedSpecs {
    pub fn is_empty(&self) -> bool {
        self.power.is_none()
            && self.efficiency.is_none()
            && self.voltage.is_none()
            && self.current.is_none()
            && self.dimensions.is_none()
            && self.weight.is_none()
            && self.warranty.is_none()
            && self.certifications.is_empty()
    }

    /// Fill empty fields from `other`, keeping values already present.
    pub fn fill_from(&mut self, other: ValidatedSpecs) {
        fn fill(slot: &mut Option<String>, value: Option<String>) {
            if slot.is_none() {
                *slot = value;
            }
        }
        fill(&mut self.power, other.power);
        fill(&mut self.efficiency, other.efficiency);
        fill(&mut self.voltage, other.voltage);
        fill(&mut self.current, other.current);
        fill(&mut self.dimensions, other.dimensions);
        fill(&mut self.weight, other.weight);
        fill(&mut self.warranty, other.warranty);
        for cert in other.certifications {
            if !self.certifications.contains(&cert) {
                self.certifications.push(cert);
            }
        }
    }
}

/// How a component's specification search ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// A validated, fetched datasheet is attached
    Resolved,
    /// No candidate validated
    NotFound,
    /// A candidate validated but the download was refused (type or size)
    Rejected { reason: String },
    /// A service call failed; treated as not found
    Failed { reason: String },
}

/// Provenance for a resolved datasheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceCitation {
    pub source_url: String,
    pub query: String,
    /// At most 25 words from the candidate text
    pub quote: String,
    pub content_hash: String,
}

/// One resolved (or unresolved) specification outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpecification {
    pub component: Component,
    /// Present only after independent validation and a bounded fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_sheet_url: Option<String>,
    #[serde(default)]
    pub validated_specs: ValidatedSpecs,
    pub outcome: ResolutionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<EvidenceCitation>,
}

impl ComponentSpecification {
    pub fn unresolved(component: Component, outcome: ResolutionOutcome) -> Self {
        Self {
            component,
            spec_sheet_url: None,
            validated_specs: ValidatedSpecs::default(),
            outcome,
            citation: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.spec_sheet_url.is_some()
    }
}

/// The aggregate unit of work for one project run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfiguration {
    pub project_info: ProjectMetadata,
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feasibility_score: Option<FeasibilityScore>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub specifications: Vec<ComponentSpecification>,
    /// Design-platform system id used for the site layout request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_id: Option<String>,
    /// True when ingestion fell back to placeholder data
    #[serde(default)]
    pub degraded: bool,
}

impl SystemConfiguration {
    pub fn score(&self) -> Option<u8> {
        self.feasibility_score.as_ref().map(|s| s.value)
    }
}

/// Kinds of documents in a permit packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    ApplicationForm,
    SiteLayout,
    ElectricalDiagram,
    SpecificationDossier,
    Datasheet,
    StructuralCalculations,
    InterconnectionApplication,
    Package,
}

impl DocumentKind {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::ApplicationForm => "application-form",
            Self::SiteLayout => "site-layout",
            Self::ElectricalDiagram => "electrical-diagram",
            Self::SpecificationDossier => "specification-dossier",
            Self::Datasheet => "datasheet",
            Self::StructuralCalculations => "structural-calculations",
            Self::InterconnectionApplication => "interconnection-application",
            Self::Package => "permit-packet",
        }
    }
}

/// Reference to a stored document. Never carries the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub kind: DocumentKind,
    pub path: String,
    pub url: String,
    pub mime: String,
    pub size: u64,
    pub pages: u32,
    pub hash: String,
}

/// The resolved-specification section of a packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationDossier {
    /// Rendered dossier (index of real datasheets and synthesized entries)
    pub index: DocumentRef,
    pub datasheets: Vec<DocumentRef>,
    /// True when no component resolved a real datasheet
    pub synthesized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketMetadata {
    pub generated_at: DateTime<Utc>,
    pub total_pages: u32,
    pub package_size: u64,
}

/// The terminal artifact of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitPacket {
    pub project_id: String,
    pub run_id: String,
    pub application_form: DocumentRef,
    pub site_layout: DocumentRef,
    pub electrical_diagram: DocumentRef,
    pub specifications: SpecificationDossier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural_calculations: Option<DocumentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interconnection_application: Option<DocumentRef>,
    pub package: DocumentRef,
    pub metadata: PacketMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component() -> Component {
        Component {
            row: 1,
            part_name: "Q.PEAK DUO BLK ML-G10+ 400".to_string(),
            part_number: "Q.PEAK DUO BLK ML-G10+ 400".to_string(),
            manufacturer: "Qcells".to_string(),
            qty: "24".to_string(),
            category: "Solar Module".to_string(),
        }
    }

    #[test]
    fn test_component_serializes_camel_case() {
        let value = serde_json::to_value(component()).unwrap();
        assert_eq!(value["partName"], "Q.PEAK DUO BLK ML-G10+ 400");
        assert_eq!(value["qty"], "24");
        assert_eq!(component().quantity(), 24);
    }

    #[test]
    fn test_label_skips_duplicate_part_number() {
        assert_eq!(component().label(), "Qcells Q.PEAK DUO BLK ML-G10+ 400");

        let mut other = component();
        other.part_number = "QP400".to_string();
        assert_eq!(other.label(), "Qcells Q.PEAK DUO BLK ML-G10+ 400 (QP400)");
    }

    #[test]
    fn test_platform_metadata_wins() {
        let caller = ProjectMetadata {
            address: Some("1 Caller St".to_string()),
            system_size_kw: Some(4.0),
            customer_name: Some("Avery".to_string()),
            ..Default::default()
        };
        let platform = ProjectMetadata {
            system_size_kw: Some(9.6),
            ..Default::default()
        };

        let merged = ProjectMetadata::merged(&caller, &platform);
        assert_eq!(merged.system_size_kw, Some(9.6));
        assert_eq!(merged.address.as_deref(), Some("1 Caller St"));
        assert_eq!(merged.customer_name.as_deref(), Some("Avery"));
    }

    #[test]
    fn test_fill_from_keeps_existing() {
        let mut specs = ValidatedSpecs {
            power: Some("400 W".to_string()),
            certifications: vec!["UL 61730".to_string()],
            ..Default::default()
        };
        specs.fill_from(ValidatedSpecs {
            power: Some("405 W".to_string()),
            weight: Some("21.1 kg".to_string()),
            certifications: vec!["UL 61730".to_string(), "IEC 61215".to_string()],
            ..Default::default()
        });

        assert_eq!(specs.power.as_deref(), Some("400 W"));
        assert_eq!(specs.weight.as_deref(), Some("21.1 kg"));
        assert_eq!(specs.certifications.len(), 2);
    }
}
