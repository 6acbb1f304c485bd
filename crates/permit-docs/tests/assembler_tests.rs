use async_trait::async_trait;
use permit_core::{
    BlobStore, Component, ComponentSpecification, DesignPlatform, DocumentKind, EvidenceCitation,
    FeasibilityScore, FetchedDocument, InMemoryBlobStore, ProjectMetadata, ResolutionOutcome,
    RunContext, ServiceError, ServiceResult, SystemConfiguration, UpstreamProject, UpstreamSystem,
    ValidatedSpecs,
};
use permit_docs::{DocumentAssembler, TemplateRenderer};
use permit_evidence::Resolution;
use std::sync::Arc;
use std::time::Duration;

/// Serves a site layout only when `layout` is set.
struct LayoutPlatform {
    layout: Option<Vec<u8>>,
}

#[async_trait]
impl DesignPlatform for LayoutPlatform {
    async fn fetch_project(&self, external_id: &str) -> ServiceResult<UpstreamProject> {
        Err(ServiceError::NotConfigured(external_id.to_string()))
    }

    async fn fetch_systems(&self, external_id: &str) -> ServiceResult<Vec<UpstreamSystem>> {
        Err(ServiceError::NotConfigured(external_id.to_string()))
    }

    async fn fetch_site_layout(&self, system_id: &str) -> ServiceResult<FetchedDocument> {
        match &self.layout {
            Some(bytes) => Ok(FetchedDocument {
                url: format!("https://design.example/systems/{}/layout.png", system_id),
                content_type: Some("image/png".to_string()),
                bytes: bytes.clone(),
                exceeded_limit: false,
            }),
            None => Err(ServiceError::Http {
                status: 500,
                message: "render failed".to_string(),
            }),
        }
    }
}

fn component(row: u32, manufacturer: &str, part_number: &str, category: &str, qty: &str) -> Component {
    Component {
        row,
        part_name: part_number.to_string(),
        part_number: part_number.to_string(),
        manufacturer: manufacturer.to_string(),
        qty: qty.to_string(),
        category: category.to_string(),
    }
}

fn system(kw: f64, mounting: &str) -> SystemConfiguration {
    SystemConfiguration {
        project_info: ProjectMetadata {
            address: Some("12 Elm St, Springfield".to_string()),
            system_size_kw: Some(kw),
            mounting_type: Some(mounting.to_string()),
            utility: Some("Springfield Power".to_string()),
            customer_name: Some("Jordan Lee".to_string()),
            ..Default::default()
        },
        components: vec![
            component(1, "Qcells", "Q.PEAK DUO 400", "Solar Module", "20"),
            component(2, "SolarEdge", "SE7600H-US", "Inverter", "1"),
            component(3, "IronRidge", "XR100", "Mounting", "12"),
        ],
        feasibility_score: Some(FeasibilityScore {
            value: 82,
            estimated: false,
        }),
        system_id: Some("sys-1".to_string()),
        ..Default::default()
    }
}

fn resolved(component: Component, url: &str, bytes: Vec<u8>) -> Resolution {
    Resolution {
        specification: ComponentSpecification {
            component,
            spec_sheet_url: Some(url.to_string()),
            validated_specs: ValidatedSpecs {
                power: Some("7600 W".to_string()),
                ..Default::default()
            },
            outcome: ResolutionOutcome::Resolved,
            citation: Some(EvidenceCitation {
                source_url: url.to_string(),
                query: "SolarEdge SE7600H-US datasheet pdf".to_string(),
                quote: "SE7600H-US".to_string(),
                content_hash: "blake3:00".to_string(),
            }),
        },
        document: Some(FetchedDocument {
            url: url.to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes,
            exceeded_limit: false,
        }),
    }
}

fn unresolved(component: Component, outcome: ResolutionOutcome, specs: ValidatedSpecs) -> Resolution {
    let mut specification = ComponentSpecification::unresolved(component, outcome);
    specification.validated_specs = specs;
    Resolution {
        specification,
        document: None,
    }
}

fn assembler(blobs: Arc<InMemoryBlobStore>, layout: Option<Vec<u8>>) -> DocumentAssembler {
    DocumentAssembler::new(
        TemplateRenderer::embedded().unwrap(),
        blobs,
        Arc::new(LayoutPlatform { layout }),
        Duration::from_secs(5),
    )
}

async fn text(blobs: &InMemoryBlobStore, path: &str) -> String {
    String::from_utf8(blobs.get(path).await.unwrap()).unwrap()
}

#[tokio::test]
async fn test_small_roof_system_has_only_required_documents() {
    let blobs = Arc::new(InMemoryBlobStore::default());
    let ctx = RunContext::new("proj-1");
    let system = system(4.8, "Roof mount");
    let resolutions = system
        .components
        .iter()
        .cloned()
        .map(|c| unresolved(c, ResolutionOutcome::NotFound, ValidatedSpecs::default()))
        .collect();

    let outcome = assembler(blobs.clone(), Some(vec![137, 80, 78, 71]))
        .assemble(&ctx, &system, resolutions)
        .await
        .unwrap();

    assert!(!outcome.is_degraded());
    let docs = outcome.value();
    assert!(docs.structural_calculations.is_none());
    assert!(docs.interconnection_application.is_none());
    assert_eq!(docs.all().len(), 4);
    assert_eq!(docs.site_layout.mime, "image/png");
    assert!(docs.site_layout.path.ends_with("site-layout.png"));
    for doc in docs.all() {
        assert!(doc.path.starts_with(&ctx.blob_prefix()));
        assert!(doc.hash.starts_with("blake3:"));
        assert!(doc.pages >= 1);
    }

    let form = text(&blobs, &docs.application_form.path).await;
    assert!(form.contains("Address: 12 Elm St, Springfield"));
    assert!(form.contains("Nameplate capacity: 4.80 kW DC"));
    assert!(form.contains("| 2 | Inverter | SolarEdge | SE7600H-US | 1 |"));
    assert!(form.contains("Jurisdiction: Not provided"));
    assert!(!form.contains("Structural calculations"));
}

#[tokio::test]
async fn test_large_ground_mount_adds_conditional_documents() {
    let blobs = Arc::new(InMemoryBlobStore::default());
    let ctx = RunContext::new("proj-2");
    let system = system(12.4, "Ground Mount");
    let resolutions = system
        .components
        .iter()
        .cloned()
        .map(|c| unresolved(c, ResolutionOutcome::NotFound, ValidatedSpecs::default()))
        .collect();

    let outcome = assembler(blobs.clone(), Some(vec![1, 2, 3]))
        .assemble(&ctx, &system, resolutions)
        .await
        .unwrap();
    let docs = outcome.value();

    let structural = docs.structural_calculations.as_ref().expect("structural");
    assert_eq!(structural.kind, DocumentKind::StructuralCalculations);
    let body = text(&blobs, &structural.path).await;
    assert!(body.contains("exceeds 10 kW"));
    assert!(body.contains("Ground Mount installation"));
    assert!(body.contains("Module count: 20"));

    let interconnection = docs.interconnection_application.as_ref().expect("interconnection");
    let body = text(&blobs, &interconnection.path).await;
    assert!(body.contains("Utility: Springfield Power"));
    assert!(body.contains("Inverter: 1 x SolarEdge SE7600H-US"));
    assert_eq!(docs.all().len(), 6);
}

#[tokio::test]
async fn test_zero_resolved_specs_synthesizes_whole_dossier() {
    let blobs = Arc::new(InMemoryBlobStore::default());
    let ctx = RunContext::new("proj-3");
    let system = system(6.0, "Roof mount");
    let partial = ValidatedSpecs {
        efficiency: Some("20.3%".to_string()),
        ..Default::default()
    };
    let resolutions = vec![
        unresolved(
            system.components[0].clone(),
            ResolutionOutcome::Rejected {
                reason: "document exceeds the 10485760 byte limit".to_string(),
            },
            partial,
        ),
        unresolved(
            system.components[1].clone(),
            ResolutionOutcome::NotFound,
            ValidatedSpecs::default(),
        ),
        unresolved(
            system.components[2].clone(),
            ResolutionOutcome::Failed {
                reason: "search failed".to_string(),
            },
            ValidatedSpecs::default(),
        ),
    ];

    let outcome = assembler(blobs.clone(), Some(vec![9]))
        .assemble(&ctx, &system, resolutions)
        .await
        .unwrap();
    let dossier = &outcome.value().specifications;

    assert!(dossier.synthesized);
    assert!(dossier.datasheets.is_empty());
    let body = text(&blobs, &dossier.index.path).await;
    assert!(body.contains("Datasheets attached: 0 of 3"));
    assert!(body.contains("synthesized"));
    assert!(body.contains("Efficiency: 20.3%"));
    assert!(body.contains("download refused"));
    assert!(body.contains("No specification values were extracted."));
}

#[tokio::test]
async fn test_mixed_dossier_attaches_resolved_and_falls_back_for_rest() {
    let blobs = Arc::new(InMemoryBlobStore::default());
    let ctx = RunContext::new("proj-4");
    let system = system(7.6, "Roof mount");
    let datasheet = b"%PDF-1.7\n<< /Type /Page >>\n<< /Type /Page >>\n".to_vec();
    let resolutions = vec![
        unresolved(
            system.components[0].clone(),
            ResolutionOutcome::Rejected {
                reason: "document exceeds the 10485760 byte limit".to_string(),
            },
            ValidatedSpecs::default(),
        ),
        resolved(
            system.components[1].clone(),
            "https://www.solaredge.com/se7600h.pdf",
            datasheet.clone(),
        ),
        unresolved(
            system.components[2].clone(),
            ResolutionOutcome::NotFound,
            ValidatedSpecs::default(),
        ),
    ];

    let outcome = assembler(blobs.clone(), Some(vec![9]))
        .assemble(&ctx, &system, resolutions)
        .await
        .unwrap();
    let docs = outcome.value();
    let dossier = &docs.specifications;

    assert!(!dossier.synthesized);
    assert_eq!(dossier.datasheets.len(), 1);
    let sheet = &dossier.datasheets[0];
    assert_eq!(sheet.kind, DocumentKind::Datasheet);
    assert_eq!(sheet.pages, 2);
    assert!(sheet.path.ends_with("datasheets/002-se7600h-us.pdf"));
    assert_eq!(blobs.get(&sheet.path).await.unwrap(), datasheet);

    let body = text(&blobs, &dossier.index.path).await;
    assert!(body.contains("Datasheets attached: 1 of 3"));
    assert!(body.contains("Source: https://www.solaredge.com/se7600h.pdf"));
    assert!(body.contains("Power: 7600 W"));
    assert!(body.contains("no validated datasheet found"));

    let interconnection = docs.interconnection_application.as_ref().unwrap();
    let body = text(&blobs, &interconnection.path).await;
    assert!(body.contains("Inverter: 1 x SolarEdge SE7600H-US (7600 W)"));
}

#[tokio::test]
async fn test_site_layout_falls_back_to_template() {
    let blobs = Arc::new(InMemoryBlobStore::default());
    let ctx = RunContext::new("proj-5");
    let system = system(4.0, "Roof mount");

    let outcome = assembler(blobs.clone(), None)
        .assemble(&ctx, &system, Vec::new())
        .await
        .unwrap();

    assert!(outcome.is_degraded());
    assert!(outcome.reasons()[0].contains("site layout unavailable"));
    let layout = &outcome.value().site_layout;
    assert_eq!(layout.mime, "text/markdown");
    let body = text(&blobs, &layout.path).await;
    assert!(body.contains("Site Layout (schematic)"));
    assert!(body.contains("20 x Qcells Q.PEAK DUO 400"));
    assert!(body.contains("12 x IronRidge XR100"));
}

#[tokio::test]
async fn test_empty_design_still_produces_every_required_document() {
    let blobs = Arc::new(InMemoryBlobStore::default());
    let ctx = RunContext::new("proj-6");
    let system = SystemConfiguration {
        degraded: true,
        ..Default::default()
    };

    let outcome = assembler(blobs.clone(), None)
        .assemble(&ctx, &system, Vec::new())
        .await
        .unwrap();
    let docs = outcome.value();

    assert_eq!(docs.all().len(), 4);
    assert!(docs.specifications.synthesized);
    let form = text(&blobs, &docs.application_form.path).await;
    assert!(form.contains("No equipment list was available"));
    let dossier = text(&blobs, &docs.specifications.index.path).await;
    assert!(dossier.contains("No equipment was available to document"));
    assert_eq!(blobs.paths().await.len(), 4);
}
