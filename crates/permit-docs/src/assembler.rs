//! Document Assembler
//!
//! Renders every required document for a run, writes each one to the blob
//! store under the run's prefix, and hands back references only.

use crate::diagram::{DiagramGroup, OneLineDiagram};
use crate::error::DocsResult;
use crate::pages::count_pages;
use crate::renderer::TemplateRenderer;
use crate::requirements::{structural_reasons, RequiredDocuments};
use permit_core::{
    hash_bytes, BlobStore, Component, DesignPlatform, DocumentKind, DocumentRef,
    ResolutionOutcome, RunContext, SpecificationDossier, StageOutcome, SystemConfiguration,
    ValidatedSpecs,
};
use permit_evidence::Resolution;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const MARKDOWN_MIME: &str = "text/markdown";

/// Everything the Packager needs, as references.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledDocuments {
    pub application_form: DocumentRef,
    pub site_layout: DocumentRef,
    pub electrical_diagram: DocumentRef,
    pub specifications: SpecificationDossier,
    pub structural_calculations: Option<DocumentRef>,
    pub interconnection_application: Option<DocumentRef>,
}

impl AssembledDocuments {
    /// Every document in packet order, datasheets after the dossier index.
    pub fn all(&self) -> Vec<&DocumentRef> {
        let mut docs = vec![
            &self.application_form,
            &self.site_layout,
            &self.electrical_diagram,
            &self.specifications.index,
        ];
        docs.extend(self.specifications.datasheets.iter());
        docs.extend(self.structural_calculations.iter());
        docs.extend(self.interconnection_application.iter());
        docs
    }
}

pub struct DocumentAssembler {
    renderer: TemplateRenderer,
    blobs: Arc<dyn BlobStore>,
    platform: Arc<dyn DesignPlatform>,
    timeout: Duration,
}

impl DocumentAssembler {
    pub fn new(
        renderer: TemplateRenderer,
        blobs: Arc<dyn BlobStore>,
        platform: Arc<dyn DesignPlatform>,
        timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            blobs,
            platform,
            timeout,
        }
    }

    /// Build the packet's documents. Rendering or storage errors are returned;
    /// an unavailable site layout only degrades the outcome.
    pub async fn assemble(
        &self,
        ctx: &RunContext,
        system: &SystemConfiguration,
        resolutions: Vec<Resolution>,
    ) -> DocsResult<StageOutcome<AssembledDocuments>> {
        let mut reasons = Vec::new();
        let required = RequiredDocuments::for_system(system);
        let diagram = OneLineDiagram::from_components(&system.components);
        let specs_by_row: HashMap<u32, ValidatedSpecs> = resolutions
            .iter()
            .map(|r| {
                (
                    r.specification.component.row,
                    r.specification.validated_specs.clone(),
                )
            })
            .collect();

        let application_form = self
            .render_and_store(
                ctx,
                DocumentKind::ApplicationForm,
                "application_form",
                &json!({
                    "projectId": ctx.project_id,
                    "runId": ctx.run_id,
                    "generatedAt": ctx.started_at.to_rfc3339(),
                    "project": system.project_info,
                    "feasibility": system.feasibility_score,
                    "components": system.components,
                    "componentCount": system.components.len(),
                    "documents": required,
                }),
            )
            .await?;

        let site_layout = self.site_layout(ctx, system, &diagram, &mut reasons).await?;

        let electrical_diagram = self
            .render_and_store(
                ctx,
                DocumentKind::ElectricalDiagram,
                "electrical_diagram",
                &json!({
                    "projectId": ctx.project_id,
                    "project": system.project_info,
                    "sections": diagram.sections,
                    "path": diagram.path,
                }),
            )
            .await?;

        let structural_calculations = if required.structural {
            let modules = diagram.entries(DiagramGroup::Modules);
            Some(
                self.render_and_store(
                    ctx,
                    DocumentKind::StructuralCalculations,
                    "structural_calculations",
                    &json!({
                        "projectId": ctx.project_id,
                        "project": system.project_info,
                        "reasons": structural_reasons(system),
                        "moduleCount": modules.iter().map(Component::quantity).sum::<u32>(),
                        "arrayWeightKg": array_weight_kg(modules, &specs_by_row),
                        "mounting": diagram.entries(DiagramGroup::Mounting),
                    }),
                )
                .await?,
            )
        } else {
            None
        };

        let interconnection_application = if required.interconnection {
            let inverters: Vec<Value> = diagram
                .entries(DiagramGroup::Inverters)
                .iter()
                .map(|c| {
                    json!({
                        "qty": c.qty,
                        "manufacturer": c.manufacturer,
                        "partNumber": c.part_number,
                        "power": specs_by_row.get(&c.row).and_then(|s| s.power.clone()),
                    })
                })
                .collect();
            Some(
                self.render_and_store(
                    ctx,
                    DocumentKind::InterconnectionApplication,
                    "interconnection_application",
                    &json!({
                        "projectId": ctx.project_id,
                        "project": system.project_info,
                        "inverters": inverters,
                        "storage": diagram.entries(DiagramGroup::Storage),
                    }),
                )
                .await?,
            )
        } else {
            None
        };

        let specifications = self.dossier(ctx, resolutions).await?;

        tracing::info!(
            project_id = %ctx.project_id,
            run_id = %ctx.run_id,
            datasheets = specifications.datasheets.len(),
            synthesized = specifications.synthesized,
            structural = required.structural,
            interconnection = required.interconnection,
            "documents assembled"
        );

        Ok(StageOutcome::from_reasons(
            AssembledDocuments {
                application_form,
                site_layout,
                electrical_diagram,
                specifications,
                structural_calculations,
                interconnection_application,
            },
            reasons,
        ))
    }

    async fn site_layout(
        &self,
        ctx: &RunContext,
        system: &SystemConfiguration,
        diagram: &OneLineDiagram,
        reasons: &mut Vec<String>,
    ) -> DocsResult<DocumentRef> {
        match system.system_id.as_deref() {
            Some(system_id) => {
                match tokio::time::timeout(self.timeout, self.platform.fetch_site_layout(system_id))
                    .await
                {
                    Ok(Ok(layout)) if !layout.bytes.is_empty() => {
                        let mime = layout
                            .content_type
                            .as_deref()
                            .map(mime_essence)
                            .unwrap_or_else(|| "application/octet-stream".to_string());
                        let file_name =
                            format!("{}.{}", DocumentKind::SiteLayout.slug(), extension(&mime));
                        return self
                            .store(ctx, DocumentKind::SiteLayout, &file_name, layout.bytes, &mime)
                            .await;
                    }
                    Ok(Ok(_)) => reasons.push("site layout from design platform was empty".to_string()),
                    Ok(Err(err)) => reasons.push(format!("site layout unavailable: {}", err)),
                    Err(_) => reasons.push(format!(
                        "site layout request timed out after {}s",
                        self.timeout.as_secs()
                    )),
                }
            }
            None => reasons.push("no design system; site layout rendered from template".to_string()),
        }

        if let Some(reason) = reasons.last() {
            tracing::warn!(project_id = %ctx.project_id, %reason, "using template site layout");
        }
        self.render_and_store(
            ctx,
            DocumentKind::SiteLayout,
            "site_layout",
            &json!({
                "projectId": ctx.project_id,
                "project": system.project_info,
                "modules": diagram.entries(DiagramGroup::Modules),
                "mounting": diagram.entries(DiagramGroup::Mounting),
            }),
        )
        .await
    }

    /// Real datasheets where resolved; synthesized entries elsewhere. When
    /// nothing resolved the whole dossier is synthesized.
    async fn dossier(
        &self,
        ctx: &RunContext,
        resolutions: Vec<Resolution>,
    ) -> DocsResult<SpecificationDossier> {
        let mut datasheets = Vec::new();
        let mut entries = Vec::with_capacity(resolutions.len());

        for Resolution {
            specification,
            document,
        } in resolutions
        {
            let component = &specification.component;
            let datasheet = match (document, specification.spec_sheet_url.as_deref()) {
                (Some(document), Some(source)) => {
                    let mime = document
                        .content_type
                        .as_deref()
                        .map(mime_essence)
                        .unwrap_or_else(|| "application/pdf".to_string());
                    let file_name = format!(
                        "datasheets/{:03}-{}.{}",
                        component.row,
                        file_slug(&component.part_number, &component.part_name),
                        extension(&mime)
                    );
                    let stored = self
                        .store(ctx, DocumentKind::Datasheet, &file_name, document.bytes, &mime)
                        .await?;
                    let entry = json!({
                        "path": stored.path,
                        "url": stored.url,
                        "source": source,
                    });
                    datasheets.push(stored);
                    Some(entry)
                }
                _ => None,
            };

            entries.push(json!({
                "row": component.row,
                "manufacturer": component.manufacturer,
                "partNumber": component.part_number,
                "partName": component.part_name,
                "category": component.category,
                "qty": component.qty,
                "datasheet": datasheet,
                "reason": unresolved_reason(&specification.outcome),
                "specs": specification.validated_specs,
                "hasSpecs": !specification.validated_specs.is_empty(),
            }));
        }

        let synthesized = datasheets.is_empty();
        if synthesized {
            tracing::info!(project_id = %ctx.project_id, "no datasheets resolved; dossier synthesized");
        }

        let index = self
            .render_and_store(
                ctx,
                DocumentKind::SpecificationDossier,
                "specification_dossier",
                &json!({
                    "projectId": ctx.project_id,
                    "synthesized": synthesized,
                    "datasheetCount": datasheets.len(),
                    "entryCount": entries.len(),
                    "entries": entries,
                }),
            )
            .await?;

        Ok(SpecificationDossier {
            index,
            datasheets,
            synthesized,
        })
    }

    async fn render_and_store(
        &self,
        ctx: &RunContext,
        kind: DocumentKind,
        template: &str,
        data: &Value,
    ) -> DocsResult<DocumentRef> {
        let text = self.renderer.render(template, data)?;
        let file_name = format!("{}.md", kind.slug());
        self.store(ctx, kind, &file_name, text.into_bytes(), MARKDOWN_MIME)
            .await
    }

    async fn store(
        &self,
        ctx: &RunContext,
        kind: DocumentKind,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> DocsResult<DocumentRef> {
        let path = format!("{}/{}", ctx.blob_prefix(), file_name);
        let pages = count_pages(mime, &bytes);
        let hash = hash_bytes(&bytes);
        let blob = self.blobs.put(&path, bytes, mime).await?;

        tracing::debug!(path = %blob.path, size = blob.size, pages, "document stored");
        Ok(DocumentRef {
            kind,
            path: blob.path,
            url: blob.url,
            mime: mime.to_string(),
            size: blob.size,
            pages,
            hash,
        })
    }
}

fn unresolved_reason(outcome: &ResolutionOutcome) -> String {
    match outcome {
        ResolutionOutcome::Resolved => String::new(),
        ResolutionOutcome::NotFound => "no validated datasheet found".to_string(),
        ResolutionOutcome::Rejected { reason } => format!("download refused: {}", reason),
        ResolutionOutcome::Failed { reason } => format!("lookup failed: {}", reason),
    }
}

/// Total module weight, only when every module line states one.
fn array_weight_kg(modules: &[Component], specs: &HashMap<u32, ValidatedSpecs>) -> Option<f64> {
    if modules.is_empty() {
        return None;
    }
    modules.iter().try_fold(0.0, |total, module| {
        let each = specs
            .get(&module.row)
            .and_then(|s| s.weight.as_deref())
            .and_then(weight_kg)?;
        Some(total + each * f64::from(module.quantity()))
    })
}

/// "22.0 kg" or "48.5 lbs" in kilograms.
pub fn weight_kg(weight: &str) -> Option<f64> {
    let mut parts = weight.split_whitespace();
    let value: f64 = parts.next()?.parse().ok()?;
    match parts.next()?.to_ascii_lowercase().as_str() {
        "kg" => Some(value),
        "lb" | "lbs" => Some(value * 0.453_592_37),
        _ => None,
    }
}

fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn extension(mime: &str) -> &'static str {
    match mime {
        "application/pdf" | "application/x-pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/svg+xml" => "svg",
        "text/markdown" => "md",
        "text/plain" => "txt",
        _ => "bin",
    }
}

fn file_slug(part_number: &str, part_name: &str) -> String {
    let source = if part_number.trim().is_empty() {
        part_name
    } else {
        part_number
    };
    let mut slug = String::with_capacity(source.len());
    for c in source.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "part".to_string()
    } else {
        slug.to_string()
    }
}
