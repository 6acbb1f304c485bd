//! Document template catalogue.
//!
//! Templates live in a YAML file of named Handlebars templates. The default
//! catalogue is compiled into the crate; a deployment may point at its own
//! file with the same shape.

use crate::error::{DocsError, DocsResult};
use serde::Deserialize;
use std::collections::HashMap;

const EMBEDDED_TEMPLATES: &str = include_str!("../templates/permit-templates.yaml");

/// Names every catalogue must define
pub const REQUIRED_TEMPLATES: &[&str] = &[
    "application_form",
    "site_layout",
    "electrical_diagram",
    "specification_dossier",
    "structural_calculations",
    "interconnection_application",
];

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesFile {
    pub version: String,
    pub templates: HashMap<String, Template>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub description: String,
    pub template: String,
}

impl TemplatesFile {
    /// The catalogue shipped with the crate.
    pub fn embedded() -> DocsResult<Self> {
        Self::from_yaml(EMBEDDED_TEMPLATES)
    }

    pub fn load(path: &str) -> DocsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DocsError::Template(format!("cannot read {}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> DocsResult<Self> {
        let file: TemplatesFile =
            serde_yaml::from_str(yaml).map_err(|e| DocsError::Template(e.to_string()))?;

        let missing: Vec<&str> = REQUIRED_TEMPLATES
            .iter()
            .copied()
            .filter(|name| !file.templates.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(DocsError::Template(format!(
                "catalogue is missing: {}",
                missing.join(", ")
            )));
        }
        Ok(file)
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn list_templates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalogue_is_complete() {
        let file = TemplatesFile::embedded().unwrap();
        for name in REQUIRED_TEMPLATES {
            assert!(file.get(name).is_some(), "missing {}", name);
        }
        assert_eq!(file.list_templates().len(), REQUIRED_TEMPLATES.len());
    }

    #[test]
    fn test_incomplete_catalogue_is_rejected() {
        let yaml = r#"
version: "1.0"
templates:
  application_form:
    description: Form
    template: "{{projectId}}"
"#;
        let err = TemplatesFile::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("site_layout"));
    }
}
