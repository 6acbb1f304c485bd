//! Handlebars rendering for permit documents.
//!
//! Output is Markdown, so HTML escaping is off. Helpers:
//! - fixed: number with N decimals (`{{fixed kw 2}}`)
//! - truncate: cut text to N characters with an ellipsis
//! - join: join an array with a separator
//! - default: value, or a fallback when null or missing

use crate::error::{DocsError, DocsResult};
use crate::templates::TemplatesFile;
use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde_json::Value;

handlebars_helper!(fixed: |value: f64, digits: u64| format!("{:.*}", digits as usize, value));
handlebars_helper!(truncate: |text: str, max: u64| truncate_chars(text, max as usize));
handlebars_helper!(join: |items: array, separator: str| {
    items.iter().map(display).collect::<Vec<_>>().join(separator)
});
handlebars_helper!(or_default: |value: Json, fallback: str| {
    if value.is_null() { fallback.to_string() } else { display(value) }
});

/// Compiled catalogue with helpers registered.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
    templates: TemplatesFile,
}

impl TemplateRenderer {
    pub fn new(templates: TemplatesFile) -> DocsResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(no_escape);

        handlebars.register_helper("fixed", Box::new(fixed));
        handlebars.register_helper("truncate", Box::new(truncate));
        handlebars.register_helper("join", Box::new(join));
        handlebars.register_helper("default", Box::new(or_default));

        for (name, template) in &templates.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| DocsError::Template(format!("{}: {}", name, e)))?;
        }

        Ok(Self {
            handlebars,
            templates,
        })
    }

    /// Renderer over the catalogue compiled into the crate.
    pub fn embedded() -> DocsResult<Self> {
        Self::new(TemplatesFile::embedded()?)
    }

    pub fn render(&self, template_name: &str, data: &Value) -> DocsResult<String> {
        self.handlebars
            .render(template_name, data)
            .map_err(|e| DocsError::Render {
                template: template_name.to_string(),
                message: e.to_string(),
            })
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.list_templates()
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max).collect();
        out.push_str("...");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::Template;
    use serde_json::json;
    use std::collections::HashMap;

    fn renderer_with(name: &str, template: &str) -> TemplateRenderer {
        let mut templates = TemplatesFile::embedded().unwrap();
        templates.templates.insert(
            name.to_string(),
            Template {
                description: "test".to_string(),
                template: template.to_string(),
            },
        );
        TemplateRenderer::new(templates).unwrap()
    }

    #[test]
    fn test_helpers() {
        let r = renderer_with(
            "t",
            "{{fixed kw 2}}|{{truncate name 4}}|{{join certs \", \"}}|{{default missing \"n/a\"}}|{{#if (eq a b)}}same{{/if}}",
        );
        let out = r
            .render(
                "t",
                &json!({"kw": 7.6, "name": "Enphase", "certs": ["UL 1741", "IEEE 1547"], "a": 1, "b": 1}),
            )
            .unwrap();
        assert_eq!(out, "7.60|Enph...|UL 1741, IEEE 1547|n/a|same");
    }

    #[test]
    fn test_markdown_is_not_escaped() {
        let r = renderer_with("t", "{{name}}");
        let out = r.render("t", &json!({"name": "Smith & Sons <LLC>"})).unwrap();
        assert_eq!(out, "Smith & Sons <LLC>");
    }

    #[test]
    fn test_bad_template_is_reported() {
        let mut templates = TemplatesFile::embedded().unwrap();
        templates.templates = HashMap::from([(
            "broken".to_string(),
            Template {
                description: "broken".to_string(),
                template: "{{#if}}".to_string(),
            },
        )]);
        assert!(matches!(
            TemplateRenderer::new(templates),
            Err(DocsError::Template(_))
        ));
    }

    #[test]
    fn test_unknown_template_is_render_error() {
        let r = TemplateRenderer::embedded().unwrap();
        assert!(matches!(
            r.render("nope", &json!({})),
            Err(DocsError::Render { .. })
        ));
    }
}
