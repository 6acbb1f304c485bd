//! Prompt construction for the three independent scoring calls.

use permit_core::{Component, ProjectMetadata};

fn describe_project(components: &[Component], metadata: &ProjectMetadata) -> String {
    let mut out = String::new();
    out.push_str("Project:\n");
    push_field(&mut out, "Address", metadata.address.as_deref());
    push_field(
        &mut out,
        "System size",
        metadata.system_size_kw.map(|kw| format!("{:.2} kW", kw)).as_deref(),
    );
    push_field(&mut out, "Roof type", metadata.roof_type.as_deref());
    push_field(&mut out, "Mounting", metadata.mounting_type.as_deref());
    push_field(&mut out, "Utility", metadata.utility.as_deref());
    push_field(&mut out, "Jurisdiction", metadata.jurisdiction.as_deref());

    out.push_str("\nComponents:\n");
    if components.is_empty() {
        out.push_str("- (no components available)\n");
    }
    for c in components {
        out.push_str(&format!(
            "- [{}] {} x{} ({})\n",
            c.category,
            c.label(),
            c.qty,
            c.part_number
        ));
    }
    out
}

fn push_field(out: &mut String, name: &str, value: Option<&str>) {
    out.push_str(&format!("- {}: {}\n", name, value.unwrap_or("unknown")));
}

pub fn score_prompt(components: &[Component], metadata: &ProjectMetadata) -> String {
    format!(
        "You review residential and commercial solar permit applications.\n\
         Rate how likely this design is to be approved as submitted, from 0 to 100.\n\
         Answer with the number first.\n\n{}",
        describe_project(components, metadata)
    )
}

pub fn issues_prompt(components: &[Component], metadata: &ProjectMetadata) -> String {
    format!(
        "You review solar permit applications. List the concrete problems that would \
         block or delay approval of this design, one per line, each starting with \"- \".\n\
         If there are none, answer \"No issues found\".\n\n{}",
        describe_project(components, metadata)
    )
}

pub fn recommendations_prompt(components: &[Component], metadata: &ProjectMetadata) -> String {
    format!(
        "You review solar permit applications. Suggest improvements that would make this \
         design easier to permit, one per line, each starting with \"- \".\n\n{}",
        describe_project(components, metadata)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_components_and_unknowns() {
        let components = vec![Component {
            row: 1,
            part_name: "SE7600H-US".to_string(),
            part_number: "SE7600H-US".to_string(),
            manufacturer: "SolarEdge".to_string(),
            qty: "1".to_string(),
            category: "Inverter".to_string(),
        }];
        let metadata = ProjectMetadata {
            system_size_kw: Some(7.6),
            ..Default::default()
        };

        let prompt = score_prompt(&components, &metadata);
        assert!(prompt.contains("- [Inverter] SolarEdge SE7600H-US x1"));
        assert!(prompt.contains("System size: 7.60 kW"));
        assert!(prompt.contains("Utility: unknown"));
    }
}
