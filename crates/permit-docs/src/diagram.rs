//! One-line diagram model derived from component categories.

use permit_core::Component;
use serde::Serialize;

/// Diagram sections, in the order power flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramGroup {
    Modules,
    Optimizers,
    Inverters,
    Storage,
    Mounting,
    ElectricalBos,
    Other,
}

impl DiagramGroup {
    const ORDER: [DiagramGroup; 7] = [
        Self::Modules,
        Self::Optimizers,
        Self::Inverters,
        Self::Storage,
        Self::Mounting,
        Self::ElectricalBos,
        Self::Other,
    ];

    pub fn of(category: &str) -> Self {
        let c = category.to_ascii_lowercase();
        if c.contains("module") || c.contains("panel") {
            Self::Modules
        } else if c.contains("optimizer") {
            Self::Optimizers
        } else if c.contains("inverter") {
            Self::Inverters
        } else if c.contains("battery") || c.contains("storage") {
            Self::Storage
        } else if c.contains("mount") || c.contains("rail") || c.contains("rack") {
            Self::Mounting
        } else if c.contains("electrical") || c.contains("bos") {
            Self::ElectricalBos
        } else {
            Self::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Modules => "PV Modules",
            Self::Optimizers => "DC Optimizers",
            Self::Inverters => "Inverters",
            Self::Storage => "Energy Storage",
            Self::Mounting => "Mounting",
            Self::ElectricalBos => "Electrical BOS",
            Self::Other => "Balance of System",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagramSection {
    pub group: DiagramGroup,
    pub label: &'static str,
    pub entries: Vec<Component>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OneLineDiagram {
    pub sections: Vec<DiagramSection>,
    /// Electrical path from array to grid
    pub path: Vec<String>,
}

impl OneLineDiagram {
    pub fn from_components(components: &[Component]) -> Self {
        let sections: Vec<DiagramSection> = DiagramGroup::ORDER
            .iter()
            .filter_map(|group| {
                let entries: Vec<Component> = components
                    .iter()
                    .filter(|c| DiagramGroup::of(&c.category) == *group)
                    .cloned()
                    .collect();
                (!entries.is_empty()).then(|| DiagramSection {
                    group: *group,
                    label: group.label(),
                    entries,
                })
            })
            .collect();

        let has = |group: DiagramGroup| sections.iter().any(|s| s.group == group);
        let module_count: u32 = sections
            .iter()
            .filter(|s| s.group == DiagramGroup::Modules)
            .flat_map(|s| s.entries.iter())
            .map(Component::quantity)
            .sum();

        let mut path = Vec::new();
        if has(DiagramGroup::Modules) {
            path.push(format!("PV array ({} modules)", module_count));
        } else {
            path.push("PV array".to_string());
        }
        if has(DiagramGroup::Optimizers) {
            path.push("DC optimizers".to_string());
        }
        path.push("Inverter".to_string());
        if has(DiagramGroup::Storage) {
            path.push("Battery storage".to_string());
        }
        path.push("AC disconnect".to_string());
        path.push("Main service panel".to_string());
        path.push("Utility grid".to_string());

        Self { sections, path }
    }

    pub fn entries(&self, group: DiagramGroup) -> &[Component] {
        self.sections
            .iter()
            .find(|s| s.group == group)
            .map(|s| s.entries.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(row: u32, category: &str, qty: &str) -> Component {
        Component {
            row,
            part_name: format!("part-{}", row),
            part_number: format!("PN-{}", row),
            manufacturer: "Acme".to_string(),
            qty: qty.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_groups_follow_power_flow() {
        let diagram = OneLineDiagram::from_components(&[
            part(1, "Solar Module", "20"),
            part(2, "Inverter", "1"),
            part(3, "Mounting", "12"),
            part(4, "Electrical BOS", "1"),
            part(5, "Balance of System", "3"),
            part(6, "Power Optimizer", "20"),
        ]);

        let groups: Vec<DiagramGroup> = diagram.sections.iter().map(|s| s.group).collect();
        assert_eq!(
            groups,
            vec![
                DiagramGroup::Modules,
                DiagramGroup::Optimizers,
                DiagramGroup::Inverters,
                DiagramGroup::Mounting,
                DiagramGroup::ElectricalBos,
                DiagramGroup::Other,
            ]
        );
        assert_eq!(diagram.path[0], "PV array (20 modules)");
        assert_eq!(diagram.path[1], "DC optimizers");
        assert_eq!(diagram.entries(DiagramGroup::Mounting).len(), 1);
        assert!(diagram.entries(DiagramGroup::Storage).is_empty());
    }

    #[test]
    fn test_empty_design_still_has_a_path() {
        let diagram = OneLineDiagram::from_components(&[]);
        assert!(diagram.sections.is_empty());
        assert_eq!(diagram.path.first().map(String::as_str), Some("PV array"));
        assert_eq!(diagram.path.last().map(String::as_str), Some("Utility grid"));
    }
}
