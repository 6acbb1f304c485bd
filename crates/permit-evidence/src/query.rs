//! Search query planning
//!
//! Each component yields two or three ranked queries. When the manufacturer
//! has a known domain every query is tried scoped to it first; the same
//! queries unscoped follow only after the scoped ones are exhausted.

use crate::domains::DomainTable;
use permit_core::Component;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductClass {
    Module,
    Inverter,
    Mounting,
    Storage,
    Generic,
}

impl ProductClass {
    pub fn from_category(category: &str) -> Self {
        let category = category.to_ascii_lowercase();
        if category.contains("module") || category.contains("panel") {
            Self::Module
        } else if category.contains("inverter") || category.contains("optimizer") {
            Self::Inverter
        } else if category.contains("mount") || category.contains("rack") {
            Self::Mounting
        } else if category.contains("battery") || category.contains("storage") {
            Self::Storage
        } else {
            Self::Generic
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            Self::Module => "solar module",
            Self::Inverter => "inverter",
            Self::Mounting => "racking",
            Self::Storage => "battery",
            Self::Generic => "",
        }
    }
}

/// One search to run, in rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedQuery {
    pub text: String,
    /// Empty when unscoped
    pub include_domains: Vec<String>,
}

impl PlannedQuery {
    pub fn is_scoped(&self) -> bool {
        !self.include_domains.is_empty()
    }
}

/// Ranked query strings for a component, most specific first.
pub fn query_texts(component: &Component) -> Vec<String> {
    let class = ProductClass::from_category(&component.category);
    let manufacturer = component.manufacturer.trim();
    let part_number = component.part_number.trim();
    let part_name = component.part_name.trim();
    let identifier = if part_number.is_empty() {
        part_name
    } else {
        part_number
    };

    let mut texts = vec![
        join(&[manufacturer, identifier, "datasheet pdf"]),
        join(&[manufacturer, identifier, class.noun(), "specifications"]),
    ];
    if !part_name.is_empty() && part_name != identifier {
        texts.push(join(&[manufacturer, part_name, "spec sheet"]));
    }

    let mut unique: Vec<String> = Vec::with_capacity(texts.len());
    for text in texts {
        if !text.is_empty() && !unique.contains(&text) {
            unique.push(text);
        }
    }
    unique
}

/// Full search plan: scoped queries first, then the unscoped fallback.
pub fn plan_queries(component: &Component, domains: &DomainTable) -> Vec<PlannedQuery> {
    let texts = query_texts(component);
    let mut plan = Vec::with_capacity(texts.len() * 2);

    if let Some(domain) = domains.lookup(&component.manufacturer) {
        plan.extend(texts.iter().map(|text| PlannedQuery {
            text: text.clone(),
            include_domains: vec![domain.clone()],
        }));
    }
    plan.extend(texts.into_iter().map(|text| PlannedQuery {
        text,
        include_domains: Vec::new(),
    }));
    plan
}

fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(manufacturer: &str, part_number: &str, part_name: &str, category: &str) -> Component {
        Component {
            row: 1,
            part_name: part_name.to_string(),
            part_number: part_number.to_string(),
            manufacturer: manufacturer.to_string(),
            qty: "1".to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_product_class_from_category() {
        assert_eq!(ProductClass::from_category("Solar Module"), ProductClass::Module);
        assert_eq!(ProductClass::from_category("Microinverter"), ProductClass::Inverter);
        assert_eq!(ProductClass::from_category("Power Optimizer"), ProductClass::Inverter);
        assert_eq!(ProductClass::from_category("Mounting"), ProductClass::Mounting);
        assert_eq!(ProductClass::from_category("Battery Storage"), ProductClass::Storage);
        assert_eq!(ProductClass::from_category("Electrical BOS"), ProductClass::Generic);
    }

    #[test]
    fn test_two_or_three_ranked_queries() {
        let texts = query_texts(&component(
            "Qcells",
            "Q.PEAK DUO BLK ML-G10+ 400",
            "Q.PEAK DUO 400W",
            "Solar Module",
        ));
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0], "Qcells Q.PEAK DUO BLK ML-G10+ 400 datasheet pdf");
        assert!(texts[1].contains("solar module specifications"));

        let texts = query_texts(&component("IronRidge", "XR100", "XR100", "Mounting"));
        assert_eq!(texts.len(), 2);
    }

    #[test]
    fn test_scoped_queries_come_before_unscoped() {
        let plan = plan_queries(
            &component("Enphase", "IQ8PLUS-72-2-US", "IQ8+ Microinverter", "Microinverter"),
            &DomainTable::new(),
        );
        assert_eq!(plan.len(), 6);
        assert!(plan[..3].iter().all(|q| q.include_domains == vec!["enphase.com"]));
        assert!(plan[3..].iter().all(|q| !q.is_scoped()));
        assert_eq!(plan[0].text, plan[3].text);
    }

    #[test]
    fn test_unknown_manufacturer_is_unscoped_only() {
        let plan = plan_queries(
            &component("Acme Widgets", "AW-1", "AW-1", "Electrical BOS"),
            &DomainTable::new(),
        );
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|q| !q.is_scoped()));
        assert_eq!(plan[0].text, "Acme Widgets AW-1 datasheet pdf");
        assert_eq!(plan[1].text, "Acme Widgets AW-1 specifications");
    }
}
