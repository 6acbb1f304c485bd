//! Category classification for BOM lines that arrive without one.

use lazy_static::lazy_static;
use regex::Regex;

pub const CATEGORY_MODULE: &str = "Solar Module";
pub const CATEGORY_INVERTER: &str = "Inverter";
pub const CATEGORY_MICROINVERTER: &str = "Microinverter";
pub const CATEGORY_OPTIMIZER: &str = "Power Optimizer";
pub const CATEGORY_MOUNTING: &str = "Mounting";
pub const CATEGORY_ELECTRICAL: &str = "Electrical BOS";
pub const CATEGORY_STORAGE: &str = "Battery Storage";
pub const CATEGORY_OTHER: &str = "Balance of System";

lazy_static! {
    /// Ordered: first match wins
    static ref CATEGORY_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\bmicro[- ]?inverter|\biq\s?\d").unwrap(), CATEGORY_MICROINVERTER),
        (Regex::new(r"(?i)\boptimi[sz]er\b").unwrap(), CATEGORY_OPTIMIZER),
        (Regex::new(r"(?i)\binverter\b").unwrap(), CATEGORY_INVERTER),
        (Regex::new(r"(?i)\b(battery|powerwall|storage)\b").unwrap(), CATEGORY_STORAGE),
        (
            Regex::new(r"(?i)\b(rail|clamp|flashing|attachment|mount|racking|splice|l-?foot|ballast)").unwrap(),
            CATEGORY_MOUNTING,
        ),
        (
            Regex::new(r"(?i)\b(disconnect|breaker|combiner|conduit|wire|cable|junction|fuse|meter|panelboard|ground)").unwrap(),
            CATEGORY_ELECTRICAL,
        ),
        (Regex::new(r"(?i)\b(module|panel)\b").unwrap(), CATEGORY_MODULE),
    ];
}

/// Classify an "other parts" line by its name or code.
pub fn classify(upstream_category: Option<&str>, name: &str) -> String {
    if let Some(category) = upstream_category.map(str::trim).filter(|c| !c.is_empty()) {
        return category.to_string();
    }
    CATEGORY_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(name))
        .map(|(_, category)| category.to_string())
        .unwrap_or_else(|| CATEGORY_OTHER.to_string())
}

/// Inverter lines keep "Inverter" unless they are clearly microinverters.
pub fn classify_inverter(name: &str) -> String {
    match classify(None, name).as_str() {
        CATEGORY_MICROINVERTER => CATEGORY_MICROINVERTER.to_string(),
        _ => CATEGORY_INVERTER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_category_wins() {
        assert_eq!(classify(Some("Racking"), "XR100 Rail"), "Racking");
        assert_eq!(classify(Some("  "), "XR100 Rail 168in"), CATEGORY_MOUNTING);
    }

    #[test]
    fn test_keyword_classification() {
        assert_eq!(classify(None, "60A Non-Fused Disconnect"), CATEGORY_ELECTRICAL);
        assert_eq!(classify(None, "FlashFoot2 Attachment"), CATEGORY_MOUNTING);
        assert_eq!(classify(None, "P401 Optimizer"), CATEGORY_OPTIMIZER);
        assert_eq!(classify(None, "Powerwall 3"), CATEGORY_STORAGE);
        assert_eq!(classify(None, "Critter Guard"), CATEGORY_OTHER);
    }

    #[test]
    fn test_inverter_classification() {
        assert_eq!(classify_inverter("IQ8PLUS-72-2-US"), CATEGORY_MICROINVERTER);
        assert_eq!(classify_inverter("SE7600H-US"), CATEGORY_INVERTER);
    }
}
