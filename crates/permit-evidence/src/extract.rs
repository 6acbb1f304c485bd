//! Spec field extraction from validated candidate text.

use lazy_static::lazy_static;
use permit_core::ValidatedSpecs;
use regex::Regex;

lazy_static! {
    static ref POWER: Regex =
        Regex::new(r"(?i)(?:rated|nominal|maximum|max\.?|output|pmax)?\s*power[^0-9\n]{0,40}(\d{1,5}(?:\.\d+)?)\s?(kW|Wp|W)\b").unwrap();
    static ref POWER_BARE: Regex = Regex::new(r"\b(\d{2,5}(?:\.\d+)?)\s?(kW|Wp|W)\b").unwrap();
    static ref EFFICIENCY: Regex =
        Regex::new(r"(?i)efficiency[^0-9\n]{0,40}(\d{1,2}(?:\.\d+)?)\s?%").unwrap();
    static ref VOLTAGE: Regex =
        Regex::new(r"(?i)(?:voltage|\bvoc\b|\bvmpp?\b)[^0-9\n]{0,40}(\d{1,4}(?:\.\d+)?)\s?V\b").unwrap();
    static ref CURRENT: Regex =
        Regex::new(r"(?i)(?:current|\bisc\b|\bimpp?\b)[^0-9\n]{0,40}(\d{1,3}(?:\.\d+)?)\s?A\b").unwrap();
    static ref DIMENSIONS: Regex = Regex::new(
        r"(?i)\b(\d{2,4}(?:\.\d+)?)\s?[x×]\s?(\d{2,4}(?:\.\d+)?)(?:\s?[x×]\s?(\d{1,4}(?:\.\d+)?))?\s?(mm|cm|in)\b"
    )
    .unwrap();
    static ref WEIGHT: Regex =
        Regex::new(r"(?i)weight[^0-9\n]{0,30}(\d{1,4}(?:\.\d+)?)\s?(kg|lbs?)\b").unwrap();
    static ref WARRANTY_LEADING: Regex =
        Regex::new(r"(?i)\b(\d{1,2})[- ]?(?:years?|yrs?)\b[^.\n]{0,30}warranty").unwrap();
    static ref WARRANTY_TRAILING: Regex =
        Regex::new(r"(?i)warranty[^0-9\n]{0,30}(\d{1,2})[- ]?(?:years?|yrs?)\b").unwrap();
    static ref CERTIFICATION: Regex = Regex::new(
        r"\b(UL\s?\d{3,5}(?:\.\d+)?|IEC\s?\d{5}(?:-\d+)?|CSA\s?C22\.2(?:\s?No\.\s?\d+(?:\.\d+)?)?|IEEE\s?1547(?:\.1)?)"
    )
    .unwrap();
}

/// Pull whatever spec fields the text states. Missing fields stay `None`.
pub fn extract_specs(text: &str) -> ValidatedSpecs {
    ValidatedSpecs {
        power: POWER
            .captures(text)
            .or_else(|| POWER_BARE.captures(text))
            .map(|c| format!("{} {}", &c[1], &c[2])),
        efficiency: EFFICIENCY.captures(text).map(|c| format!("{}%", &c[1])),
        voltage: VOLTAGE.captures(text).map(|c| format!("{} V", &c[1])),
        current: CURRENT.captures(text).map(|c| format!("{} A", &c[1])),
        dimensions: DIMENSIONS.captures(text).map(|c| {
            let mut dims = vec![&c[1], &c[2]];
            if let Some(depth) = c.get(3) {
                dims.push(depth.as_str());
            }
            format!("{} {}", dims.join(" x "), c[4].to_ascii_lowercase())
        }),
        weight: WEIGHT
            .captures(text)
            .map(|c| format!("{} {}", &c[1], c[2].to_ascii_lowercase())),
        warranty: WARRANTY_LEADING
            .captures(text)
            .or_else(|| WARRANTY_TRAILING.captures(text))
            .map(|c| format!("{} years", &c[1])),
        certifications: certifications(text),
    }
}

fn certifications(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in CERTIFICATION.find_iter(text) {
        let cert = m.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        if !found.contains(&cert) {
            found.push(cert);
        }
    }
    found
}
