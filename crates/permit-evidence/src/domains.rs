//! Manufacturer → canonical domain table used to scope searches.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static BUILTIN_DOMAINS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Modules
        ("qcells", "qcells.com"),
        ("hanwhaqcells", "qcells.com"),
        ("rec", "recgroup.com"),
        ("canadian", "canadiansolar.com"),
        ("jinko", "jinkosolar.com"),
        ("jinkosolar", "jinkosolar.com"),
        ("longi", "longi.com"),
        ("trina", "trinasolar.com"),
        ("trinasolar", "trinasolar.com"),
        ("sunpower", "sunpower.com"),
        ("maxeon", "maxeon.com"),
        ("panasonic", "na.panasonic.com"),
        ("silfab", "silfabsolar.com"),
        ("mission", "missionsolar.com"),
        ("ja", "jasolar.com"),
        ("jasolar", "jasolar.com"),
        // Inverters and MLPE
        ("enphase", "enphase.com"),
        ("solaredge", "solaredge.com"),
        ("sma", "sma-america.com"),
        ("fronius", "fronius.com"),
        ("apsystems", "apsystems.com"),
        ("hoymiles", "hoymiles.com"),
        ("tigo", "tigoenergy.com"),
        ("solark", "sol-ark.com"),
        // Storage
        ("tesla", "tesla.com"),
        ("generac", "generac.com"),
        ("franklinwh", "franklinwh.com"),
        // Racking
        ("ironridge", "ironridge.com"),
        ("unirac", "unirac.com"),
        ("snapnrack", "snapnrack.com"),
        ("quickbolt", "quickbolt.com"),
        ("k2", "k2-systems.com"),
        ("ecofasten", "ecofastensolar.com"),
        ("s5", "s-5.com"),
        // Electrical
        ("eaton", "eaton.com"),
        ("squared", "se.com"),
        ("schneider", "se.com"),
        ("siemens", "siemens.com"),
    ])
});

/// Words dropped before the second lookup attempt
const NOISE_WORDS: &[&str] = &[
    "inc", "llc", "co", "corp", "corporation", "ltd", "gmbh", "solar", "energy", "technologies",
    "technology", "group", "usa", "america", "electric", "electronics", "systems", "power",
];

/// Domain lookup keyed by normalized manufacturer name.
#[derive(Debug, Clone, Default)]
pub struct DomainTable {
    overrides: HashMap<String, String>,
}

impl DomainTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra or replacement entries, keyed by manufacturer name as written.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        Self {
            overrides: overrides
                .iter()
                .map(|(name, domain)| (normalize(name), domain.trim().to_string()))
                .collect(),
        }
    }

    pub fn lookup(&self, manufacturer: &str) -> Option<String> {
        let full = normalize(manufacturer);
        let stripped = normalize_stripped(manufacturer);

        [full, stripped]
            .iter()
            .filter(|key| !key.is_empty())
            .find_map(|key| {
                self.overrides
                    .get(key.as_str())
                    .cloned()
                    .or_else(|| BUILTIN_DOMAINS.get(key.as_str()).map(|d| d.to_string()))
            })
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn normalize_stripped(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == ',' || c == '.')
        .filter(|word| !NOISE_WORDS.contains(&word.to_ascii_lowercase().as_str()))
        .map(normalize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup_is_forgiving() {
        let table = DomainTable::new();
        assert_eq!(table.lookup("Qcells").as_deref(), Some("qcells.com"));
        assert_eq!(table.lookup("Hanwha Q CELLS").as_deref(), Some("qcells.com"));
        assert_eq!(table.lookup("REC Solar").as_deref(), Some("recgroup.com"));
        assert_eq!(table.lookup("Enphase Energy, Inc.").as_deref(), Some("enphase.com"));
        assert_eq!(table.lookup("Sol-Ark").as_deref(), Some("sol-ark.com"));
        assert_eq!(table.lookup("Acme Widgets"), None);
        assert_eq!(table.lookup(""), None);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = HashMap::from([
            ("Acme Widgets".to_string(), "acme.example".to_string()),
            ("Qcells".to_string(), "qcells.example".to_string()),
        ]);
        let table = DomainTable::with_overrides(&overrides);
        assert_eq!(table.lookup("ACME widgets").as_deref(), Some("acme.example"));
        assert_eq!(table.lookup("Qcells").as_deref(), Some("qcells.example"));
        assert_eq!(table.lookup("IronRidge").as_deref(), Some("ironridge.com"));
    }
}
