//! Pipeline timeouts and resolver tuning
use permit_evidence::ResolverConfig;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Per call to the design platform during ingestion
    pub ingest_timeout: Duration,
    /// Per reasoning call made by the scorer
    pub scorer_timeout: Duration,
    /// Site layout download during assembly
    pub layout_timeout: Duration,
    pub resolver: ResolverConfig,
    /// Manufacturer name to domain, checked before the built-in table
    pub manufacturer_domains: HashMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ingest_timeout: Duration::from_secs(20),
            scorer_timeout: Duration::from_secs(30),
            layout_timeout: Duration::from_secs(20),
            resolver: ResolverConfig::default(),
            manufacturer_domains: HashMap::new(),
        }
    }
}
