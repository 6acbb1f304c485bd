//! Prometheus counters served at `/metrics`
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct PipelineMetrics {
    registry: Registry,
    pub analyses: IntCounter,
    pub rejections: IntCounter,
    pub generations: IntCounter,
    pub generation_failures: IntCounter,
    pub conflicts: IntCounter,
    /// Labelled `resolved` or `unresolved`
    pub specifications: IntCounterVec,
}

impl PipelineMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let analyses = IntCounter::new("permit_analyses_total", "Projects analyzed")?;
        let rejections = IntCounter::new(
            "permit_rejections_total",
            "Projects rejected by the feasibility gate",
        )?;
        let generations = IntCounter::new("permit_generations_total", "Permit packets generated")?;
        let generation_failures = IntCounter::new(
            "permit_generation_failures_total",
            "Generations that ended in failed",
        )?;
        let conflicts = IntCounter::new(
            "permit_conflicts_total",
            "Requests refused because of the project status",
        )?;
        let specifications = IntCounterVec::new(
            Opts::new(
                "permit_specifications_total",
                "Component specifications by resolution outcome",
            ),
            &["outcome"],
        )?;

        registry.register(Box::new(analyses.clone()))?;
        registry.register(Box::new(rejections.clone()))?;
        registry.register(Box::new(generations.clone()))?;
        registry.register(Box::new(generation_failures.clone()))?;
        registry.register(Box::new(conflicts.clone()))?;
        registry.register(Box::new(specifications.clone()))?;

        Ok(Self {
            registry,
            analyses,
            rejections,
            generations,
            generation_failures,
            conflicts,
            specifications,
        })
    }

    pub fn record_specifications(&self, resolved: usize, unresolved: usize) {
        self.specifications
            .with_label_values(&["resolved"])
            .inc_by(resolved as u64);
        self.specifications
            .with_label_values(&["unresolved"])
            .inc_by(unresolved as u64);
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
