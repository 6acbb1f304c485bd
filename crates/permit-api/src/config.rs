//! Service configuration: optional YAML file, then environment overrides
use permit_evidence::{ResolverConfig, MAX_DOCUMENT_BYTES, MAX_RESULTS_PER_QUERY};
use permit_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CONFIG/READ {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("CONFIG/PARSE: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("CONFIG/INVALID: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub design_platform: PlatformConfig,
    #[serde(default)]
    pub search: ApiConfig,
    #[serde(default)]
    pub reasoning: ReasoningConfig,
    #[serde(default)]
    pub resolver: ResolverSettings,
    #[serde(default)]
    pub scorer: ScorerSettings,
    /// Replaces the embedded document templates
    #[serde(default)]
    pub templates_path: Option<String>,
    #[serde(default)]
    pub log_json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            enable_cors: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Filesystem blob root; blobs stay in memory when unset
    #[serde(default)]
    pub blob_dir: Option<String>,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            blob_dir: None,
            public_base_url: default_public_base_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default = "default_call_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            org_id: None,
            timeout_secs: default_call_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            model: default_model(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverSettings {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_results_per_query")]
    pub results_per_query: u8,
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default = "default_inter_request_delay_ms")]
    pub inter_request_delay_ms: u64,
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,
    #[serde(default)]
    pub manufacturer_domains: HashMap<String, String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            results_per_query: default_results_per_query(),
            call_timeout_secs: default_call_timeout_secs(),
            inter_request_delay_ms: default_inter_request_delay_ms(),
            max_document_bytes: default_max_document_bytes(),
            manufacturer_domains: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerSettings {
    #[serde(default = "default_scorer_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for ScorerSettings {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_scorer_timeout_secs(),
        }
    }
}

fn default_addr() -> String {
    "0.0.0.0:8787".to_string()
}

fn default_true() -> bool {
    true
}

fn default_public_base_url() -> String {
    "http://localhost:8787/files".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_concurrency() -> usize {
    3
}

fn default_results_per_query() -> u8 {
    MAX_RESULTS_PER_QUERY
}

fn default_call_timeout_secs() -> u64 {
    20
}

fn default_inter_request_delay_ms() -> u64 {
    500
}

fn default_max_document_bytes() -> u64 {
    MAX_DOCUMENT_BYTES
}

fn default_scorer_timeout_secs() -> u64 {
    30
}

impl ServiceConfig {
    /// Defaults, then the YAML file at `path` if given, then the environment.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_string(),
                    source,
                })?;
                Self::from_yaml(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Overlay environment variables. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("PERMIT_ADDR") {
            self.server.addr = v;
        }
        if let Some(v) = get("PERMIT_BLOB_DIR") {
            self.storage.blob_dir = Some(v);
        }
        if let Some(v) = get("PERMIT_PUBLIC_BASE_URL") {
            self.storage.public_base_url = v;
        }
        if let Some(v) = get("PERMIT_LOG_JSON") {
            self.log_json = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Some(v) = get("DESIGN_PLATFORM_URL") {
            self.design_platform.url = Some(v);
        }
        if let Some(v) = get("DESIGN_PLATFORM_TOKEN") {
            self.design_platform.token = Some(v);
        }
        if let Some(v) = get("DESIGN_PLATFORM_ORG") {
            self.design_platform.org_id = Some(v);
        }
        if let Some(v) = get("SEARCH_API_URL") {
            self.search.url = Some(v);
        }
        if let Some(v) = get("SEARCH_API_KEY") {
            self.search.api_key = Some(v);
        }
        if let Some(v) = get("REASONING_API_URL") {
            self.reasoning.url = Some(v);
        }
        if let Some(v) = get("REASONING_API_KEY") {
            self.reasoning.api_key = Some(v);
        }
        if let Some(v) = get("REASONING_MODEL") {
            self.reasoning.model = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.concurrency == 0 {
            return Err(ConfigError::Invalid("resolver.concurrency must be at least 1".to_string()));
        }
        if self.resolver.results_per_query == 0 {
            return Err(ConfigError::Invalid(
                "resolver.results_per_query must be at least 1".to_string(),
            ));
        }
        if self.resolver.max_document_bytes == 0 {
            return Err(ConfigError::Invalid(
                "resolver.max_document_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Pipeline settings. Result count and document size only go down from
    /// their fixed maximums.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let call_timeout = Duration::from_secs(self.resolver.call_timeout_secs);
        PipelineConfig {
            ingest_timeout: Duration::from_secs(self.design_platform.timeout_secs),
            scorer_timeout: Duration::from_secs(self.scorer.call_timeout_secs),
            layout_timeout: Duration::from_secs(self.design_platform.timeout_secs),
            resolver: ResolverConfig {
                concurrency: self.resolver.concurrency.max(1),
                results_per_query: self.resolver.results_per_query.min(MAX_RESULTS_PER_QUERY),
                call_timeout,
                inter_request_delay: Duration::from_millis(self.resolver.inter_request_delay_ms),
                max_document_bytes: self.resolver.max_document_bytes.min(MAX_DOCUMENT_BYTES),
            },
            manufacturer_domains: self.resolver.manufacturer_domains.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = ServiceConfig::from_yaml("").unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:8787");
        assert_eq!(config.resolver.concurrency, 3);
        assert_eq!(config.resolver.max_document_bytes, 10 * 1024 * 1024);
        assert_eq!(config.scorer.call_timeout_secs, 30);
    }

    #[test]
    fn test_yaml_then_env() {
        let mut config = ServiceConfig::from_yaml(
            r#"
server:
  addr: "127.0.0.1:9000"
reasoning:
  model: "gpt-4o"
resolver:
  concurrency: 5
  manufacturer_domains:
    Acme Solar: acmesolar.example
"#,
        )
        .unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert!(config.server.enable_cors);
        assert_eq!(config.resolver.results_per_query, 5);

        let env: HashMap<&str, &str> = [
            ("PERMIT_ADDR", "0.0.0.0:1234"),
            ("REASONING_MODEL", "o3-mini"),
            ("SEARCH_API_KEY", "exa-key"),
            ("DESIGN_PLATFORM_TOKEN", "  "),
        ]
        .into_iter()
        .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.addr, "0.0.0.0:1234");
        assert_eq!(config.reasoning.model, "o3-mini");
        assert_eq!(config.search.api_key.as_deref(), Some("exa-key"));
        assert_eq!(config.design_platform.token, None);

        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.resolver.concurrency, 5);
        assert_eq!(
            pipeline.manufacturer_domains.get("Acme Solar").map(String::as_str),
            Some("acmesolar.example")
        );
    }

    #[test]
    fn test_limits_never_exceed_maximums() {
        let mut config = ServiceConfig::default();
        config.resolver.results_per_query = 50;
        config.resolver.max_document_bytes = 1 << 40;

        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.resolver.results_per_query, 5);
        assert_eq!(pipeline.resolver.max_document_bytes, MAX_DOCUMENT_BYTES);
    }

    #[test]
    fn test_zero_concurrency_is_invalid() {
        let mut config = ServiceConfig::default();
        config.resolver.concurrency = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
