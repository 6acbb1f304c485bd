//! Raw design-platform records, loosely typed. Nothing here may
//! leave the ingestion boundary.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A module, inverter, or other BOM line as the platform returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamPart {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "manufacturer")]
    pub manufacturer_name: Option<String>,
    /// Number, numeric string, garbage, or absent
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamSystem {
    pub id: String,
    #[serde(default)]
    pub kw_stc: Option<f64>,
    #[serde(default)]
    pub modules: Vec<UpstreamPart>,
    #[serde(default)]
    pub inverters: Vec<UpstreamPart>,
    #[serde(default)]
    pub others: Vec<UpstreamPart>,
    #[serde(default)]
    pub mounting_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamProject {
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub roof_type: Option<String>,
    #[serde(default)]
    pub utility: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
}
