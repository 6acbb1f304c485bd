//! Design platform REST client
//!
//! Routes, relative to the configured base URL:
//! - `GET orgs/{org}/projects/{id}`: project record
//! - `GET orgs/{org}/projects/{id}/systems`: systems with BOM lines
//! - `GET orgs/{org}/systems/{system_id}/image`: rendered site layout

use crate::http::{build_client, check_status, transport, Endpoint};
use async_trait::async_trait;
use permit_core::{
    DesignPlatform, FetchedDocument, ServiceError, ServiceResult, UpstreamProject, UpstreamSystem,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

const SERVICE: &str = "design platform";

pub struct DesignPlatformClient {
    client: Client,
    endpoint: Endpoint,
    org_id: String,
}

impl DesignPlatformClient {
    pub fn new(endpoint: Endpoint, org_id: impl Into<String>) -> ServiceResult<Self> {
        Ok(Self {
            client: build_client(endpoint.timeout)?,
            endpoint,
            org_id: org_id.into(),
        })
    }

    fn route(&self, path: &str) -> String {
        self.endpoint.url(&format!("orgs/{}/{}", self.org_id, path))
    }

    async fn get_json(&self, path: &str) -> ServiceResult<Value> {
        let token = self.endpoint.require_key(SERVICE)?;
        let response = self
            .client
            .get(self.route(path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        check_status(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| transport(SERVICE, e))
    }
}

#[async_trait]
impl DesignPlatform for DesignPlatformClient {
    async fn fetch_project(&self, external_id: &str) -> ServiceResult<UpstreamProject> {
        let mut value = self.get_json(&format!("projects/{}", external_id)).await?;
        stringify_id(&mut value);
        decode(value)
    }

    async fn fetch_systems(&self, external_id: &str) -> ServiceResult<Vec<UpstreamSystem>> {
        let value = self
            .get_json(&format!("projects/{}/systems", external_id))
            .await?;
        let mut systems = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("systems") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => return Err(ServiceError::Decode("systems response is not a list".to_string())),
        };
        for system in &mut systems {
            stringify_id(system);
        }
        decode(Value::Array(systems))
    }

    async fn fetch_site_layout(&self, system_id: &str) -> ServiceResult<FetchedDocument> {
        let token = self.endpoint.require_key(SERVICE)?;
        let response = self
            .client
            .get(self.route(&format!("systems/{}/image", system_id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let response = check_status(SERVICE, response).await?;
        let url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| transport(SERVICE, e))?;

        Ok(FetchedDocument {
            url,
            content_type,
            bytes: bytes.to_vec(),
            exceeded_limit: false,
        })
    }
}

/// Platform ids arrive as numbers or strings; the canonical model wants strings.
fn stringify_id(value: &mut Value) {
    if let Some(Value::Number(n)) = value.get("id") {
        let id = n.to_string();
        value["id"] = Value::String(id);
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> ServiceResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ServiceError::Decode(format!("invalid {} record: {}", SERVICE, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_ids_become_strings() {
        let mut value = json!({ "id": 4412, "address": "12 Elm St" });
        stringify_id(&mut value);
        let project: UpstreamProject = decode(value).unwrap();
        assert_eq!(project.id, "4412");
        assert_eq!(project.address.as_deref(), Some("12 Elm St"));
    }
}
