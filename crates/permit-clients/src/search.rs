//! Keyword web search (Exa-style `POST /search`) as a `SearchService`
use crate::http::{build_client, check_status, transport, Endpoint};
use async_trait::async_trait;
use permit_core::{SearchHit, SearchQuery, SearchService, ServiceResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "search service";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    num_results: u8,
    #[serde(skip_serializing_if = "no_domains")]
    include_domains: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    contents: Option<Contents>,
}

fn no_domains(domains: &&[String]) -> bool {
    domains.is_empty()
}

#[derive(Debug, Serialize)]
struct Contents {
    text: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

pub struct KeywordSearchClient {
    client: Client,
    endpoint: Endpoint,
}

impl KeywordSearchClient {
    pub fn new(endpoint: Endpoint) -> ServiceResult<Self> {
        Ok(Self {
            client: build_client(endpoint.timeout)?,
            endpoint,
        })
    }
}

#[async_trait]
impl SearchService for KeywordSearchClient {
    async fn search(&self, query: &SearchQuery) -> ServiceResult<Vec<SearchHit>> {
        let api_key = self.endpoint.require_key(SERVICE)?;
        let request = SearchRequest {
            query: &query.text,
            kind: "keyword",
            num_results: query.num_results,
            include_domains: &query.include_domains,
            contents: query.include_text.then_some(Contents { text: true }),
        };

        let response = self
            .client
            .post(self.endpoint.url("search"))
            .header("x-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let body: SearchResponse = check_status(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        tracing::debug!(query = %query.text, hits = body.results.len(), "search answered");
        Ok(body
            .results
            .into_iter()
            .take(query.num_results as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let domains = vec!["qcells.com".to_string()];
        let request = SearchRequest {
            query: "Qcells Q.PEAK DUO 400 datasheet pdf",
            kind: "keyword",
            num_results: 5,
            include_domains: &domains,
            contents: Some(Contents { text: true }),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "query": "Qcells Q.PEAK DUO 400 datasheet pdf",
                "type": "keyword",
                "numResults": 5,
                "includeDomains": ["qcells.com"],
                "contents": { "text": true }
            })
        );

        let unscoped = SearchRequest {
            include_domains: &[],
            contents: None,
            ..request
        };
        let value = serde_json::to_value(&unscoped).unwrap();
        assert!(value.get("includeDomains").is_none());
        assert!(value.get("contents").is_none());
    }
}
