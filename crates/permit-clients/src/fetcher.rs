//! Bounded HTTP downloads for candidate datasheets
use crate::http::{build_client, check_status, transport};
use async_trait::async_trait;
use permit_core::{DocumentFetcher, FetchedDocument, ServiceResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

const SERVICE: &str = "document host";

/// Follows redirects and stops reading once the body passes `max_bytes`.
pub struct HttpDocumentFetcher {
    client: Client,
}

impl HttpDocumentFetcher {
    pub fn new(timeout: Duration) -> ServiceResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str, max_bytes: u64) -> ServiceResult<FetchedDocument> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let mut response = check_status(SERVICE, response).await?;

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if response.content_length().map_or(false, |len| len > max_bytes) {
            tracing::debug!(url, declared = response.content_length(), max_bytes, "declared size over limit");
            return Ok(FetchedDocument {
                url: final_url,
                content_type,
                bytes: Vec::new(),
                exceeded_limit: true,
            });
        }

        let mut bytes = Vec::new();
        let mut exceeded_limit = false;
        while let Some(chunk) = response.chunk().await.map_err(|e| transport(SERVICE, e))? {
            let room = (max_bytes + 1).saturating_sub(bytes.len() as u64) as usize;
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if bytes.len() as u64 > max_bytes {
                exceeded_limit = true;
                break;
            }
        }

        Ok(FetchedDocument {
            url: final_url,
            content_type,
            bytes,
            exceeded_limit,
        })
    }
}
