//! Permit Clients: HTTP implementations of the outbound service traits
//!
//! | Trait | Client |
//! |-------|--------|
//! | `DesignPlatform` | [`DesignPlatformClient`] |
//! | `SearchService` | [`KeywordSearchClient`] |
//! | `ReasoningService` | [`ChatCompletionsClient`] |
//! | `DocumentFetcher` | [`HttpDocumentFetcher`] |
//!
//! Non-2xx answers become `ServiceError::Http`, client timeouts become
//! `ServiceError::Timeout`, and a missing api key is `NotConfigured`.

pub mod fetcher;
pub mod http;
pub mod platform;
pub mod reasoning;
pub mod search;
pub mod unconfigured;

pub use fetcher::HttpDocumentFetcher;
pub use http::Endpoint;
pub use platform::DesignPlatformClient;
pub use reasoning::ChatCompletionsClient;
pub use search::KeywordSearchClient;
pub use unconfigured::Unconfigured;
