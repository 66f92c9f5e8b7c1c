//! # Page Fetcher Module
//!
//! The boundary to whatever retrieves and renders web pages. The rest of the
//! pipeline only needs "given a URL, return the document HTML", expressed by
//! the `PageFetcher` trait.
//!
//! ## Key Components
//!
//! - `PageFetcher`: the fetch boundary
//! - `HttpPageFetcher`: plain HTTP GET via reqwest
//! - `SpiderPageFetcher`: single-page retrieval through the spider crawler
//! - `extract_text`: converts fetched HTML into page text
//! - `FetcherConfig`: timeouts, user agent, size limit, excluded selectors

mod config;
mod content_extraction;
mod error;
mod http;
mod spider_integration;

pub use config::{FetcherConfig, FetcherConfigBuilder};
pub use content_extraction::extract_text;
pub use error::FetchError;
pub use http::HttpPageFetcher;
pub use spider_integration::SpiderPageFetcher;

use std::future::Future;

/// Retrieves the rendered HTML of a page
pub trait PageFetcher: Send + Sync {
    /// Fetch a single page, failing with a `FetchError` naming the URL
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_config_builder() {
        let config = FetcherConfig::builder()
            .timeout_secs(10)
            .user_agent("test-agent")
            .max_body_bytes(1024)
            .exclude_selectors(vec!["nav".to_string()])
            .build();

        assert_eq!(config.timeout().as_secs(), 10);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.exclude_selectors, vec!["nav"]);
    }

    #[test]
    fn test_fetch_error_url() {
        let err = FetchError::Timeout {
            url: "https://site.com".to_string(),
        };

        assert_eq!(err.url(), "https://site.com");
        assert!(err.is_timeout());
    }
}
