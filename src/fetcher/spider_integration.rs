//! Integration with the spider crawler for single-page retrieval

use spider::website::Website;
use tracing::{debug, info_span, instrument, Instrument};

use crate::fetcher::error::FetchError;
use crate::fetcher::{FetcherConfig, PageFetcher};

/// Fetches pages through the spider crawler, limited to the requested page
///
/// With the crate's `chrome` feature enabled, spider loads each page in
/// headless Chrome and this backend returns the DOM after client-side
/// scripts ran. Without it pages are fetched over plain HTTP.
#[derive(Debug, Clone, Default)]
pub struct SpiderPageFetcher {
    config: FetcherConfig,
}

impl SpiderPageFetcher {
    /// Create a new fetcher with the given configuration
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Whether fetched pages are rendered in a browser first
    pub const fn renders_javascript() -> bool {
        cfg!(feature = "chrome")
    }
}

impl PageFetcher for SpiderPageFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut website = Website::new(url);
        website
            .configuration
            .with_respect_robots_txt(self.config.respect_robots_txt)
            .with_user_agent(Some(&self.config.user_agent))
            .with_depth(0)
            .with_limit(1);

        let mut rx = website.subscribe(1).ok_or_else(|| FetchError::Crawler {
            url: url.to_string(),
            message: "Failed to subscribe to website".to_string(),
        })?;
        let handle = tokio::spawn(
            async move { rx.recv().await.ok().map(|page| page.get_html()) }
                .instrument(info_span!("receive_page")),
        );

        let crawled = tokio::time::timeout(self.config.timeout(), website.crawl()).await;
        website.unsubscribe();
        if crawled.is_err() {
            handle.abort();
            return Err(FetchError::Timeout {
                url: url.to_string(),
            });
        }

        let html = handle
            .await
            .map_err(|e| FetchError::Crawler {
                url: url.to_string(),
                message: format!("Task join error: {}", e),
            })?
            .ok_or_else(|| FetchError::EmptyBody {
                url: url.to_string(),
            })?;

        if html.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }
        if html.len() > self.config.max_body_bytes {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                size: html.len(),
                limit: self.config.max_body_bytes,
            });
        }

        debug!("Crawled {} bytes from {}", html.len(), url);
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering_follows_chrome_feature() {
        assert_eq!(SpiderPageFetcher::renders_javascript(), cfg!(feature = "chrome"));
    }
}
