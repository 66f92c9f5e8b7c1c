//! Plain HTTP page fetcher

use reqwest::header::CONTENT_TYPE;
use reqwest::Client as ReqwestClient;
use tracing::{debug, instrument};
use url::Url;

use crate::fetcher::error::FetchError;
use crate::fetcher::{FetcherConfig, PageFetcher};

/// Fetches pages with a single HTTP GET
///
/// Suitable for server-rendered sites. Sites that build their DOM with
/// client-side scripts need a rendering backend instead.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: ReqwestClient,
    config: FetcherConfig,
}

impl HttpPageFetcher {
    /// Create a new fetcher with the given configuration
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|source| FetchError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self { client, config })
    }

    /// The configuration this fetcher was built with
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }
}

impl PageFetcher for HttpPageFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = self.client.get(parsed).send().await.map_err(|source| {
            if source.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http {
                    url: url.to_string(),
                    source,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !content_type.to_ascii_lowercase().contains("html") {
                return Err(FetchError::NotHtml {
                    url: url.to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        let limit = self.config.max_body_bytes;
        if let Some(size) = response.content_length() {
            if size as usize > limit {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    size: size as usize,
                    limit,
                });
            }
        }

        let body = response.text().await.map_err(|source| {
            if source.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http {
                    url: url.to_string(),
                    source,
                }
            }
        })?;

        if body.len() > limit {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                size: body.len(),
                limit,
            });
        }
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
