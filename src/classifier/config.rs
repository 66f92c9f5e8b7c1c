//! Configuration for the relevance classifier

use std::time::Duration;

/// Default cap on YES labels per company
pub const DEFAULT_MAX_YES: usize = 3;

/// Configuration for the LLM-backed classifier
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Timeout for one classification call in seconds
    pub timeout_secs: u64,

    /// Kinds of pages to prefer, in priority order
    pub prefer: Vec<String>,

    /// Kinds of pages to avoid
    pub avoid: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            prefer: ["about us", "products", "services", "contact"]
                .into_iter()
                .map(String::from)
                .collect(),
            avoid: ["blogs", "articles", "publications", "news"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Builder for ClassifierConfig
#[derive(Debug, Default)]
pub struct ClassifierConfigBuilder {
    config: ClassifierConfig,
}

impl ClassifierConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    pub fn prefer(mut self, prefer: Vec<String>) -> Self {
        self.config.prefer = prefer;
        self
    }

    pub fn avoid(mut self, avoid: Vec<String>) -> Self {
        self.config.avoid = avoid;
        self
    }

    pub fn build(self) -> ClassifierConfig {
        self.config
    }
}

impl ClassifierConfig {
    pub fn builder() -> ClassifierConfigBuilder {
        ClassifierConfigBuilder::new()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
