//! Configuration for the profiling pipeline

use std::time::Duration;

use crate::classifier::DEFAULT_MAX_YES;
use crate::links::LinkFilterConfig;
use crate::normalizer::NoiseFilters;

/// Configuration for one pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Rules for discarding homepage links before classification
    pub link_filter: LinkFilterConfig,

    /// Maximum number of links the classifier may mark YES
    pub max_yes: usize,

    /// Maximum number of relevant pages fetched at once
    pub fetch_concurrency: usize,

    /// Per-page fetch timeout in seconds, enforced around any fetcher
    pub fetch_timeout_secs: u64,

    /// CSS selectors whose content is ignored when extracting page text
    pub exclude_selectors: Vec<String>,

    /// Boilerplate predicates for the normalizer
    pub noise_filters: NoiseFilters,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            link_filter: LinkFilterConfig::default(),
            max_yes: DEFAULT_MAX_YES,
            fetch_concurrency: 3,
            fetch_timeout_secs: 30,
            exclude_selectors: Vec::new(),
            noise_filters: NoiseFilters::default(),
        }
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn link_filter(mut self, link_filter: LinkFilterConfig) -> Self {
        self.config.link_filter = link_filter;
        self
    }

    pub fn max_yes(mut self, max_yes: usize) -> Self {
        self.config.max_yes = max_yes;
        self
    }

    pub fn fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.config.fetch_concurrency = fetch_concurrency.max(1);
        self
    }

    pub fn fetch_timeout_secs(mut self, fetch_timeout_secs: u64) -> Self {
        self.config.fetch_timeout_secs = fetch_timeout_secs;
        self
    }

    pub fn exclude_selectors(mut self, exclude_selectors: Vec<String>) -> Self {
        self.config.exclude_selectors = exclude_selectors;
        self
    }

    pub fn noise_filters(mut self, noise_filters: NoiseFilters) -> Self {
        self.config.noise_filters = noise_filters;
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
