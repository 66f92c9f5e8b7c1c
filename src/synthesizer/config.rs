//! Configuration for the profile synthesizer

use std::time::Duration;

/// Default output language for profiles
pub const DEFAULT_LANGUAGE: &str = "Polish";

/// Configuration for the LLM-backed synthesizer
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    /// Language every profile is written in, whatever the source pages use
    pub language: String,

    /// Timeout for one synthesis call in seconds
    pub timeout_secs: u64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: 120,
        }
    }
}

/// Builder for SynthesizerConfig
#[derive(Debug, Default)]
pub struct SynthesizerConfigBuilder {
    config: SynthesizerConfig,
}

impl SynthesizerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SynthesizerConfig::default(),
        }
    }

    pub fn language(mut self, language: &str) -> Self {
        self.config.language = language.to_string();
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    pub fn build(self) -> SynthesizerConfig {
        self.config
    }
}

impl SynthesizerConfig {
    pub fn builder() -> SynthesizerConfigBuilder {
        SynthesizerConfigBuilder::new()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
