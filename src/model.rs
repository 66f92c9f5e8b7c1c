//! # LLM Client Module
//!
//! Wraps the text-generation models used for link classification and profile
//! synthesis, with rate limiting so a batch of companies cannot exhaust the
//! provider quota.
//!
//! ## Key Components
//!
//! - `Client`: owns one completion model and builds agents from it
//! - `RateLimitedCompletionModel`: adds a request quota to any completion model
//! - `MockCompletionModel`: scripted model for tests
//!
//! Credentials are passed in explicitly; the `*_from_env` constructors only
//! read the variable and hand it on.

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use ratelimited_completion::RateLimitedCompletionModel;
use rig::{
    agent::{Agent, AgentBuilder},
    completion::CompletionModel,
    providers::{gemini, openai},
};

use crate::error::Error;

pub mod mock_model;
pub mod ratelimited_completion;

/// Default OpenAI model, small and cheap enough for per-company batch work
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default request quota per minute
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 500;

#[derive(Debug, Clone)]
pub struct Client<C>
where
    C: CompletionModel,
{
    completion_model: C,
}

impl Client<RateLimitedCompletionModel<openai::CompletionModel>> {
    pub fn new_openai(api_key: &str, model: &str, requests_per_minute: u32) -> Self {
        let openai_client = openai::Client::new(api_key);
        Self::new(RateLimitedCompletionModel::new(
            openai_client.completion_model(model),
            quota_limiter(requests_per_minute),
        ))
    }

    pub fn new_openai_from_env(model: &str) -> Result<Self, Error> {
        let api_key = read_key("OPENAI_API_KEY")?;
        Ok(Self::new_openai(&api_key, model, DEFAULT_REQUESTS_PER_MINUTE))
    }
}

impl Client<RateLimitedCompletionModel<gemini::completion::CompletionModel>> {
    pub fn new_gemini(api_key: &str, model: &str, requests_per_minute: u32) -> Self {
        let gemini_client = gemini::Client::new(api_key);
        Self::new(RateLimitedCompletionModel::new(
            gemini_client.completion_model(model),
            quota_limiter(requests_per_minute),
        ))
    }

    pub fn new_gemini_from_env(model: &str) -> Result<Self, Error> {
        let api_key = read_key("GEMINI_API_KEY")?;
        Ok(Self::new_gemini(&api_key, model, DEFAULT_REQUESTS_PER_MINUTE))
    }
}

impl<C> Client<C>
where
    C: CompletionModel,
{
    /// Wrap an already configured completion model
    pub fn new(completion_model: C) -> Self {
        Self { completion_model }
    }

    pub fn completion(&self) -> &C {
        &self.completion_model
    }

    /// Build a deterministic agent with the given instructions
    pub fn agent(&self, preamble: &str) -> Agent<C> {
        AgentBuilder::new(self.completion_model.clone())
            .preamble(preamble)
            .temperature(0.0)
            .build()
    }
}

fn quota_limiter(requests_per_minute: u32) -> governor::DefaultDirectRateLimiter {
    let per_minute = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
    RateLimiter::direct(Quota::per_minute(per_minute))
}

fn read_key(name: &str) -> Result<String, Error> {
    std::env::var(name)
        .map_err(|_| Error::Other(format!("{} environment variable must be set", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_model::MockCompletionModel;

    #[test]
    fn test_client_wraps_model() {
        let client = Client::new(MockCompletionModel::new());

        assert_eq!(client.completion().calls(), 0);
    }

    #[test]
    fn test_zero_quota_falls_back_to_one() {
        let limiter = quota_limiter(0);

        assert!(limiter.check().is_ok());
    }
}
