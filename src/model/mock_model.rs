//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that implements the `CompletionModel` trait
//! so the classifier, synthesizer and pipeline can be exercised without an
//! API key. Responses are queued and handed out in order; every call is
//! counted so tests can assert a model was never reached.

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Failure(String),
}

/// A mock completion model for testing purposes.
#[derive(Debug, Clone)]
pub struct MockCompletionModel {
    /// Queued responses, consumed front to back. An empty queue yields empty text.
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl MockCompletionModel {
    /// Creates a new mock model that returns empty text until responses are queued.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// Make every call wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a text response.
    pub async fn push_text(&self, text: &str) {
        self.responses
            .lock()
            .await
            .push_back(Scripted::Text(text.to_string()));
    }

    /// Queue a provider failure.
    pub async fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .await
            .push_back(Scripted::Failure(message.to_string()));
    }

    /// Number of completion requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCompletionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        _completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().await.pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text(&text)),
                raw_response: text,
            }),
            Some(Scripted::Failure(message)) => Err(CompletionError::ProviderError(message)),
            None => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text("")),
                raw_response: "".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig::agent::AgentBuilder;
    use rig::completion::Prompt;

    #[tokio::test]
    async fn test_responses_are_consumed_in_order() {
        let mock = MockCompletionModel::new();
        mock.push_text("first").await;
        mock.push_failure("quota exceeded").await;
        let agent = AgentBuilder::new(mock.clone()).build();

        assert_eq!(agent.prompt("a").await.unwrap(), "first");
        assert!(agent.prompt("b").await.is_err());
        assert_eq!(agent.prompt("c").await.unwrap(), "");
        assert_eq!(mock.calls(), 3);
    }
}
