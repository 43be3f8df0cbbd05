//! Scripted provider for offline use and deterministic tests
//!
//! Replies are taken from a shared queue in order; when the queue is empty a
//! session answers with an echo that also reports how many messages it has
//! seen, which makes provider-side context visible to tests.
//!
//! ```
//! use multibot::{ChatProvider, MockProvider, ProviderError};
//!
//! # async fn example() -> Result<(), ProviderError> {
//! let provider = MockProvider::new()
//!     .with_reply("Hi there")
//!     .with_failure(ProviderError::Network("connection reset".into()));
//!
//! let mut session = provider.create_session("test-model").await?;
//! assert_eq!(session.send("Hello").await?, "Hi there");
//! assert!(session.send("ping").await.is_err());
//! assert_eq!(provider.stats().messages_sent(), 2);
//! # Ok(())
//! # }
//! ```

use crate::error::ProviderError;
use crate::llm::image::ImageInput;
use crate::llm::{ChatProvider, ChatSession, TextGenerator};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// What the mock has been asked to do so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockStats {
    /// Models requested through `create_session`, including refused ones
    pub session_requests: Vec<String>,
    /// Messages received by each created session, indexed by creation order
    pub session_messages: Vec<Vec<String>>,
    /// Prompts received by `complete_text` and `analyze_image`
    pub prompts: Vec<String>,
}

impl MockStats {
    pub fn sessions_created(&self) -> usize {
        self.session_messages.len()
    }

    pub fn messages_sent(&self) -> usize {
        self.session_messages.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Default)]
struct MockState {
    replies: VecDeque<Result<String, ProviderError>>,
    session_failure: Option<ProviderError>,
    stats: MockStats,
}

/// In-memory provider returning scripted replies
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push_reply(Ok(reply.into()));
        self
    }

    /// Queue a failed turn
    pub fn with_failure(self, error: ProviderError) -> Self {
        self.push_reply(Err(error));
        self
    }

    /// Refuse every `create_session` call with `error` until cleared
    pub fn with_session_failure(self, error: ProviderError) -> Self {
        self.set_session_failure(Some(error));
        self
    }

    pub fn push_reply(&self, reply: Result<String, ProviderError>) {
        self.lock().replies.push_back(reply);
    }

    pub fn set_session_failure(&self, error: Option<ProviderError>) {
        self.lock().session_failure = error;
    }

    /// Snapshot of the calls made so far
    pub fn stats(&self) -> MockStats {
        self.lock().stats.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panic while holding the lock can only come from a failing test
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_reply(&self) -> Option<Result<String, ProviderError>> {
        self.lock().replies.pop_front()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn create_session(&self, model: &str) -> Result<Box<dyn ChatSession>, ProviderError> {
        let mut state = self.lock();
        state.stats.session_requests.push(model.to_string());

        if let Some(error) = state.session_failure.clone() {
            return Err(error);
        }

        state.stats.session_messages.push(Vec::new());
        let index = state.stats.session_messages.len() - 1;
        drop(state);

        Ok(Box::new(MockSession {
            provider: self.clone(),
            index,
        }))
    }
}

#[async_trait]
impl TextGenerator for MockProvider {
    async fn complete_text(&self, prompt: &str) -> Result<String, ProviderError> {
        self.lock().stats.prompts.push(prompt.to_string());
        self.next_reply()
            .unwrap_or_else(|| Ok(format!("echo: {}", prompt)))
    }

    async fn analyze_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, ProviderError> {
        self.lock().stats.prompts.push(prompt.to_string());
        self.next_reply().unwrap_or_else(|| {
            Ok(format!(
                "echo: {} [{} bytes of {}]",
                prompt,
                image.len(),
                image.mime_type()
            ))
        })
    }
}

/// Session handed out by [`MockProvider`]
struct MockSession {
    provider: MockProvider,
    index: usize,
}

#[async_trait]
impl ChatSession for MockSession {
    async fn send(&mut self, text: &str) -> Result<String, ProviderError> {
        let seen = {
            let mut state = self.provider.lock();
            let messages = &mut state.stats.session_messages[self.index];
            messages.push(text.to_string());
            messages.len()
        };

        self.provider
            .next_reply()
            .unwrap_or_else(|| Ok(format!("echo #{}: {}", seen, text)))
    }
}
