//! Provider layer: the capabilities the rest of the crate needs from a
//! generative-AI service, plus the Gemini implementation and a scripted mock.

pub mod gemini;
pub mod image;
pub mod mock;
mod wire;

use crate::error::ProviderError;
use async_trait::async_trait;

pub use gemini::{GeminiChatSession, GeminiClient};
pub use image::ImageInput;
pub use mock::{MockProvider, MockStats};

/// One provider-side multi-turn conversation.
///
/// The provider keeps the conversation context; callers only hand over the
/// next user message and get the reply back.
#[async_trait]
pub trait ChatSession: Send {
    /// Send a message within this conversation and return the full reply
    async fn send(&mut self, text: &str) -> Result<String, ProviderError>;
}

/// Something that can open chat sessions
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn create_session(&self, model: &str) -> Result<Box<dyn ChatSession>, ProviderError>;
}

/// Single-turn generation: plain prompts and prompts about an image
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete_text(&self, prompt: &str) -> Result<String, ProviderError>;

    async fn analyze_image(&self, prompt: &str, image: &ImageInput)
    -> Result<String, ProviderError>;
}

#[async_trait]
impl<'a, P: ChatProvider + ?Sized> ChatProvider for &'a P {
    async fn create_session(&self, model: &str) -> Result<Box<dyn ChatSession>, ProviderError> {
        (**self).create_session(model).await
    }
}

#[async_trait]
impl<'a, G: TextGenerator + ?Sized> TextGenerator for &'a G {
    async fn complete_text(&self, prompt: &str) -> Result<String, ProviderError> {
        (**self).complete_text(prompt).await
    }

    async fn analyze_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, ProviderError> {
        (**self).analyze_image(prompt, image).await
    }
}
