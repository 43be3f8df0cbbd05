//! MultiBot: text responses, multi-turn chat and image questions against the
//! Gemini API, from a terminal menu, one-shot commands or a full-screen chat.

pub mod commands;
pub mod config;
pub mod console;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod mode;
pub mod transcript;
pub mod typing;
pub mod ui;

pub use config::Config;
pub use conversation::{ConversationController, ConversationState};
pub use error::{ChatError, ProviderError};
pub use llm::{
    ChatProvider, ChatSession, GeminiClient, ImageInput, MockProvider, MockStats, TextGenerator,
};
pub use transcript::{Transcript, Turn};
pub use typing::TypingEffect;
