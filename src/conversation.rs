//! Chat-session lifecycle and conversation state

use crate::error::ChatError;
use crate::llm::{ChatProvider, ChatSession};
use crate::transcript::{Transcript, Turn, Turns};
use tracing::{info, warn};

/// Whether a chat session is currently open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    NoSession,
    Active,
}

/// Owns one chat session and the transcript of its completed turns.
///
/// The provider keeps the conversation context; the controller only sends the
/// newest message and records `(message, reply)` once the reply is in. A failed
/// turn leaves the transcript untouched and the session open.
pub struct ConversationController<P: ChatProvider> {
    provider: P,
    model: String,
    session: Option<Box<dyn ChatSession>>,
    transcript: Transcript,
    pending_input: String,
}

impl<P: ChatProvider> ConversationController<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            session: None,
            transcript: Transcript::new(),
            pending_input: String::new(),
        }
    }

    /// Open a new provider session with an empty transcript.
    ///
    /// Fails with [`ChatError::SessionActive`] if one is already open; reset it
    /// first.
    pub async fn start_session(&mut self) -> Result<(), ChatError> {
        if self.session.is_some() {
            return Err(ChatError::SessionActive);
        }

        match self.provider.create_session(&self.model).await {
            Ok(session) => {
                self.session = Some(session);
                self.transcript.clear();
                info!(model = %self.model, "chat session started");
                Ok(())
            }
            Err(e) => {
                warn!(model = %self.model, error = %e, "chat session creation failed");
                Err(ChatError::SessionCreation(e))
            }
        }
    }

    /// Send one message in the active session and return the reply.
    ///
    /// The text goes to the provider exactly as given. Only a successful reply
    /// adds a turn to the transcript.
    pub async fn send_message(&mut self, text: &str) -> Result<String, ChatError> {
        let session = self.session.as_mut().ok_or(ChatError::NoSession)?;

        if text.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }

        match session.send(text).await {
            Ok(reply) => {
                self.transcript.push(Turn::new(text, reply.clone()));
                info!(turns = self.transcript.len(), "chat turn completed");
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "chat turn failed");
                Err(ChatError::Provider(e))
            }
        }
    }

    /// Drop the session and the transcript. Safe to call at any time.
    pub fn reset_session(&mut self) {
        if self.session.take().is_some() {
            info!(turns = self.transcript.len(), "chat session reset");
        }
        self.transcript.clear();
    }

    /// Reset, then open a fresh session
    pub async fn restart_session(&mut self) -> Result<(), ChatError> {
        self.reset_session();
        self.start_session().await
    }

    /// Completed turns, oldest first
    pub fn render_transcript(&self) -> Turns<'_> {
        self.transcript.iter()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> ConversationState {
        if self.session.is_some() {
            ConversationState::Active
        } else {
            ConversationState::NoSession
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == ConversationState::Active
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Text waiting to be sent
    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Send the pending input.
    ///
    /// Once the message has gone to the provider the pending input is cleared,
    /// whether the turn succeeded or not. Input rejected locally stays pending.
    pub async fn send_pending(&mut self) -> Result<String, ChatError> {
        let text = self.pending_input.clone();
        let result = self.send_message(&text).await;

        match &result {
            Err(e) if e.is_local() => {}
            _ => self.pending_input.clear(),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::llm::{MockProvider, MockStats};
    use pretty_assertions::assert_eq;

    fn pairs<P: ChatProvider>(controller: &ConversationController<P>) -> Vec<(String, String)> {
        controller
            .render_transcript()
            .map(|turn| (turn.user.clone(), turn.bot.clone()))
            .collect()
    }

    fn pair(user: &str, bot: &str) -> (String, String) {
        (user.to_string(), bot.to_string())
    }

    #[tokio::test]
    async fn hello_scenario() {
        let provider = MockProvider::new().with_reply("Hi there");
        let mut controller = ConversationController::new(provider, "gemini-2.5-flash");

        controller.start_session().await.unwrap();
        assert_eq!(controller.state(), ConversationState::Active);

        let reply = controller.send_message("Hello").await.unwrap();
        assert_eq!(reply, "Hi there");
        assert_eq!(pairs(&controller), vec![pair("Hello", "Hi there")]);
    }

    #[tokio::test]
    async fn whitespace_is_rejected_without_contacting_provider() {
        let provider = MockProvider::new();
        let mut controller = ConversationController::new(provider.clone(), "m");
        controller.start_session().await.unwrap();

        let err = controller.send_message("   ").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyInput));
        assert!(controller.transcript().is_empty());
        assert_eq!(provider.stats().messages_sent(), 0);
    }

    #[tokio::test]
    async fn failed_turn_leaves_transcript_and_session_intact() {
        let provider = MockProvider::new()
            .with_failure(ProviderError::Network("connection reset".into()))
            .with_reply("pong!");
        let mut controller = ConversationController::new(provider, "m");
        controller.start_session().await.unwrap();

        let err = controller.send_message("ping").await.unwrap_err();
        assert!(matches!(err, ChatError::Provider(ProviderError::Network(ref msg)) if msg == "connection reset"));
        assert!(controller.transcript().is_empty());
        assert_eq!(controller.state(), ConversationState::Active);

        assert_eq!(controller.send_message("pong").await.unwrap(), "pong!");
        assert_eq!(pairs(&controller), vec![pair("pong", "pong!")]);
    }

    #[tokio::test]
    async fn send_without_session_never_reaches_provider() {
        let provider = MockProvider::new();
        let mut controller = ConversationController::new(provider.clone(), "m");

        let err = controller.send_message("Hello").await.unwrap_err();
        assert!(matches!(err, ChatError::NoSession));
        assert_eq!(provider.stats(), MockStats::default());
    }

    #[tokio::test]
    async fn session_creation_failure_keeps_no_session() {
        let provider = MockProvider::new().with_session_failure(ProviderError::Api {
            status: 400,
            message: "INVALID_ARGUMENT: API key not valid".into(),
        });
        let mut controller = ConversationController::new(provider, "m");

        let err = controller.start_session().await.unwrap_err();
        assert!(matches!(err, ChatError::SessionCreation(_)));
        assert_eq!(controller.state(), ConversationState::NoSession);
        assert!(matches!(
            controller.send_message("Hello").await,
            Err(ChatError::NoSession)
        ));
    }

    #[tokio::test]
    async fn start_twice_is_refused() {
        let provider = MockProvider::new();
        let mut controller = ConversationController::new(provider.clone(), "m");
        controller.start_session().await.unwrap();

        assert!(matches!(
            controller.start_session().await,
            Err(ChatError::SessionActive)
        ));
        assert_eq!(provider.stats().sessions_created(), 1);
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let mut controller = ConversationController::new(MockProvider::new(), "m");
        controller.reset_session();
        assert_eq!(controller.state(), ConversationState::NoSession);

        controller.start_session().await.unwrap();
        controller.send_message("a").await.unwrap();
        controller.reset_session();
        controller.reset_session();
        assert_eq!(controller.state(), ConversationState::NoSession);
        assert!(controller.transcript().is_empty());
    }

    #[tokio::test]
    async fn restart_gives_independent_session() {
        let provider = MockProvider::new();
        let mut controller = ConversationController::new(provider.clone(), "m");
        controller.start_session().await.unwrap();
        controller.send_message("one").await.unwrap();
        controller.send_message("two").await.unwrap();

        controller.restart_session().await.unwrap();
        assert!(controller.transcript().is_empty());

        // The mock echo counts messages seen by the session it came from
        assert_eq!(controller.send_message("three").await.unwrap(), "echo #1: three");
        let stats = provider.stats();
        assert_eq!(stats.sessions_created(), 2);
        assert_eq!(stats.session_messages[1], vec!["three".to_string()]);
    }

    #[tokio::test]
    async fn text_is_sent_untrimmed() {
        let provider = MockProvider::new();
        let mut controller = ConversationController::new(provider.clone(), "m");
        controller.start_session().await.unwrap();
        controller.send_message("  indented\n").await.unwrap();

        assert_eq!(provider.stats().session_messages[0], vec!["  indented\n".to_string()]);
        assert_eq!(controller.transcript().last().unwrap().user, "  indented\n");
    }

    #[tokio::test]
    async fn pending_input_rules() {
        let provider = MockProvider::new()
            .with_failure(ProviderError::NoContent)
            .with_reply("ok");
        let mut controller = ConversationController::new(provider, "m");

        controller.set_pending_input("Hello");
        assert!(matches!(controller.send_pending().await, Err(ChatError::NoSession)));
        assert_eq!(controller.pending_input(), "Hello");

        controller.start_session().await.unwrap();
        controller.set_pending_input("  ");
        assert!(matches!(controller.send_pending().await, Err(ChatError::EmptyInput)));
        assert_eq!(controller.pending_input(), "  ");

        controller.set_pending_input("ping");
        assert!(matches!(controller.send_pending().await, Err(ChatError::Provider(_))));
        assert_eq!(controller.pending_input(), "");

        controller.set_pending_input("ping");
        assert_eq!(controller.send_pending().await.unwrap(), "ok");
        assert_eq!(controller.pending_input(), "");
        assert_eq!(pairs(&controller), vec![pair("ping", "ok")]);
    }
}
