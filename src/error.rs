use thiserror::Error;

/// Errors raised by a generative-AI provider or by the client talking to it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// No API key in the config file or the environment
    #[error("GOOGLE_API_KEY not configured")]
    MissingApiKey,

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transport-level failure (connect, timeout, broken body)
    #[error("Request failed: {0}")]
    Network(String),

    /// Non-success HTTP status returned by the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Response decoded but carried no text
    #[error("No content in response")]
    NoContent,

    /// Image attachment could not be used
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

impl ProviderError {
    /// Whether the provider refused our credentials.
    ///
    /// ```
    /// use multibot::ProviderError;
    ///
    /// let err = ProviderError::Api { status: 403, message: "PERMISSION_DENIED".into() };
    /// assert!(err.is_auth_failure());
    /// assert!(ProviderError::MissingApiKey.is_auth_failure());
    /// assert!(!ProviderError::NoContent.is_auth_failure());
    /// ```
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ProviderError::MissingApiKey => true,
            ProviderError::Api { status, message } => {
                matches!(status, 401 | 403) || message.contains("API_KEY_INVALID")
            }
            _ => false,
        }
    }

    /// Whether the provider asked us to slow down.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::Api { status: 429, .. })
    }
}

/// Errors surfaced by [`ConversationController`](crate::ConversationController)
///
/// Each variant is a distinct condition the caller is expected to show to the
/// user; none of them leave the transcript in a partial state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    /// Message was empty or whitespace only; the provider was not contacted
    #[error("Message is empty")]
    EmptyInput,

    /// No chat session is active; start one first
    #[error("No active chat session")]
    NoSession,

    /// A chat session is already active; reset it before starting another
    #[error("A chat session is already active")]
    SessionActive,

    /// The provider refused to open a chat session
    #[error("Failed to create chat session: {0}")]
    SessionCreation(#[source] ProviderError),

    /// A single turn failed; the session is still usable
    #[error("{0}")]
    Provider(#[source] ProviderError),
}

impl ChatError {
    /// True when the error was caught locally, before any provider call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ChatError::EmptyInput | ChatError::NoSession | ChatError::SessionActive
        )
    }

    /// The underlying provider error, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            ChatError::SessionCreation(e) | ChatError::Provider(e) => Some(e),
            _ => None,
        }
    }
}
