use crate::config::Config;
use crate::error::ProviderError;
use crate::llm::image::ImageInput;
use crate::llm::wire::{self, Content, GenerateContentRequest, InlineData, Part};
use crate::llm::{ChatProvider, ChatSession, TextGenerator};
use async_trait::async_trait;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Client for the Gemini REST API
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    text_model: String,
    vision_model: String,
}

// Keeps the API key out of logs and panic messages
impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("text_model", &self.text_model)
            .field("vision_model", &self.vision_model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.get_api_key(),
            text_model: config.text_model.clone(),
            vision_model: config.vision_model.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)
    }

    /// Run one `generateContent` call and return the reply text
    async fn generate(&self, model: &str, contents: &[Content]) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        debug!(model, turns = contents.len(), "generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest { contents })
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            let err = wire::api_error(status.as_u16(), &body);
            warn!(model, error = %err, "Gemini API error");
            return Err(err);
        }

        wire::parse_text_response(&body)
    }

    /// Ask the API about a model; fails on a bad key or an unknown model
    async fn check_model(&self, model: &str) -> Result<(), ProviderError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models/{}", self.base_url, model);

        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(wire::api_error(status.as_u16(), &body))
    }
}

fn require_prompt(prompt: &str) -> Result<(), ProviderError> {
    if prompt.trim().is_empty() {
        return Err(ProviderError::InvalidRequest("Prompt cannot be empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn complete_text(&self, prompt: &str) -> Result<String, ProviderError> {
        require_prompt(prompt)?;
        self.generate(&self.text_model, &[Content::user_text(prompt)])
            .await
    }

    async fn analyze_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, ProviderError> {
        require_prompt(prompt)?;

        let content = Content {
            role: "user",
            parts: vec![
                Part::text(prompt),
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type().to_string(),
                        data: image.to_base64(),
                    },
                },
            ],
        };

        info!(
            model = %self.vision_model,
            mime = image.mime_type(),
            bytes = image.len(),
            "analyzing image"
        );
        self.generate(&self.vision_model, &[content]).await
    }
}

#[async_trait]
impl ChatProvider for GeminiClient {
    async fn create_session(&self, model: &str) -> Result<Box<dyn ChatSession>, ProviderError> {
        self.check_model(model).await?;

        let session = GeminiChatSession {
            id: Uuid::new_v4(),
            client: self.clone(),
            model: model.to_string(),
            history: Vec::new(),
        };
        info!(session = %session.id, model, "chat session created");
        Ok(Box::new(session))
    }
}

/// Chat session backed by `generateContent`.
///
/// The session owns the conversation contents and sends all of them with
/// every turn; a turn is committed to the history only once a reply arrived.
pub struct GeminiChatSession {
    id: Uuid,
    client: GeminiClient,
    model: String,
    history: Vec<Content>,
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send(&mut self, text: &str) -> Result<String, ProviderError> {
        require_prompt(text)?;

        let mut contents = self.history.clone();
        contents.push(Content::user_text(text));

        let reply = self.client.generate(&self.model, &contents).await?;

        contents.push(Content::model_text(&reply));
        self.history = contents;
        debug!(session = %self.id, history = self.history.len(), "turn committed");

        Ok(reply)
    }
}
