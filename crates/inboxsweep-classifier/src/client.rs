//! Per-email classification against the local chat endpoint

use crate::prompt::{classification_schema, user_prompt, SYSTEM_PROMPT};
use crate::transport::{to_body, ModelTransport};
use async_trait::async_trait;
use inboxsweep_core::types::truncate_chars;
use inboxsweep_core::{parse_classification, Classification, Email, ModelServiceError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Longest excerpt of an unparsable body kept in an error
const BODY_EXCERPT_CHARS: usize = 200;

/// Anything able to classify a single email with a named model
#[async_trait]
pub trait EmailClassifier: Send + Sync {
    /// Classify one email
    ///
    /// Fails only on transport or service problems; malformed model output
    /// still yields a classification.
    async fn classify(&self, email: &Email, model: &str)
        -> Result<Classification, ModelServiceError>;
}

/// Decoding parameters and limits for chat calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatSettings {
    pub temperature: f32,

    /// Maximum number of tokens to generate
    pub num_predict: u32,

    /// Upper bound on one chat call
    pub timeout: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            num_predict: 150,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Chat message in the model service format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// `POST /api/chat` request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub format: serde_json::Value,
    pub options: ChatOptions,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChatOptions {
    pub temperature: f32,
    pub num_predict: u32,
}

/// Fields of a chat reply we care about
#[derive(Debug, Default, Deserialize)]
struct ChatReply {
    #[serde(default)]
    message: Option<ReplyMessage>,

    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Classifier talking to Ollama's chat endpoint
pub struct OllamaClassifier {
    transport: Arc<dyn ModelTransport>,
    settings: ChatSettings,
}

impl OllamaClassifier {
    pub fn new(transport: Arc<dyn ModelTransport>, settings: ChatSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Build the chat request for one email
    pub fn build_request(
        &self,
        email: &Email,
        model: &str,
    ) -> Result<ChatRequest, ModelServiceError> {
        Ok(ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_prompt(email)?),
            ],
            stream: false,
            format: classification_schema(),
            options: ChatOptions {
                temperature: self.settings.temperature,
                num_predict: self.settings.num_predict,
            },
        })
    }
}

#[async_trait]
impl EmailClassifier for OllamaClassifier {
    async fn classify(
        &self,
        email: &Email,
        model: &str,
    ) -> Result<Classification, ModelServiceError> {
        let start = Instant::now();
        let body = to_body(&self.build_request(email, model)?)?;

        let response = self.transport.post_chat(&body, self.settings.timeout).await?;

        if !response.is_success() {
            return Err(ModelServiceError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let content = extract_content(&response.body)?;
        let classification = parse_classification(&content);

        debug!(
            "Classified {} as {} ({:.2}) in {:?}",
            email.id,
            classification.decision,
            classification.confidence,
            start.elapsed()
        );

        Ok(classification)
    }
}

/// Pull the assistant text out of a successful chat body
fn extract_content(body: &str) -> Result<String, ModelServiceError> {
    let reply: ChatReply = serde_json::from_str(body)
        .map_err(|_| ModelServiceError::InvalidBody(truncate_chars(body, BODY_EXCERPT_CHARS)))?;

    match reply.error {
        None | Some(serde_json::Value::Null) => {}
        Some(serde_json::Value::String(msg)) => return Err(ModelServiceError::service(msg)),
        Some(other) => return Err(ModelServiceError::service(other.to_string())),
    }

    Ok(reply
        .message
        .and_then(|m| m.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default())
}
