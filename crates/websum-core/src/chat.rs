//! Ollama `/api/chat` client, non-streaming.
//!
//! Both the answer and the title go through [`OllamaClient::complete`]; they
//! differ only in prompts and [`ChatOptions`].

use crate::config::{GenerationConfig, WebsumConfig};
use crate::http::{self, HttpError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a chat completion produced no reply.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Connection refused, timeout, non-2xx status, ...
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: HttpError,
    },
    /// Body was not JSON.
    #[error("invalid JSON from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// JSON did not contain `message.content`.
    #[error("response from {endpoint} has no message.content")]
    MissingContent { endpoint: String },
    #[error("could not encode chat request: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Sampling options for one request (`options` in the Ollama body).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChatOptions {
    pub num_predict: u32,
    pub temperature: f32,
}

impl From<GenerationConfig> for ChatOptions {
    fn from(g: GenerationConfig) -> Self {
        Self {
            num_predict: g.num_predict,
            temperature: g.temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: ChatOptions,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Blocking client for one Ollama server and model.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    endpoint: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        Self {
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model: model.into(),
        }
    }

    pub fn from_config(cfg: &WebsumConfig) -> Self {
        Self::new(&cfg.ollama_url, cfg.ollama_model.clone())
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the request body for a system + user exchange.
    pub fn request(&self, system: &str, user: &str, options: ChatOptions) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            stream: false,
            options,
        }
    }

    /// One non-streaming completion; returns `message.content` verbatim.
    pub fn complete(
        &self,
        system: &str,
        user: &str,
        options: ChatOptions,
    ) -> Result<String, ChatError> {
        let body =
            serde_json::to_vec(&self.request(system, user, options)).map_err(ChatError::Encode)?;
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            prompt_bytes = user.len(),
            num_predict = options.num_predict,
            temperature = options.temperature,
            "sending chat request"
        );

        let response =
            http::post_json(&self.endpoint, &body).map_err(|source| ChatError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;
        self.parse_reply(&response.body)
    }

    fn parse_reply(&self, body: &[u8]) -> Result<String, ChatError> {
        let parsed: ChatResponse =
            serde_json::from_slice(body).map_err(|source| ChatError::Decode {
                endpoint: self.endpoint.clone(),
                source,
            })?;
        parsed
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| ChatError::MissingContent {
                endpoint: self.endpoint.clone(),
            })
    }
}
