use anyhow::Result;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::settings::Settings;

/// Returned whenever the dialogue service cannot produce a line.
pub const FALLBACK_REPLY: &str = "Sorry, I can't respond right now.";

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub content: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered {0}")]
    Status(StatusCode),
    #[error("unreadable completion: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("completion had no choices")]
    EmptyChoices,
}

/// Anything that can answer a villager's free-form line. Never fails: callers
/// always get text back.
pub trait Responder: Send {
    fn respond(&self, utterance: &str, character_context: &str) -> String;
}

/// Chat-completions client for an OpenAI-compatible local server.
pub struct DialogueGateway {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl DialogueGateway {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn build_request(&self, utterance: &str, character_context: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: character_context.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: utterance.into(),
                },
            ],
        }
    }

    pub fn request_completion(
        &self,
        utterance: &str,
        character_context: &str,
    ) -> Result<String, GatewayError> {
        let req = self.build_request(utterance, character_context);

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&req)
            .send()?;

        if resp.status() != StatusCode::OK {
            return Err(GatewayError::Status(resp.status()));
        }

        let body = resp.text()?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or(GatewayError::EmptyChoices)
    }

    /// Lists the models the server offers. Used once at startup for logging.
    pub fn test_connection(&self) -> Result<String> {
        let resp: serde_json::Value = self
            .client
            .get(format!("{}/v1/models", self.base_url))
            .send()?
            .error_for_status()?
            .json()?;

        Ok(format!(
            "Connected ({} models available)",
            resp["data"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

/// Stand-in used when no HTTP client could be built; always answers with the fallback.
pub struct OfflineResponder;

impl Responder for OfflineResponder {
    fn respond(&self, _utterance: &str, _character_context: &str) -> String {
        FALLBACK_REPLY.to_string()
    }
}

impl Responder for DialogueGateway {
    fn respond(&self, utterance: &str, character_context: &str) -> String {
        match self.request_completion(utterance, character_context) {
            Ok(text) => {
                debug!(chars = text.len(), "completion received");
                text
            }
            Err(err) => {
                warn!(error = %err, "dialogue service unavailable; using fallback");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
