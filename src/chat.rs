//! Client for OpenAI-compatible chat completion endpoints.
//!
//! Requests are blocking and are expected to run on a worker thread; see
//! [`spawn_completion`] for the UI-facing entry point.

use crate::settings::ChatSettings;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const PROBE_MESSAGE: &str = "Hello! This is a test message. Please respond with: OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("no base URL configured")]
    MissingBaseUrl,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response: {0}")]
    MalformedResponse(String),
}

pub struct ChatClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ChatClient {
    pub fn from_settings(settings: &ChatSettings) -> Result<Self, ChatError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ChatError::MissingApiKey)?;
        let base_url = settings.base_url.trim();
        if base_url.is_empty() {
            return Err(ChatError::MissingBaseUrl);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("okr-dashboard")
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: settings.model.trim().to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub fn model(&self) -> &str {
        if self.model.is_empty() {
            crate::settings::DEFAULT_MODEL
        } else {
            &self.model
        }
    }

    /// Send the conversation and return the assistant reply.
    pub fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        self.send(&completion_body(self.model(), messages))
    }

    /// Send a short fixed prompt to check the key, URL and model.
    pub fn test_connection(&self) -> Result<(), ChatError> {
        self.send(&probe_body(self.model())).map(|_| ())
    }

    fn send(&self, body: &Value) -> Result<String, ChatError> {
        tracing::debug!(endpoint = %self.endpoint(), model = self.model(), "sending chat completion");
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()?;
        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }
        parse_completion(&text)
    }
}

pub fn completion_body(model: &str, messages: &[ChatMessage]) -> Value {
    json!({ "model": model, "messages": messages })
}

pub fn probe_body(model: &str) -> Value {
    json!({
        "model": model,
        "messages": [ChatMessage::user(PROBE_MESSAGE)],
        "max_tokens": 10,
        "temperature": 0,
    })
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Extract `choices[0].message.content` from a response body.
pub fn parse_completion(body: &str) -> Result<String, ChatError> {
    let resp: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ChatError::MalformedResponse("missing choices[0].message.content".into()))
}

/// Build an error from a non-success response, preferring `error.message`.
pub fn api_error(status: u16, body: &str) -> ChatError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "connection to the chat API failed".to_string());
    ChatError::Api { status, message }
}

/// Messages sent for a new user turn: system prompt, history, then the input.
pub fn build_conversation(
    system_prompt: Option<&str>,
    history: &[ChatMessage],
    input: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    if let Some(prompt) = system_prompt.filter(|p| !p.trim().is_empty()) {
        messages.push(ChatMessage::system(prompt));
    }
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(input));
    messages
}

/// Handle to a request running on a worker thread.
///
/// The result slot is filled once; [`PendingRequest::poll`] takes it.
#[derive(Clone, Default)]
pub struct PendingRequest {
    slot: Arc<Mutex<Option<Result<String, String>>>>,
}

impl PendingRequest {
    pub fn poll(&self) -> Option<Result<String, String>> {
        self.slot.lock().ok().and_then(|mut lock| lock.take())
    }

    fn fill(&self, result: Result<String, ChatError>) {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "chat request failed");
        }
        if let Ok(mut lock) = self.slot.lock() {
            *lock = Some(result.map_err(|e| e.to_string()));
        }
    }

    #[cfg(test)]
    pub(crate) fn ready(result: Result<String, String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(result))),
        }
    }
}

pub fn spawn_completion(settings: ChatSettings, messages: Vec<ChatMessage>) -> PendingRequest {
    let pending = PendingRequest::default();
    let handle = pending.clone();
    thread::spawn(move || {
        let result = ChatClient::from_settings(&settings).and_then(|c| c.complete(&messages));
        handle.fill(result);
    });
    pending
}

pub fn spawn_connection_test(settings: ChatSettings) -> PendingRequest {
    let pending = PendingRequest::default();
    let handle = pending.clone();
    thread::spawn(move || {
        let result = ChatClient::from_settings(&settings)
            .and_then(|c| c.test_connection())
            .map(|_| "OK".to_string());
        handle.fill(result);
    });
    pending
}
