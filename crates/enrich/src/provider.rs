// LLM provider adapters.
//
// Every provider sits behind the same contract: instruction + data strings
// in, raw response text out. Blocking reqwest, no Tokio runtime required.
// Orchestration (fallback order, output validation) lives in client.rs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Token cap for enrichment responses.
const MAX_COMPLETION_TOKENS: u32 = 2048;

/// Transport timeout for provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const OPENAI_API_BASE: &str = "https://api.openai.com";
pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";

/// Error from a single provider call.
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// Network error
    Network(String),
    /// API error response
    Http { status: u16, message: String },
    /// Failed to parse response body
    Parse(String),
    /// Provider returned an unexpected shape (e.g. no choices)
    InvalidResponse(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Network(msg) => write!(f, "Network error: {}", msg),
            ProviderError::Http { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            ProviderError::Parse(msg) => write!(f, "Failed to parse response: {}", msg),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// One external LLM completion endpoint behind a uniform
/// "prompts in, text out" contract.
pub trait Provider {
    fn name(&self) -> &str;

    /// Run one completion. This is a blocking call; use in a background
    /// task. No retries happen here; the caller decides what a failure
    /// means.
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError>;
}

fn http_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

// ============================================================================
// OpenAI (chat completions)
// ============================================================================

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::blocking::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, OPENAI_API_BASE)
    }

    /// Point the adapter at a different host (mock servers in tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            http: http_client(),
        }
    }
}

impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new("system", system_prompt),
                ChatMessage::new("user", user_prompt),
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        body.choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))
    }
}

// ============================================================================
// Anthropic (messages)
// ============================================================================

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

pub struct AnthropicProvider {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::blocking::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, ANTHROPIC_API_BASE)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            http: http_client(),
        }
    }
}

impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        // The messages API takes one combined user message here, instruction
        // first, data second.
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_COMPLETION_TOKENS,
            messages: vec![ChatMessage::new(
                "user",
                &format!("{system_prompt}\n{user_prompt}"),
            )],
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: MessagesResponse = response
            .json()
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        body.content
            .first()
            .map(|block| block.text.clone())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("No content in response".to_string())
            })
    }
}
