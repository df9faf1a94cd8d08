//! OpenAI adapters - chat dialogue, speech synthesis and transcription.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiConfig::new(api_key)
//!     .with_chat_model("gpt-4o-mini")
//!     .with_voice("nova");
//!
//! let dialogue = OpenAiDialogueClient::new(config.clone());
//! let transcriber = OpenAiTranscriber::new(config);
//! ```

mod dialogue;
mod transcriber;

pub use dialogue::OpenAiDialogueClient;
pub use transcriber::OpenAiTranscriber;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use crate::ports::DialogueError;

/// Used when neither the header nor the body says how long to wait.
pub const DEFAULT_RETRY_AFTER_MS: u64 = 30_000;

/// Configuration shared by the OpenAI adapters.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    api_key: Secret<String>,
    pub chat_model: String,
    pub tts_model: String,
    pub stt_model: String,
    pub voice: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Retries on transient failures. Rate limits are never retried.
    pub max_retries: u32,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            chat_model: "gpt-4o-mini".to_string(),
            tts_model: "tts-1".to_string(),
            stt_model: "whisper-1".to_string(),
            voice: "nova".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            temperature: 0.7,
            max_tokens: 300,
        }
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    pub fn with_tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    pub fn with_stt_model(mut self, model: impl Into<String>) -> Self {
        self.stt_model = model.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key())
    }

    fn http_client(&self) -> Client {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .expect("Failed to create HTTP client")
    }

    fn map_send_error(&self, err: reqwest::Error) -> DialogueError {
        if err.is_timeout() {
            DialogueError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else if err.is_connect() {
            DialogueError::network(format!("Connection failed: {}", err))
        } else {
            DialogueError::network(err.to_string())
        }
    }
}

/// Maps non-success statuses onto the port's error taxonomy.
async fn check_status(response: Response) -> Result<Response, DialogueError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let header_delay = retry_after_header(response.headers());
    let body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => Err(DialogueError::AuthenticationFailed),
        429 => Err(DialogueError::rate_limited(
            header_delay
                .or_else(|| retry_after_from_body(&body))
                .unwrap_or(DEFAULT_RETRY_AFTER_MS),
        )),
        500..=599 => Err(DialogueError::unavailable(format!(
            "Server error {}: {}",
            status, body
        ))),
        _ => Err(DialogueError::network(format!(
            "Unexpected status {}: {}",
            status, body
        ))),
    }
}

/// `Retry-After` in whole seconds.
fn retry_after_header(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .map(|secs| (secs * 1000.0).ceil() as u64)
}

/// Finds "try again in 20s" / "try again in 450ms" in an error message.
fn retry_after_from_body(body: &str) -> Option<u64> {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());

    let idx = message.find("try again in ")?;
    let rest = &message[idx + "try again in ".len()..];
    let num_end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let value: f64 = rest[..num_end].parse().ok()?;
    let unit = &rest[num_end..];

    let ms = if unit.starts_with("ms") {
        value
    } else if unit.starts_with('m') && !unit.starts_with("ms") {
        value * 60_000.0
    } else {
        value * 1000.0
    };
    Some(ms.ceil() as u64)
}

/// Exponential backoff between retries: 500ms, 1s, 2s, ...
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(500u64 << attempt.min(6))
}
