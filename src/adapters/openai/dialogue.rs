//! Chat completions and text-to-speech against the OpenAI API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{backoff, check_status, OpenAiConfig};
use crate::domain::conversation::{DialogueMessage, MessageRole};
use crate::domain::language::Language;
use crate::domain::voice::AudioBlob;
use crate::ports::{DialogueClient, DialogueError};

pub struct OpenAiDialogueClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiDialogueClient {
    pub fn new(config: OpenAiConfig) -> Self {
        let client = config.http_client();
        Self { config, client }
    }

    fn chat_request(
        &self,
        text: &str,
        history: &[DialogueMessage],
        system_prompt: &str,
    ) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        });
        messages.extend(history.iter().map(|m| ChatMessage {
            role: match m.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            }
            .to_string(),
            content: m.content.clone(),
        }));
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: text.to_string(),
        });

        ChatRequest {
            model: self.config.chat_model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    async fn complete_once(&self, request: &ChatRequest) -> Result<String, DialogueError> {
        let response = self
            .client
            .post(self.config.url("chat/completions"))
            .header("Authorization", self.config.bearer())
            .json(request)
            .send()
            .await
            .map_err(|e| self.config.map_send_error(e))?;
        let response = check_status(response).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DialogueError::parse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| DialogueError::parse("No choices in response"))
    }

    async fn speech_once(&self, request: &SpeechRequest) -> Result<Vec<u8>, DialogueError> {
        let response = self
            .client
            .post(self.config.url("audio/speech"))
            .header("Authorization", self.config.bearer())
            .json(request)
            .send()
            .await
            .map_err(|e| self.config.map_send_error(e))?;
        let response = check_status(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DialogueError::network(format!("Failed to read audio: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl DialogueClient for OpenAiDialogueClient {
    async fn send_message(
        &self,
        text: &str,
        history: &[DialogueMessage],
        system_prompt: &str,
    ) -> Result<String, DialogueError> {
        let request = self.chat_request(text, history, system_prompt);
        let mut attempt = 0;

        loop {
            match self.complete_once(&request).await {
                Ok(reply) => {
                    debug!(chars = reply.len(), attempt, "Dialogue reply received");
                    return Ok(reply);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    warn!(error = %err, attempt, "Dialogue request failed, retrying");
                    sleep(backoff(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn text_to_speech(
        &self,
        text: &str,
        language: Language,
    ) -> Result<Option<AudioBlob>, DialogueError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let request = SpeechRequest {
            model: self.config.tts_model.clone(),
            voice: self.config.voice.clone(),
            input: text.to_string(),
            response_format: "mp3".to_string(),
        };
        let mut attempt = 0;

        loop {
            match self.speech_once(&request).await {
                Ok(bytes) if bytes.is_empty() => return Ok(None),
                Ok(bytes) => {
                    debug!(bytes = bytes.len(), language = %language, "Speech synthesized");
                    return Ok(Some(AudioBlob::new(bytes, "audio/mpeg")));
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    warn!(error = %err, attempt, "Speech request failed, retrying");
                    sleep(backoff(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Serialize)]
struct SpeechRequest {
    model: String,
    voice: String,
    input: String,
    response_format: String,
}
