//! Mock dialogue service.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use super::guard;
use crate::domain::conversation::DialogueMessage;
use crate::domain::language::Language;
use crate::domain::voice::AudioBlob;
use crate::ports::{DialogueClient, DialogueError};

/// One recorded `send_message` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueCall {
    pub text: String,
    pub history: Vec<DialogueMessage>,
    pub system_prompt: String,
}

type SpeechResult = Result<Option<AudioBlob>, DialogueError>;

/// Replies are consumed in order; an exhausted queue answers with a
/// fixed acknowledgement. Speech synthesis returns a small clip unless
/// configured otherwise.
#[derive(Debug, Clone)]
pub struct MockDialogueClient {
    replies: Arc<Mutex<VecDeque<Result<String, DialogueError>>>>,
    speech: Arc<Mutex<SpeechResult>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<DialogueCall>>>,
    speech_calls: Arc<Mutex<Vec<(String, Language)>>>,
}

impl Default for MockDialogueClient {
    fn default() -> Self {
        Self {
            replies: Arc::default(),
            speech: Arc::new(Mutex::new(Ok(Some(Self::default_clip())))),
            delay: Duration::ZERO,
            calls: Arc::default(),
            speech_calls: Arc::default(),
        }
    }
}

impl MockDialogueClient {
    pub const DEFAULT_REPLY: &'static str = "Entendido.";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push_reply(Ok(reply.into()));
        self
    }

    pub fn with_error(self, error: DialogueError) -> Self {
        self.push_reply(Err(error));
        self
    }

    pub fn with_speech(self, result: SpeechResult) -> Self {
        *guard(&self.speech) = result;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push_reply(&self, reply: Result<String, DialogueError>) {
        guard(&self.replies).push_back(reply);
    }

    pub fn calls(&self) -> Vec<DialogueCall> {
        guard(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        guard(&self.calls).len()
    }

    pub fn last_call(&self) -> Option<DialogueCall> {
        guard(&self.calls).last().cloned()
    }

    pub fn speech_calls(&self) -> Vec<(String, Language)> {
        guard(&self.speech_calls).clone()
    }

    fn default_clip() -> AudioBlob {
        AudioBlob::new(vec![0xff; 128], "audio/mpeg").with_duration_ms(2_000)
    }
}

#[async_trait]
impl DialogueClient for MockDialogueClient {
    async fn send_message(
        &self,
        text: &str,
        history: &[DialogueMessage],
        system_prompt: &str,
    ) -> Result<String, DialogueError> {
        guard(&self.calls).push(DialogueCall {
            text: text.to_string(),
            history: history.to_vec(),
            system_prompt: system_prompt.to_string(),
        });
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        guard(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Ok(Self::DEFAULT_REPLY.to_string()))
    }

    async fn text_to_speech(&self, text: &str, language: Language) -> SpeechResult {
        guard(&self.speech_calls).push((text.to_string(), language));
        guard(&self.speech).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_then_default() {
        let client = MockDialogueClient::new()
            .with_reply("uno")
            .with_error(DialogueError::rate_limited(1_000));

        assert_eq!(client.send_message("a", &[], "p").await.unwrap(), "uno");
        assert!(client.send_message("b", &[], "p").await.is_err());
        assert_eq!(
            client.send_message("c", &[], "p").await.unwrap(),
            MockDialogueClient::DEFAULT_REPLY
        );
        assert_eq!(client.call_count(), 3);
        assert_eq!(client.last_call().unwrap().text, "c");
    }

    #[tokio::test]
    async fn speech_can_be_disabled() {
        let client = MockDialogueClient::new().with_speech(Ok(None));
        assert!(client.text_to_speech("hola", Language::Es).await.unwrap().is_none());
        assert_eq!(client.speech_calls(), vec![("hola".to_string(), Language::Es)]);
    }
}
