//! Speech-to-text against the OpenAI transcription endpoint.
//!
//! Requests `verbose_json` so the detected language comes back with the
//! text. The label is a language name ("spanish"), normalized later.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{check_status, OpenAiConfig};
use crate::domain::voice::AudioBlob;
use crate::ports::{DialogueError, RecognitionError, SpeechRecognizer, Transcription};

pub struct OpenAiTranscriber {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiTranscriber {
    pub fn new(config: OpenAiConfig) -> Self {
        let client = config.http_client();
        Self { config, client }
    }

    fn file_name(mime: &str) -> &'static str {
        match mime.split(';').next().unwrap_or_default().trim() {
            "audio/wav" | "audio/x-wav" => "speech.wav",
            "audio/mpeg" | "audio/mp3" => "speech.mp3",
            "audio/ogg" => "speech.ogg",
            "audio/mp4" | "audio/m4a" => "speech.m4a",
            _ => "speech.webm",
        }
    }

    async fn transcribe(&self, audio: &AudioBlob) -> Result<VerboseTranscription, DialogueError> {
        let part = Part::bytes(audio.bytes.clone())
            .file_name(Self::file_name(&audio.mime))
            .mime_str(&audio.mime)
            .map_err(|e| DialogueError::parse(format!("Invalid mime type: {}", e)))?;
        let form = Form::new()
            .text("model", self.config.stt_model.clone())
            .text("response_format", "verbose_json")
            .part("file", part);

        let response = self
            .client
            .post(self.config.url("audio/transcriptions"))
            .header("Authorization", self.config.bearer())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.config.map_send_error(e))?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| DialogueError::parse(format!("Failed to parse transcription: {}", e)))
    }
}

#[async_trait]
impl SpeechRecognizer for OpenAiTranscriber {
    async fn recognize(&self, audio: &AudioBlob) -> Result<Transcription, RecognitionError> {
        let result = self
            .transcribe(audio)
            .await
            .map_err(|e| RecognitionError::service(e.to_string()))?;

        debug!(
            chars = result.text.len(),
            language = result.language.as_deref().unwrap_or("unknown"),
            "Transcription received"
        );

        let transcription = Transcription::new(result.text.trim());
        Ok(match result.language {
            Some(language) => transcription.with_language(language),
            None => transcription,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_file_extension_from_mime() {
        assert_eq!(OpenAiTranscriber::file_name("audio/webm;codecs=opus"), "speech.webm");
        assert_eq!(OpenAiTranscriber::file_name("audio/wav"), "speech.wav");
        assert_eq!(OpenAiTranscriber::file_name("audio/mpeg"), "speech.mp3");
    }

    #[test]
    fn verbose_response_carries_language() {
        let json = r#"{"task":"transcribe","language":"spanish","duration":2.1,"text":"Hola"}"#;
        let parsed: VerboseTranscription = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text, "Hola");
        assert_eq!(parsed.language.as_deref(), Some("spanish"));
    }
}
