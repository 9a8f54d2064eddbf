//! Speech-to-text engine boundary

use async_trait::async_trait;

use crate::{Error, Result};

use super::capture::samples_to_wav;
use super::frame::Utterance;

/// Text produced by the recognition engine for one utterance
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Recognized text
    pub text: String,
    /// Identifier of the engine/model that produced it
    pub engine: String,
}

/// Recognition engine boundary
///
/// Failure yields no transcript; the utterance is dropped and logged by
/// the caller. The engine itself is a black box.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Transcribe one utterance
    ///
    /// # Errors
    ///
    /// Returns error if the engine is unreachable or rejects the audio
    async fn transcribe(&self, utterance: &Utterance) -> Result<Transcript>;
}

/// Response from an OpenAI-compatible transcription endpoint
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// HTTP client for a local OpenAI-compatible STT server
/// (e.g. whisper.cpp `server`)
pub struct HttpSpeechToText {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl HttpSpeechToText {
    /// Create a client for the given server and model
    #[must_use]
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl RecognitionEngine for HttpSpeechToText {
    async fn transcribe(&self, utterance: &Utterance) -> Result<Transcript> {
        let wav = samples_to_wav(utterance.samples(), utterance.sample_rate())?;
        tracing::debug!(
            audio_bytes = wav.len(),
            duration_ms = utterance.duration_ms(),
            "starting transcription"
        );

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(wav)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone());

        let response = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "transcription request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "STT server error");
            return Err(Error::Stt(format!("STT server error {status}: {body}")));
        }

        let result: TranscriptionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse transcription response");
            e
        })?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(Transcript {
            text: result.text,
            engine: self.model.clone(),
        })
    }
}
