//! Text-to-speech engine boundary

use async_trait::async_trait;

use crate::{Error, Result};

/// Synthesis engine boundary
///
/// Returns encoded audio bytes (WAV or MP3) for playback. Failure
/// degrades to an audible error cue at the call site, not silence.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Synthesize speech for the given text
    ///
    /// # Errors
    ///
    /// Returns error if the engine is unreachable or rejects the request
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// HTTP client for a local OpenAI-compatible TTS server
pub struct HttpTextToSpeech {
    client: reqwest::Client,
    base_url: String,
    voice: String,
}

impl HttpTextToSpeech {
    /// Create a client for the given server and voice
    #[must_use]
    pub fn new(base_url: &str, voice: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            voice: voice.to_string(),
        }
    }
}

#[derive(serde::Serialize)]
struct SpeechRequest<'a> {
    input: &'a str,
    voice: &'a str,
}

#[async_trait]
impl SynthesisEngine for HttpTextToSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        tracing::debug!(chars = text.len(), "starting synthesis");

        let response = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .json(&SpeechRequest {
                input: text,
                voice: &self.voice,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "synthesis request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TTS server error");
            return Err(Error::Tts(format!("TTS server error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        tracing::debug!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }
}
