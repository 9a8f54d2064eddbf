//! Silence-gated utterance segmentation
//!
//! Consumes fixed-size audio frames, classifies each as speech or
//! non-speech by RMS energy, and emits complete utterances bounded by
//! trailing silence or the maximum-duration cutoff.

use crate::config::AudioConfig;

use super::frame::{AudioFrame, Utterance};

/// Segmenter timing and threshold parameters
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Capture sample rate in Hz
    pub sample_rate: u32,
    /// Frame duration in milliseconds
    pub chunk_duration_ms: u32,
    /// Trailing silence that ends an utterance, in milliseconds
    pub silence_duration_ms: u32,
    /// Buffers shorter than this are discarded at silence end
    pub min_utterance_ms: u32,
    /// Forced cutoff for continuous speech
    pub max_utterance_ms: u32,
    /// RMS energy below which a frame counts as silence
    pub silence_threshold: f32,
}

impl From<&AudioConfig> for SegmenterConfig {
    fn from(audio: &AudioConfig) -> Self {
        Self {
            sample_rate: audio.sample_rate,
            chunk_duration_ms: audio.chunk_duration_ms,
            silence_duration_ms: audio.silence_duration_ms,
            min_utterance_ms: audio.min_utterance_ms,
            max_utterance_ms: audio.max_utterance_ms,
            silence_threshold: audio.silence_threshold,
        }
    }
}

/// Segmenter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No speech accumulated
    Idle,
    /// Accumulating an in-progress utterance
    Recording,
}

/// Silence-gated segmenter state machine
///
/// Holds no cross-utterance state: every finalization (emit or discard)
/// resets the buffer and counters.
pub struct Segmenter {
    config: SegmenterConfig,
    state: State,
    buffer: Vec<f32>,
    trailing_silence_ms: u32,
}

impl Segmenter {
    /// Create a segmenter with the given parameters
    #[must_use]
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            state: State::Idle,
            buffer: Vec::new(),
            trailing_silence_ms: 0,
        }
    }

    /// Submit one frame; returns a finalized utterance when one completes
    pub fn submit(&mut self, frame: &AudioFrame) -> Option<Utterance> {
        let is_speech = frame.rms() >= self.config.silence_threshold;

        match self.state {
            State::Idle => {
                if is_speech {
                    self.state = State::Recording;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(frame.samples());
                    self.trailing_silence_ms = 0;
                    tracing::trace!(rms = frame.rms(), "speech onset");
                }
                None
            }
            State::Recording => {
                self.buffer.extend_from_slice(frame.samples());

                if is_speech {
                    self.trailing_silence_ms = 0;
                } else {
                    self.trailing_silence_ms += self.config.chunk_duration_ms;
                }

                // Forced cutoff bounds buffering on continuous noise;
                // emitted regardless of the trailing-silence state.
                if self.buffered_ms() >= self.config.max_utterance_ms {
                    tracing::debug!(buffered_ms = self.buffered_ms(), "max-length cutoff");
                    return Some(self.finalize());
                }

                if self.trailing_silence_ms >= self.config.silence_duration_ms {
                    if self.buffered_ms() >= self.config.min_utterance_ms {
                        return Some(self.finalize());
                    }
                    // Too short to be worth transcribing
                    tracing::debug!(
                        buffered_ms = self.buffered_ms(),
                        min_ms = self.config.min_utterance_ms,
                        "discarding short segment"
                    );
                    self.reset();
                }
                None
            }
        }
    }

    /// Whether an utterance is currently being accumulated
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.state == State::Recording
    }

    /// Duration of the in-progress buffer in milliseconds
    #[must_use]
    fn buffered_ms(&self) -> u32 {
        if self.config.sample_rate == 0 {
            return 0;
        }
        u32::try_from(self.buffer.len() as u64 * 1000 / u64::from(self.config.sample_rate))
            .unwrap_or(u32::MAX)
    }

    fn finalize(&mut self) -> Utterance {
        let samples = std::mem::take(&mut self.buffer);
        self.state = State::Idle;
        self.trailing_silence_ms = 0;
        let utterance = Utterance::new(samples, self.config.sample_rate);
        tracing::debug!(duration_ms = utterance.duration_ms(), "utterance finalized");
        utterance
    }

    /// Drop any in-progress buffer and return to idle
    ///
    /// Used when capture is muted during playback.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.buffer.clear();
        self.trailing_silence_ms = 0;
    }
}
