//! Configuration management for the Hearth assistant
//!
//! Precedence: built-in defaults < config file < environment variables.
//! The resulting [`Config`] is immutable and shared read-only with the
//! capture and processing units.

mod file;

use std::path::Path;
use std::time::Duration;

pub use file::{HearthConfigFile, default_config_path};

use crate::{Error, Result};

/// Hearth assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Activation phrase required before a transcript becomes a command
    pub wakeword: String,

    /// Enable the generative intent tier and chat fallback
    pub use_ai: bool,

    /// Audio capture and segmentation settings
    pub audio: AudioConfig,

    /// Inference engine endpoints and models
    pub engines: EngineConfig,
}

/// Audio capture and segmentation settings
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Capture sample rate in Hz
    pub sample_rate: u32,

    /// Frame duration in milliseconds
    pub chunk_duration_ms: u32,

    /// Trailing silence that ends an utterance, in milliseconds
    pub silence_duration_ms: u32,

    /// Minimum utterance length worth transcribing, in milliseconds
    pub min_utterance_ms: u32,

    /// Forced cutoff for continuous speech, in milliseconds
    pub max_utterance_ms: u32,

    /// RMS energy below which a frame counts as silence
    pub silence_threshold: f32,

    /// Utterance queue capacity (real-time path, kept small)
    pub queue_capacity: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            chunk_duration_ms: 200,
            silence_duration_ms: 1_000,
            min_utterance_ms: 1_500,
            max_utterance_ms: 10_000,
            silence_threshold: 0.001,
            queue_capacity: 2,
        }
    }
}

impl AudioConfig {
    /// Samples per frame at the configured rate
    #[must_use]
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate as usize * self.chunk_duration_ms as usize) / 1000
    }
}

/// Inference engine endpoints and models
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// STT server base URL (OpenAI-compatible, e.g. whisper.cpp server)
    pub stt_url: String,

    /// STT model identifier
    pub stt_model: String,

    /// TTS server base URL
    pub tts_url: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// LLM server base URL (e.g. llama.cpp server)
    pub llm_url: String,

    /// LLM model identifier
    pub llm_model: String,

    /// Deadline for one grammar-constrained generation
    pub generative_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stt_url: "http://127.0.0.1:8081".to_string(),
            stt_model: "whisper-small".to_string(),
            tts_url: "http://127.0.0.1:8082".to_string(),
            tts_voice: "af_heart".to_string(),
            llm_url: "http://127.0.0.1:8083".to_string(),
            llm_model: "qwen3-4b-instruct".to_string(),
            generative_timeout: Duration::from_millis(10_000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wakeword: "computer".to_string(),
            use_ai: true,
            audio: AudioConfig::default(),
            engines: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default file location and environment
    ///
    /// # Errors
    ///
    /// Returns error if the config file is malformed or values are invalid
    pub fn load() -> Result<Self> {
        let file = HearthConfigFile::load_default()?;
        Self::from_file(file)
    }

    /// Load configuration from an explicit file path
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or values are invalid
    pub fn load_from(path: &Path) -> Result<Self> {
        let file = HearthConfigFile::load(path)?;
        Self::from_file(file)
    }

    /// Build a config by overlaying a parsed file and environment variables
    /// on the defaults
    ///
    /// # Errors
    ///
    /// Returns error if the resulting values are invalid
    pub fn from_file(file: HearthConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(wakeword) = file.general.wakeword {
            config.wakeword = wakeword;
        }
        if let Some(use_ai) = file.general.use_ai {
            config.use_ai = use_ai;
        }

        let audio = &mut config.audio;
        if let Some(v) = file.audio.sample_rate {
            audio.sample_rate = v;
        }
        if let Some(v) = file.audio.chunk_duration_ms {
            audio.chunk_duration_ms = v;
        }
        if let Some(v) = file.audio.silence_duration_ms {
            audio.silence_duration_ms = v;
        }
        if let Some(v) = file.audio.min_utterance_ms {
            audio.min_utterance_ms = v;
        }
        if let Some(v) = file.audio.max_utterance_ms {
            audio.max_utterance_ms = v;
        }
        if let Some(v) = file.audio.silence_threshold {
            audio.silence_threshold = v;
        }
        if let Some(v) = file.audio.queue_capacity {
            audio.queue_capacity = v;
        }

        let engines = &mut config.engines;
        if let Some(v) = file.engines.stt_url {
            engines.stt_url = v;
        }
        if let Some(v) = file.engines.stt_model {
            engines.stt_model = v;
        }
        if let Some(v) = file.engines.tts_url {
            engines.tts_url = v;
        }
        if let Some(v) = file.engines.tts_voice {
            engines.tts_voice = v;
        }
        if let Some(v) = file.engines.llm_url {
            engines.llm_url = v;
        }
        if let Some(v) = file.engines.llm_model {
            engines.llm_model = v;
        }
        if let Some(v) = file.engines.generative_timeout_ms {
            engines.generative_timeout = Duration::from_millis(v);
        }

        // Environment overrides
        if let Ok(wakeword) = std::env::var("HEARTH_WAKEWORD") {
            config.wakeword = wakeword;
        }
        if let Ok(use_ai) = std::env::var("HEARTH_USE_AI") {
            config.use_ai = use_ai == "1" || use_ai.eq_ignore_ascii_case("true");
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the pipeline relies on
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` describing the first violated invariant
    pub fn validate(&self) -> Result<()> {
        if self.wakeword.trim().is_empty() {
            return Err(Error::Config("wakeword must not be empty".to_string()));
        }
        let audio = &self.audio;
        if audio.sample_rate == 0 || audio.chunk_duration_ms == 0 {
            return Err(Error::Config(
                "sample_rate and chunk_duration_ms must be positive".to_string(),
            ));
        }
        if audio.min_utterance_ms > audio.max_utterance_ms {
            return Err(Error::Config(format!(
                "min_utterance_ms ({}) exceeds max_utterance_ms ({})",
                audio.min_utterance_ms, audio.max_utterance_ms
            )));
        }
        if audio.queue_capacity == 0 {
            return Err(Error::Config("queue_capacity must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&audio.silence_threshold) {
            return Err(Error::Config(format!(
                "silence_threshold {} outside [0, 1]",
                audio.silence_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn default_frame_size() {
        // 200ms at 16kHz
        assert_eq!(AudioConfig::default().samples_per_frame(), 3200);
    }

    #[test]
    fn file_overlays_defaults() {
        let file: HearthConfigFile = toml::from_str(
            r#"
            [general]
            wakeword = "hearth"
            use_ai = false

            [audio]
            min_utterance_ms = 800
            "#,
        )
        .unwrap();

        let config = Config::from_file(file).unwrap();
        assert_eq!(config.wakeword, "hearth");
        assert!(!config.use_ai);
        assert_eq!(config.audio.min_utterance_ms, 800);
        // Untouched fields keep defaults
        assert_eq!(config.audio.max_utterance_ms, 10_000);
    }

    #[test]
    fn rejects_inverted_utterance_bounds() {
        let mut config = Config::default();
        config.audio.min_utterance_ms = 20_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_wakeword() {
        let mut config = Config::default();
        config.wakeword = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
