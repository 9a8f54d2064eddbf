//! TOML configuration file loading
//!
//! Supports `~/.config/hearth/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct HearthConfigFile {
    /// General assistant settings
    #[serde(default)]
    pub general: GeneralFileConfig,

    /// Audio capture and segmentation settings
    #[serde(default)]
    pub audio: AudioFileConfig,

    /// Inference engine endpoints and models
    #[serde(default)]
    pub engines: EnginesFileConfig,
}

/// General assistant settings
#[derive(Debug, Default, Deserialize)]
pub struct GeneralFileConfig {
    /// Activation phrase (e.g. "computer")
    pub wakeword: Option<String>,

    /// Enable the generative intent tier and chat fallback
    pub use_ai: Option<bool>,
}

/// Audio capture and segmentation settings
#[derive(Debug, Default, Deserialize)]
pub struct AudioFileConfig {
    /// Capture sample rate in Hz
    pub sample_rate: Option<u32>,

    /// Frame duration in milliseconds
    pub chunk_duration_ms: Option<u32>,

    /// Trailing silence that ends an utterance, in milliseconds
    pub silence_duration_ms: Option<u32>,

    /// Minimum utterance length worth transcribing, in milliseconds
    pub min_utterance_ms: Option<u32>,

    /// Forced cutoff for continuous speech, in milliseconds
    pub max_utterance_ms: Option<u32>,

    /// RMS energy below which a frame counts as silence
    pub silence_threshold: Option<f32>,

    /// Utterance queue capacity
    pub queue_capacity: Option<usize>,
}

/// Inference engine endpoints and models
#[derive(Debug, Default, Deserialize)]
pub struct EnginesFileConfig {
    /// STT server base URL (OpenAI-compatible, e.g. whisper.cpp server)
    pub stt_url: Option<String>,

    /// STT model identifier
    pub stt_model: Option<String>,

    /// TTS server base URL
    pub tts_url: Option<String>,

    /// TTS voice identifier
    pub tts_voice: Option<String>,

    /// LLM server base URL (e.g. llama.cpp server)
    pub llm_url: Option<String>,

    /// LLM model identifier
    pub llm_model: Option<String>,

    /// Deadline for one grammar-constrained generation, in milliseconds
    pub generative_timeout_ms: Option<u64>,
}

impl HearthConfigFile {
    /// Load from the default config path, if the file exists
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load_default() -> crate::Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let parsed = toml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(parsed)
    }
}

/// Return the default config file path (`~/.config/hearth/config.toml`)
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "hearth", "hearth")
        .map(|d| d.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_parses_to_defaults() {
        let parsed: HearthConfigFile = toml::from_str("").unwrap();
        assert!(parsed.general.wakeword.is_none());
        assert!(parsed.audio.sample_rate.is_none());
    }

    #[test]
    fn partial_file_overlays() {
        let parsed: HearthConfigFile = toml::from_str(
            r#"
            [general]
            wakeword = "jarvis"

            [audio]
            silence_threshold = 0.002
            "#,
        )
        .unwrap();

        assert_eq!(parsed.general.wakeword.as_deref(), Some("jarvis"));
        assert_eq!(parsed.audio.silence_threshold, Some(0.002));
        assert!(parsed.audio.sample_rate.is_none());
    }

    #[test]
    fn load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general]\nuse_ai = false").unwrap();

        let parsed = HearthConfigFile::load(file.path()).unwrap();
        assert_eq!(parsed.general.use_ai, Some(false));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not [valid").unwrap();

        assert!(HearthConfigFile::load(file.path()).is_err());
    }
}
