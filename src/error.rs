//! Error types for the Hearth assistant

use thiserror::Error;

/// Result type alias for Hearth operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Hearth assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device or stream error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Generative engine error
    #[error("generative error: {0}")]
    Generative(String),

    /// Generative call exceeded its deadline
    #[error("generative call timed out after {0}ms")]
    GenerativeTimeout(u64),

    /// A tool name or alias collides with an existing registration
    #[error("duplicate tool name or alias: {0}")]
    DuplicateTool(String),

    /// No tool registered under the given name or alias
    #[error("unknown tool: {0}")]
    ToolNotFound(String),

    /// Tool handler failure
    #[error("tool handler error: {0}")]
    Handler(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
