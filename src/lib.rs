//! Hearth - a local, offline-first voice assistant
//!
//! The core functionality of the assistant:
//! - Silence-gated audio segmentation (capture, framing, utterance queue)
//! - Wakeword gating of transcripts
//! - Three-tier intent resolution (patterns, generative function calls,
//!   conversational fallback)
//! - Tool registry and dispatch with the built-in tool set
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   Capture thread                     │
//! │   cpal input │ frame assembly │ silence segmenter    │
//! └──────────────────────┬───────────────────────────────┘
//!                        │  bounded utterance queue
//! ┌──────────────────────▼───────────────────────────────┐
//! │                  Processing task                     │
//! │   STT │ wakeword gate │ intent cascade │ dispatch    │
//! │                │ TTS │ playback (capture muted)      │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod daemon;
pub mod error;
pub mod intent;
pub mod tools;
pub mod voice;

pub use config::Config;
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use intent::{Intent, IntentResolver, IntentSource, PatternMatcher};
pub use tools::{ToolRegistry, ToolResult};
