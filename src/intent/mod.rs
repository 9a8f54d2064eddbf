//! Intent resolution
//!
//! Turns a transcript into a normalized intent through a short-circuit
//! cascade: deterministic pattern rules first, then a grammar-
//! constrained generative call, then the conversational fallback.

mod generative;
mod pattern;
mod resolver;

pub use generative::{GenerativeEngine, HttpChatCompletion};
pub use pattern::PatternMatcher;
pub use resolver::IntentResolver;

/// Which tier produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentSource {
    /// Deterministic pattern rule
    Pattern,
    /// Generative function call
    Generated,
    /// Conversational fallback; terminal, never dispatched as a tool
    Chat,
}

/// A normalized, dispatchable command
#[derive(Debug, Clone)]
pub struct Intent {
    /// Tool name or alias to dispatch
    pub name: String,
    /// Positional arguments in the tool's declared parameter order
    pub arguments: Vec<serde_json::Value>,
    /// Which tier produced this intent
    pub source: IntentSource,
}
