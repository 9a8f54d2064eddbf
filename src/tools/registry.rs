//! Tool registry and dispatcher
//!
//! Maintains the catalogue of callable actions, exports their
//! machine-readable schema for the generative tier, validates and
//! executes calls, and reports structured results. The table is
//! populated once at startup and read-only afterward, so dispatch needs
//! no locking of its own.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::{Error, Result};

/// Parameter value type accepted by a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// UTF-8 text
    String,
    /// Whole number
    Integer,
    /// Floating-point number
    Float,
    /// true/false
    Boolean,
}

impl ParamKind {
    /// Whether a JSON value is acceptable for this kind
    #[must_use]
    pub fn accepts(self, value: &serde_json::Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// One declared tool parameter
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,
    /// Value type
    pub kind: ParamKind,
    /// Whether a call must supply it
    pub required: bool,
    /// Human-readable description (feeds the generative prompt)
    pub description: String,
}

impl ParamSpec {
    /// Create a required parameter
    #[must_use]
    pub fn required(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            description: description.to_string(),
        }
    }

    /// Create an optional parameter
    #[must_use]
    pub fn optional(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            description: description.to_string(),
        }
    }
}

/// Trait for tool implementations
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with positional arguments in declared order
    ///
    /// # Errors
    ///
    /// Returns error on execution failure; the dispatcher captures it
    /// into a failed [`ToolResult`] rather than propagating
    async fn call(&self, args: Vec<serde_json::Value>) -> Result<String>;
}

/// Registered metadata plus handler for one callable tool
#[derive(Clone)]
pub struct ToolDescriptor {
    /// Unique tool name
    pub name: String,
    /// Alternate names, unique across the whole registry
    pub aliases: Vec<String>,
    /// Human-readable description
    pub description: String,
    /// Declared parameters, in call order
    pub parameters: Vec<ParamSpec>,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Create a descriptor with no aliases or parameters
    #[must_use]
    pub fn new(name: &str, description: &str, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            description: description.to_string(),
            parameters: Vec::new(),
            handler,
        }
    }

    /// Add an alias
    #[must_use]
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Add a declared parameter
    #[must_use]
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Number of required parameters
    #[must_use]
    pub fn required_arity(&self) -> usize {
        self.parameters.iter().filter(|p| p.required).count()
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("parameters", &self.parameters.len())
            .finish_non_exhaustive()
    }
}

/// Kind of dispatch failure carried in a [`ToolResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchErrorKind {
    /// No tool registered under the given name or alias
    NotFound,
    /// Arguments failed arity or type validation
    InvalidArguments,
    /// The handler itself failed
    Handler,
}

/// Structured result of one dispatch
///
/// Produced exactly once per dispatch; the registry never retries.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Whether execution succeeded
    pub success: bool,
    /// Tool output on success, diagnostic message on failure
    pub output: String,
    /// Failure classification
    pub error: Option<DispatchErrorKind>,
}

impl ToolResult {
    /// Successful result with the handler's output
    #[must_use]
    pub fn ok(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    /// Failed result of the given kind
    #[must_use]
    pub fn failed(kind: DispatchErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            error: Some(kind),
        }
    }
}

/// Schema summary of one descriptor, exported to the generative tier
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Declared parameters in call order
    pub parameters: Vec<ParamSpec>,
}

/// Process-wide catalogue of callable tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    /// Name and alias lookup into `tools`
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool descriptor
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateTool` if the name or any alias collides
    /// with an already-registered name or alias; the registry is left
    /// exactly as it was before the attempt
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<()> {
        let mut keys = Vec::with_capacity(1 + descriptor.aliases.len());
        keys.push(descriptor.name.clone());
        keys.extend(descriptor.aliases.iter().cloned());

        // Check every key before touching the index
        for key in &keys {
            if self.index.contains_key(key) {
                return Err(Error::DuplicateTool(key.clone()));
            }
        }
        for (i, a) in keys.iter().enumerate() {
            if keys[..i].contains(a) {
                return Err(Error::DuplicateTool(a.clone()));
            }
        }

        let idx = self.tools.len();
        tracing::debug!(tool = %descriptor.name, aliases = ?descriptor.aliases, "registered tool");
        self.tools.push(descriptor);
        for key in keys {
            self.index.insert(key, idx);
        }
        Ok(())
    }

    /// Look up a descriptor by name or alias
    ///
    /// # Errors
    ///
    /// Returns `Error::ToolNotFound` if nothing is registered under the key
    pub fn resolve(&self, name_or_alias: &str) -> Result<&ToolDescriptor> {
        self.index
            .get(name_or_alias)
            .map(|&idx| &self.tools[idx])
            .ok_or_else(|| Error::ToolNotFound(name_or_alias.to_string()))
    }

    /// Whether a tool is registered under the given name or alias
    #[must_use]
    pub fn contains(&self, name_or_alias: &str) -> bool {
        self.index.contains_key(name_or_alias)
    }

    /// Number of registered tools (aliases not counted)
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry has no tools
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate arguments and execute the tool; never returns `Err`
    ///
    /// Unknown names, invalid arguments, and handler failures are all
    /// captured into a failed [`ToolResult`].
    pub async fn dispatch(&self, name_or_alias: &str, args: Vec<serde_json::Value>) -> ToolResult {
        let Ok(descriptor) = self.resolve(name_or_alias) else {
            tracing::warn!(tool = name_or_alias, "dispatch of unknown tool");
            return ToolResult::failed(
                DispatchErrorKind::NotFound,
                format!("no tool registered as '{name_or_alias}'"),
            );
        };

        if let Err(message) = validate_args(descriptor, &args) {
            tracing::warn!(tool = %descriptor.name, %message, "invalid arguments");
            return ToolResult::failed(DispatchErrorKind::InvalidArguments, message);
        }

        match descriptor.handler.call(args).await {
            Ok(output) => {
                tracing::info!(tool = %descriptor.name, "tool dispatched");
                ToolResult::ok(output)
            }
            Err(e) => {
                tracing::error!(tool = %descriptor.name, error = %e, "tool handler failed");
                ToolResult::failed(DispatchErrorKind::Handler, e.to_string())
            }
        }
    }

    /// Schema summaries in registration order
    ///
    /// Computed from the current contents on every call; no caching.
    #[must_use]
    pub fn schema(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|d| ToolSchema {
                name: d.name.clone(),
                description: d.description.clone(),
                parameters: d.parameters.clone(),
            })
            .collect()
    }

    /// Schema as a JSON string for the generative prompt
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn schema_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.schema())?)
    }
}

/// Check arity and types against the descriptor's declared parameters
fn validate_args(
    descriptor: &ToolDescriptor,
    args: &[serde_json::Value],
) -> std::result::Result<(), String> {
    if args.len() > descriptor.parameters.len() {
        return Err(format!(
            "{} takes at most {} argument(s), got {}",
            descriptor.name,
            descriptor.parameters.len(),
            args.len()
        ));
    }

    for (i, param) in descriptor.parameters.iter().enumerate() {
        match args.get(i) {
            Some(value) if value.is_null() && !param.required => {}
            Some(value) => {
                if !param.kind.accepts(value) {
                    return Err(format!(
                        "argument '{}' of {} expects {:?}, got {value}",
                        param.name, descriptor.name, param.kind
                    ));
                }
            }
            None if param.required => {
                return Err(format!(
                    "missing required argument '{}' for {}",
                    param.name, descriptor.name
                ));
            }
            None => {}
        }
    }
    Ok(())
}
