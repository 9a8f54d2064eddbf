//! Intent resolution cascade
//!
//! Pattern tier first, then the generative function-call tier when
//! enabled. Every generative failure mode (timeout, malformed JSON,
//! unknown tool name) is a tier failure that falls through, never an
//! error surfaced to the caller.

use std::sync::Arc;
use std::time::Duration;

use crate::tools::{ToolDescriptor, ToolRegistry};
use crate::Error;

use super::generative::GenerativeEngine;
use super::pattern::PatternMatcher;
use super::{Intent, IntentSource};

const FUNCTION_CALL_SYSTEM: &str = "You are the command parser of a voice assistant. \
Map the user's request to exactly one of the available tools. \
Respond with only a JSON object of the form \
{\"function_call\": {\"name\": \"<tool name>\", \"arguments\": \"<JSON-encoded arguments>\"}}. \
Use the tool's parameter names. If no tool fits, use the name \"none\".";

/// Short-circuiting transcript-to-intent cascade
pub struct IntentResolver {
    matcher: PatternMatcher,
    generative: Option<Arc<dyn GenerativeEngine>>,
    timeout: Duration,
}

impl IntentResolver {
    /// Create a resolver; pass `None` for the engine to disable tier 2
    #[must_use]
    pub fn new(
        matcher: PatternMatcher,
        generative: Option<Arc<dyn GenerativeEngine>>,
        timeout: Duration,
    ) -> Self {
        Self {
            matcher,
            generative,
            timeout,
        }
    }

    /// Resolve a transcript to an intent, or `None` when the cascade is
    /// exhausted and the transcript belongs to the conversational path
    pub async fn resolve(&self, transcript: &str, registry: &ToolRegistry) -> Option<Intent> {
        if let Some(intent) = self.matcher.resolve(transcript) {
            tracing::info!(intent = %intent.name, "resolved by pattern tier");
            return Some(intent);
        }

        let engine = self.generative.as_ref()?;
        match self.generate_intent(engine.as_ref(), transcript, registry).await {
            Some(intent) => {
                tracing::info!(intent = %intent.name, "resolved by generative tier");
                Some(intent)
            }
            None => {
                tracing::debug!("intent cascade exhausted");
                None
            }
        }
    }

    /// Tier 2: grammar-constrained function call, bounded by the
    /// configured timeout
    async fn generate_intent(
        &self,
        engine: &dyn GenerativeEngine,
        transcript: &str,
        registry: &ToolRegistry,
    ) -> Option<Intent> {
        let schema = match registry.schema_json() {
            Ok(schema) => schema,
            Err(e) => {
                tracing::error!(error = %e, "failed to export tool schema");
                return None;
            }
        };
        let prompt = format!("Available tools:\n{schema}\n\nRequest: {transcript}");

        let raw = match tokio::time::timeout(
            self.timeout,
            engine.generate(FUNCTION_CALL_SYSTEM, &prompt, true),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "generative tier failed");
                return None;
            }
            Err(_) => {
                let e = Error::GenerativeTimeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX));
                tracing::warn!(error = %e, "generative tier timed out");
                return None;
            }
        };

        parse_wire(&raw, registry)
    }
}

/// Parse a generative response into an intent
///
/// Accepts the function-call shape
/// `{"function_call": {"name": ..., "arguments": "..."}}` and the
/// legacy `{"intent": ..., "args": [...]}`. Anything else, and any
/// name not present in the registry, is a tier failure.
fn parse_wire(raw: &str, registry: &ToolRegistry) -> Option<Intent> {
    let value: serde_json::Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "generative response is not valid JSON");
            return None;
        }
    };

    let (name, arguments) = if let Some(call) = value.get("function_call") {
        let name = call.get("name")?.as_str()?.to_string();
        let descriptor = lookup(registry, &name)?;
        (name, function_call_args(call.get("arguments"), descriptor)?)
    } else if let Some(intent) = value.get("intent") {
        let name = intent.as_str()?.to_string();
        lookup(registry, &name)?;
        let args = match value.get("args") {
            Some(serde_json::Value::Array(args)) => args.clone(),
            Some(serde_json::Value::Null) | None => Vec::new(),
            Some(other) => {
                tracing::warn!(args = %other, "legacy args is not an array");
                return None;
            }
        };
        (name, args)
    } else {
        tracing::warn!("generative response matches no accepted shape");
        return None;
    };

    Some(Intent {
        name,
        arguments,
        source: IntentSource::Generated,
    })
}

fn lookup<'a>(registry: &'a ToolRegistry, name: &str) -> Option<&'a ToolDescriptor> {
    match registry.resolve(name) {
        Ok(descriptor) => Some(descriptor),
        Err(_) => {
            tracing::warn!(tool = name, "generative tier named an unknown tool");
            None
        }
    }
}

/// Decode the `arguments` field of a function call
///
/// The field is usually a JSON-encoded string (OpenAI convention) but
/// inline objects and arrays are accepted too. Objects are mapped into
/// the tool's declared parameter order.
fn function_call_args(
    arguments: Option<&serde_json::Value>,
    descriptor: &ToolDescriptor,
) -> Option<Vec<serde_json::Value>> {
    let decoded = match arguments {
        None | Some(serde_json::Value::Null) => return Some(Vec::new()),
        Some(serde_json::Value::String(inner)) => match serde_json::from_str(inner) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(error = %e, "function_call arguments string is not valid JSON");
                return None;
            }
        },
        Some(other) => other.clone(),
    };

    match decoded {
        serde_json::Value::Array(args) => Some(args),
        serde_json::Value::Object(mut fields) => {
            let mut args = Vec::new();
            for param in &descriptor.parameters {
                match fields.remove(&param.name) {
                    Some(value) => args.push(value),
                    None if param.required => {
                        tracing::warn!(
                            tool = %descriptor.name,
                            param = %param.name,
                            "function_call missing required argument"
                        );
                        return None;
                    }
                    None => break,
                }
            }
            Some(args)
        }
        other => {
            tracing::warn!(arguments = %other, "function_call arguments is not an object or array");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ParamKind, ParamSpec, ToolHandler};
    use async_trait::async_trait;
    use serde_json::json;

    struct Noop;

    #[async_trait]
    impl ToolHandler for Noop {
        async fn call(&self, _args: Vec<serde_json::Value>) -> crate::Result<String> {
            Ok(String::new())
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDescriptor::new("play_music", "play", Arc::new(Noop)))
            .unwrap();
        registry
            .register(
                ToolDescriptor::new("start_countdown", "timer", Arc::new(Noop))
                    .with_param(ParamSpec::required("duration", ParamKind::Integer, "n"))
                    .with_param(ParamSpec::optional("unit", ParamKind::String, "unit")),
            )
            .unwrap();
        registry
    }

    #[test]
    fn function_call_with_encoded_object_maps_to_parameter_order() {
        let raw = r#"{"function_call": {"name": "start_countdown", "arguments": "{\"unit\": \"minutes\", \"duration\": 10}"}}"#;
        let intent = parse_wire(raw, &registry()).unwrap();
        assert_eq!(intent.name, "start_countdown");
        assert_eq!(intent.arguments, vec![json!(10), json!("minutes")]);
        assert_eq!(intent.source, IntentSource::Generated);
    }

    #[test]
    fn function_call_with_encoded_array_passes_through() {
        let raw = r#"{"function_call": {"name": "start_countdown", "arguments": "[5, \"seconds\"]"}}"#;
        let intent = parse_wire(raw, &registry()).unwrap();
        assert_eq!(intent.arguments, vec![json!(5), json!("seconds")]);
    }

    #[test]
    fn legacy_shape_accepted() {
        let raw = r#"{"intent": "play_music", "args": []}"#;
        let intent = parse_wire(raw, &registry()).unwrap();
        assert_eq!(intent.name, "play_music");
        assert!(intent.arguments.is_empty());
    }

    #[test]
    fn malformed_json_is_tier_failure() {
        assert!(parse_wire("not json at all", &registry()).is_none());
        assert!(parse_wire(r#"{"something": "else"}"#, &registry()).is_none());
    }

    #[test]
    fn unknown_tool_name_is_tier_failure() {
        let raw = r#"{"function_call": {"name": "launch_rocket", "arguments": "{}"}}"#;
        assert!(parse_wire(raw, &registry()).is_none());
    }

    #[test]
    fn missing_required_argument_is_tier_failure() {
        let raw = r#"{"function_call": {"name": "start_countdown", "arguments": "{\"unit\": \"minutes\"}"}}"#;
        assert!(parse_wire(raw, &registry()).is_none());
    }
}
