//! Intent cascade integration tests
//!
//! Exercises the pattern tier, the generative function-call tier with
//! mock engines, and the failure modes that fall through to the
//! conversational path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use hearth_assistant::intent::{GenerativeEngine, IntentResolver, IntentSource, PatternMatcher};
use hearth_assistant::tools::{register_builtins, ToolRegistry};

/// Engine that always returns the same response
struct CannedEngine {
    response: String,
}

impl CannedEngine {
    fn new(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
        })
    }
}

#[async_trait]
impl GenerativeEngine for CannedEngine {
    async fn generate(
        &self,
        _system: &str,
        _prompt: &str,
        _json_only: bool,
    ) -> hearth_assistant::Result<String> {
        Ok(self.response.clone())
    }
}

/// Engine that takes longer than any test timeout
struct SlowEngine;

#[async_trait]
impl GenerativeEngine for SlowEngine {
    async fn generate(
        &self,
        _system: &str,
        _prompt: &str,
        _json_only: bool,
    ) -> hearth_assistant::Result<String> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(String::new())
    }
}

fn registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry).unwrap();
    registry
}

fn resolver(engine: Option<Arc<dyn GenerativeEngine>>) -> IntentResolver {
    IntentResolver::new(
        PatternMatcher::with_default_rules().unwrap(),
        engine,
        Duration::from_millis(100),
    )
}

#[tokio::test]
async fn pattern_tier_resolves_play_music() {
    let resolver = resolver(None);
    let intent = resolver.resolve("play music", &registry()).await.unwrap();

    assert_eq!(intent.name, "play_music");
    assert!(intent.arguments.is_empty());
    assert_eq!(intent.source, IntentSource::Pattern);
}

#[tokio::test]
async fn pattern_tier_extracts_timer_arguments() {
    let resolver = resolver(None);
    let intent = resolver
        .resolve("set timer for 10 minutes", &registry())
        .await
        .unwrap();

    assert_eq!(intent.name, "start_countdown");
    assert_eq!(intent.arguments, vec![json!(10), json!("minutes")]);
}

#[tokio::test]
async fn pattern_tier_wins_over_generative() {
    // The engine would name a different tool; tier 1 must short-circuit
    let engine = CannedEngine::new(
        r#"{"function_call": {"name": "turn_off_lights", "arguments": "{}"}}"#,
    );
    let resolver = resolver(Some(engine));
    let intent = resolver.resolve("PLAY MUSIC", &registry()).await.unwrap();

    assert_eq!(intent.name, "play_music");
    assert_eq!(intent.source, IntentSource::Pattern);
}

#[tokio::test]
async fn generative_function_call_shape_with_object_arguments() {
    let engine = CannedEngine::new(
        r#"{"function_call": {"name": "start_countdown", "arguments": "{\"duration\": 3, \"unit\": \"minutes\"}"}}"#,
    );
    let resolver = resolver(Some(engine));
    let intent = resolver
        .resolve("remind me in three minutes", &registry())
        .await
        .unwrap();

    assert_eq!(intent.name, "start_countdown");
    // Object fields map into declared parameter order
    assert_eq!(intent.arguments, vec![json!(3), json!("minutes")]);
    assert_eq!(intent.source, IntentSource::Generated);
}

#[tokio::test]
async fn generative_function_call_shape_with_array_arguments() {
    let engine = CannedEngine::new(
        r#"{"function_call": {"name": "start_countdown", "arguments": "[7, \"seconds\"]"}}"#,
    );
    let resolver = resolver(Some(engine));
    let intent = resolver
        .resolve("give me a moment", &registry())
        .await
        .unwrap();

    assert_eq!(intent.arguments, vec![json!(7), json!("seconds")]);
}

#[tokio::test]
async fn generative_legacy_shape() {
    let engine = CannedEngine::new(r#"{"intent": "get_current_time", "args": []}"#);
    let resolver = resolver(Some(engine));
    let intent = resolver
        .resolve("do you know the hour", &registry())
        .await
        .unwrap();

    assert_eq!(intent.name, "get_current_time");
    assert!(intent.arguments.is_empty());
    assert_eq!(intent.source, IntentSource::Generated);
}

#[tokio::test]
async fn generative_alias_is_accepted() {
    let engine = CannedEngine::new(r#"{"intent": "time", "args": []}"#);
    let resolver = resolver(Some(engine));
    let intent = resolver.resolve("the hour please", &registry()).await.unwrap();

    assert_eq!(intent.name, "time");
}

#[tokio::test]
async fn malformed_generative_response_falls_through() {
    for raw in [
        "I would love to help you with that!",
        r#"{"answer": 42}"#,
        r#"{"function_call": {"name": "play_music", "arguments": "not json"}}"#,
    ] {
        let resolver = resolver(Some(CannedEngine::new(raw)));
        assert!(
            resolver.resolve("tell me a joke", &registry()).await.is_none(),
            "response {raw:?} should exhaust the cascade"
        );
    }
}

#[tokio::test]
async fn unknown_tool_name_falls_through() {
    let engine = CannedEngine::new(
        r#"{"function_call": {"name": "order_pizza", "arguments": "{}"}}"#,
    );
    let resolver = resolver(Some(engine));
    assert!(resolver
        .resolve("I'm hungry", &registry())
        .await
        .is_none());
}

#[tokio::test]
async fn generative_timeout_falls_through() {
    let resolver = resolver(Some(Arc::new(SlowEngine)));
    let started = std::time::Instant::now();
    assert!(resolver
        .resolve("tell me a story", &registry())
        .await
        .is_none());
    // Bounded by the 100ms resolver timeout, not the engine's 60s
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn disabled_generative_tier_goes_straight_to_fallback() {
    let resolver = resolver(None);
    assert!(resolver
        .resolve("tell me a joke", &registry())
        .await
        .is_none());
}
