//! Deterministic pattern tier
//!
//! An ordered list of case-insensitive regex rules mapped to tool
//! names. First matching rule wins, so more specific rules must be
//! registered before broader ones. Capture groups become positional
//! arguments; captures that parse as integers become JSON numbers,
//! everything else stays a string.

use regex::Regex;

use crate::{Error, Result};

use super::{Intent, IntentSource};

struct PatternRule {
    pattern: Regex,
    intent: String,
}

/// Ordered, deterministic phrase-to-intent matcher
pub struct PatternMatcher {
    rules: Vec<PatternRule>,
}

impl PatternMatcher {
    /// Create a matcher with no rules
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a matcher covering the built-in tool set
    ///
    /// # Errors
    ///
    /// Returns error if a rule pattern fails to compile, which
    /// indicates a bug in the table below
    pub fn with_default_rules() -> Result<Self> {
        let mut matcher = Self::new();

        // Timers first: "stop the timer" must not hit the music rules
        matcher.add_rule(
            r"set (?:a |the )?(?:timer|countdown|alarm) for (\d+) (seconds?|minutes?|hours?)",
            "start_countdown",
        )?;
        matcher.add_rule(
            r"(?:cancel|stop) (?:the |my )?(?:timer|countdown|alarm)",
            "cancel_timer",
        )?;
        matcher.add_rule(
            r"(?:how (?:much time|long) is left|time left|timer status|status of (?:the |my )?timer)",
            "get_timer_status",
        )?;

        matcher.add_rule(r"(?:play|start|resume|put on)\b.*\bmusic", "play_music")?;
        matcher.add_rule(r"(?:pause|stop)\b.*\bmusic", "pause_music")?;

        matcher.add_rule(
            r"(?:turn on|switch on)\b.*\blights?|lights? on",
            "turn_on_lights",
        )?;
        matcher.add_rule(
            r"(?:turn off|switch off)\b.*\blights?|lights? off",
            "turn_off_lights",
        )?;

        matcher.add_rule(
            r"what time is it|what's the time|current time|tell me the time",
            "get_current_time",
        )?;

        matcher.add_rule(
            r"(?:what's|what is|how's|how is) the weather|weather forecast|weather (?:today|tomorrow)",
            "get_weather_forecast",
        )?;

        Ok(matcher)
    }

    /// Append a rule; later rules have lower priority
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is not a valid regex
    pub fn add_rule(&mut self, pattern: &str, intent: &str) -> Result<()> {
        let pattern = Regex::new(&format!("(?i){pattern}"))
            .map_err(|e| Error::Config(format!("bad pattern rule '{pattern}': {e}")))?;
        self.rules.push(PatternRule {
            pattern,
            intent: intent.to_string(),
        });
        Ok(())
    }

    /// Match the transcript against the rule list, first match wins
    #[must_use]
    pub fn resolve(&self, transcript: &str) -> Option<Intent> {
        for rule in &self.rules {
            let Some(captures) = rule.pattern.captures(transcript) else {
                continue;
            };

            let arguments = captures
                .iter()
                .skip(1)
                .flatten()
                .map(|group| typed_value(group.as_str()))
                .collect();

            tracing::debug!(intent = %rule.intent, "pattern rule matched");
            return Some(Intent {
                name: rule.intent.clone(),
                arguments,
                source: IntentSource::Pattern,
            });
        }
        None
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer captures become JSON numbers, the rest stay strings
fn typed_value(capture: &str) -> serde_json::Value {
    capture
        .parse::<i64>()
        .map_or_else(|_| serde_json::Value::from(capture), serde_json::Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matcher() -> PatternMatcher {
        PatternMatcher::with_default_rules().unwrap()
    }

    #[test]
    fn play_music_matches_without_arguments() {
        let intent = matcher().resolve("play music").unwrap();
        assert_eq!(intent.name, "play_music");
        assert!(intent.arguments.is_empty());
        assert_eq!(intent.source, IntentSource::Pattern);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let intent = matcher().resolve("PLAY Some Music").unwrap();
        assert_eq!(intent.name, "play_music");
    }

    #[test]
    fn matching_is_idempotent() {
        let m = matcher();
        let first = m.resolve("set a timer for 10 minutes").unwrap();
        let second = m.resolve("set a timer for 10 minutes").unwrap();
        assert_eq!(first.name, second.name);
        assert_eq!(first.arguments, second.arguments);
    }

    #[test]
    fn timer_captures_become_typed_arguments() {
        let intent = matcher().resolve("set timer for 10 minutes").unwrap();
        assert_eq!(intent.name, "start_countdown");
        assert_eq!(intent.arguments, vec![json!(10), json!("minutes")]);
    }

    #[test]
    fn stop_the_timer_does_not_hit_music() {
        let intent = matcher().resolve("stop the timer").unwrap();
        assert_eq!(intent.name, "cancel_timer");
    }

    #[test]
    fn lights_on_and_off() {
        let m = matcher();
        assert_eq!(m.resolve("turn on the lights").unwrap().name, "turn_on_lights");
        assert_eq!(m.resolve("lights off").unwrap().name, "turn_off_lights");
    }

    #[test]
    fn time_of_day() {
        let intent = matcher().resolve("what time is it").unwrap();
        assert_eq!(intent.name, "get_current_time");
    }

    #[test]
    fn weather_phrases() {
        let m = matcher();
        assert_eq!(
            m.resolve("what's the weather").unwrap().name,
            "get_weather_forecast"
        );
        assert_eq!(
            m.resolve("how is the weather today").unwrap().name,
            "get_weather_forecast"
        );
    }

    #[test]
    fn unmatched_transcript_yields_none() {
        assert!(matcher().resolve("tell me a joke").is_none());
    }

    #[test]
    fn registration_order_decides_ties() {
        let mut m = PatternMatcher::new();
        m.add_rule(r"hello world", "specific").unwrap();
        m.add_rule(r"hello", "broad").unwrap();
        assert_eq!(m.resolve("hello world").unwrap().name, "specific");
        assert_eq!(m.resolve("hello there").unwrap().name, "broad");
    }

    #[test]
    fn bad_rule_is_rejected() {
        let mut m = PatternMatcher::new();
        assert!(m.add_rule(r"(unclosed", "broken").is_err());
    }
}
