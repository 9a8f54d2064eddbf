//! Built-in tools
//!
//! The stock set of assistant actions: music transport, spoken clock,
//! countdown timers, and light switches. Each handler returns the
//! sentence the assistant speaks back.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Timelike;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::{Error, Result};

use super::registry::{ParamKind, ParamSpec, ToolDescriptor, ToolHandler, ToolRegistry};

/// Shared music transport state
#[derive(Default)]
struct MusicState {
    playing: AtomicBool,
}

struct PlayMusic {
    state: Arc<MusicState>,
}

#[async_trait]
impl ToolHandler for PlayMusic {
    async fn call(&self, _args: Vec<serde_json::Value>) -> Result<String> {
        self.state.playing.store(true, Ordering::Release);
        Ok("Playing music".to_string())
    }
}

struct PauseMusic {
    state: Arc<MusicState>,
}

#[async_trait]
impl ToolHandler for PauseMusic {
    async fn call(&self, _args: Vec<serde_json::Value>) -> Result<String> {
        let was_playing = self.state.playing.swap(false, Ordering::AcqRel);
        if was_playing {
            Ok("Pausing music".to_string())
        } else {
            Ok("Music is not playing".to_string())
        }
    }
}

struct CurrentTime;

#[async_trait]
impl ToolHandler for CurrentTime {
    async fn call(&self, _args: Vec<serde_json::Value>) -> Result<String> {
        Ok(spoken_time(chrono::Local::now().time()))
    }
}

/// Render a time of day the way it should be spoken
///
/// No leading zero on the hour, and the period spelled out letter by
/// letter so the synthesizer does not read "AM" as a word.
fn spoken_time(time: chrono::NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let period = if is_pm { "P M" } else { "A M" };
    format!("It is {hour}:{:02} {period}", time.minute())
}

struct WeatherForecast;

#[async_trait]
impl ToolHandler for WeatherForecast {
    async fn call(&self, args: Vec<serde_json::Value>) -> Result<String> {
        // No forecast provider wired in yet; say so rather than guess
        let location = args.first().and_then(serde_json::Value::as_str);
        match location {
            Some(location) => Ok(format!("I can't check the weather for {location} yet")),
            None => Ok("I can't check the weather yet".to_string()),
        }
    }
}

/// One armed countdown
struct TimerEntry {
    deadline: Instant,
    description: String,
    handle: JoinHandle<()>,
}

/// Shared table of armed countdowns, keyed by timer id
#[derive(Default)]
struct TimerTable {
    next_id: AtomicU64,
    entries: Mutex<HashMap<u64, TimerEntry>>,
}

impl TimerTable {
    fn remove(&self, id: u64) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&id);
        }
    }
}

struct StartCountdown {
    timers: Arc<TimerTable>,
}

/// Longest countdown a voice command may arm
const MAX_COUNTDOWN: Duration = Duration::from_secs(24 * 3600);

/// Seconds per unit; accepts singular and plural forms
fn unit_seconds(unit: &str) -> Option<u64> {
    match unit.trim().to_lowercase().as_str() {
        "second" | "seconds" => Some(1),
        "minute" | "minutes" => Some(60),
        "hour" | "hours" => Some(3600),
        _ => None,
    }
}

#[async_trait]
impl ToolHandler for StartCountdown {
    async fn call(&self, args: Vec<serde_json::Value>) -> Result<String> {
        let value = args
            .first()
            .and_then(serde_json::Value::as_i64)
            .filter(|v| *v > 0)
            .ok_or_else(|| Error::Handler("countdown duration must be positive".to_string()))?;
        let unit = args
            .get(1)
            .and_then(serde_json::Value::as_str)
            .unwrap_or("seconds")
            .to_string();

        let multiplier = unit_seconds(&unit)
            .ok_or_else(|| Error::Handler(format!("unknown time unit '{unit}'")))?;
        let total_secs = u64::try_from(value)
            .ok()
            .and_then(|v| v.checked_mul(multiplier))
            .ok_or_else(|| Error::Handler(format!("countdown of {value} {unit} is too long")))?;
        if total_secs > MAX_COUNTDOWN.as_secs() {
            return Err(Error::Handler(format!(
                "countdown of {value} {unit} exceeds the 24 hour limit"
            )));
        }

        let id = self.timers.next_id.fetch_add(1, Ordering::Relaxed);
        let description = format!("{value} {unit}");
        let deadline = Instant::now() + Duration::from_secs(total_secs);

        let timers = Arc::clone(&self.timers);
        let label = description.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            tracing::info!(timer = id, duration = %label, "timer finished");
            timers.remove(id);
        });

        let mut entries = self
            .timers
            .entries
            .lock()
            .map_err(|_| Error::Handler("timer table poisoned".to_string()))?;
        entries.insert(
            id,
            TimerEntry {
                deadline,
                description: description.clone(),
                handle,
            },
        );

        tracing::info!(timer = id, duration = %description, "timer armed");
        Ok(format!("Timer set for {description}"))
    }
}

struct CancelTimer {
    timers: Arc<TimerTable>,
}

#[async_trait]
impl ToolHandler for CancelTimer {
    async fn call(&self, args: Vec<serde_json::Value>) -> Result<String> {
        let target = args.first().and_then(serde_json::Value::as_u64);

        let mut entries = self
            .timers
            .entries
            .lock()
            .map_err(|_| Error::Handler("timer table poisoned".to_string()))?;
        if entries.is_empty() {
            return Ok("No timer is running".to_string());
        }

        if let Some(id) = target {
            let Some(entry) = entries.remove(&id) else {
                return Ok(format!("There is no timer {id}"));
            };
            entry.handle.abort();
            tracing::info!(timer = id, "timer cancelled");
            return Ok(format!("Cancelled the {} timer", entry.description));
        }

        let count = entries.len();
        for (id, entry) in entries.drain() {
            entry.handle.abort();
            tracing::info!(timer = id, "timer cancelled");
        }

        if count == 1 {
            Ok("Timer cancelled".to_string())
        } else {
            Ok(format!("Cancelled {count} timers"))
        }
    }
}

struct TimerStatus {
    timers: Arc<TimerTable>,
}

/// Render a remaining duration the way it should be spoken
fn spoken_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    if secs >= 60 {
        let minutes = secs / 60;
        let rest = secs % 60;
        if rest == 0 {
            format!("{minutes} minute{} remaining", plural(minutes))
        } else {
            format!(
                "{minutes} minute{} and {rest} second{} remaining",
                plural(minutes),
                plural(rest)
            )
        }
    } else {
        format!("{secs} second{} remaining", plural(secs))
    }
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[async_trait]
impl ToolHandler for TimerStatus {
    async fn call(&self, args: Vec<serde_json::Value>) -> Result<String> {
        let target = args.first().and_then(serde_json::Value::as_u64);

        let entries = self
            .timers
            .entries
            .lock()
            .map_err(|_| Error::Handler("timer table poisoned".to_string()))?;
        if entries.is_empty() {
            return Ok("No timer is running".to_string());
        }

        let now = Instant::now();

        if let Some(id) = target {
            let Some(entry) = entries.get(&id) else {
                return Ok(format!("There is no timer {id}"));
            };
            let remaining = entry.deadline.saturating_duration_since(now);
            return Ok(format!(
                "{} timer has {}",
                entry.description,
                spoken_remaining(remaining)
            ));
        }

        let mut lines: Vec<(Instant, String)> = entries
            .values()
            .map(|e| {
                let remaining = e.deadline.saturating_duration_since(now);
                (
                    e.deadline,
                    format!("{} timer has {}", e.description, spoken_remaining(remaining)),
                )
            })
            .collect();
        // Report the soonest timer first
        lines.sort_by_key(|(deadline, _)| *deadline);

        Ok(lines
            .into_iter()
            .map(|(_, line)| line)
            .collect::<Vec<_>>()
            .join(". "))
    }
}

struct LightSwitch {
    on: bool,
}

#[async_trait]
impl ToolHandler for LightSwitch {
    async fn call(&self, _args: Vec<serde_json::Value>) -> Result<String> {
        // No home automation bridge wired in yet; acknowledge the request
        if self.on {
            Ok("Turning on the lights".to_string())
        } else {
            Ok("Turning off the lights".to_string())
        }
    }
}

/// Register the stock tool set
///
/// # Errors
///
/// Returns error on a name or alias collision, which indicates a bug in
/// the table below
pub fn register_builtins(registry: &mut ToolRegistry) -> Result<()> {
    let music = Arc::new(MusicState::default());
    let timers = Arc::new(TimerTable::default());

    registry.register(
        ToolDescriptor::new(
            "play_music",
            "Start or resume music playback",
            Arc::new(PlayMusic {
                state: Arc::clone(&music),
            }),
        )
        .with_alias("music")
        .with_alias("play")
        .with_alias("resume"),
    )?;

    registry.register(
        ToolDescriptor::new(
            "pause_music",
            "Pause or stop music playback",
            Arc::new(PauseMusic { state: music }),
        )
        .with_alias("pause")
        .with_alias("stop")
        .with_alias("stop_music"),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_current_time",
            "Say the current time of day",
            Arc::new(CurrentTime),
        )
        .with_alias("time")
        .with_alias("get_time")
        .with_alias("what_time_is_it"),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_weather_forecast",
            "Say the weather forecast for a location",
            Arc::new(WeatherForecast),
        )
        .with_alias("weather")
        .with_alias("forecast")
        .with_alias("get_weather")
        .with_param(ParamSpec::optional(
            "location",
            ParamKind::String,
            "place to forecast (default the configured home)",
        )),
    )?;

    registry.register(
        ToolDescriptor::new(
            "start_countdown",
            "Start a countdown timer for the given duration",
            Arc::new(StartCountdown {
                timers: Arc::clone(&timers),
            }),
        )
        .with_alias("set_timer")
        .with_alias("start_timer")
        .with_alias("timer")
        .with_alias("countdown")
        .with_param(ParamSpec::required(
            "duration",
            ParamKind::Integer,
            "how many units to count down",
        ))
        .with_param(ParamSpec::optional(
            "unit",
            ParamKind::String,
            "seconds, minutes, or hours (default seconds)",
        )),
    )?;

    registry.register(
        ToolDescriptor::new(
            "cancel_timer",
            "Cancel any running countdown timers",
            Arc::new(CancelTimer {
                timers: Arc::clone(&timers),
            }),
        )
        .with_alias("stop_timer")
        .with_alias("stop_countdown")
        .with_param(ParamSpec::optional(
            "timer_id",
            ParamKind::Integer,
            "which timer to cancel (default all)",
        )),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_timer_status",
            "Say how much time is left on running timers",
            Arc::new(TimerStatus { timers }),
        )
        .with_alias("timer_status")
        .with_alias("time_left")
        .with_param(ParamSpec::optional(
            "timer_id",
            ParamKind::Integer,
            "which timer to report (default all)",
        )),
    )?;

    registry.register(
        ToolDescriptor::new(
            "turn_on_lights",
            "Turn the lights on",
            Arc::new(LightSwitch { on: true }),
        )
        .with_alias("lights_on")
        .with_alias("light_on"),
    )?;

    registry.register(
        ToolDescriptor::new(
            "turn_off_lights",
            "Turn the lights off",
            Arc::new(LightSwitch { on: false }),
        )
        .with_alias("lights_off")
        .with_alias("light_off"),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::DispatchErrorKind;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry).unwrap();
        registry
    }

    #[tokio::test]
    async fn play_then_pause_music() {
        let registry = registry();

        let result = registry.dispatch("play_music", vec![]).await;
        assert!(result.success);
        assert_eq!(result.output, "Playing music");

        let result = registry.dispatch("pause", vec![]).await;
        assert!(result.success);
        assert_eq!(result.output, "Pausing music");

        // Already paused
        let result = registry.dispatch("stop_music", vec![]).await;
        assert_eq!(result.output, "Music is not playing");
    }

    #[tokio::test]
    async fn countdown_arms_and_reports_status() {
        let registry = registry();

        let result = registry
            .dispatch("start_countdown", vec![json!(10), json!("minutes")])
            .await;
        assert!(result.success);
        assert_eq!(result.output, "Timer set for 10 minutes");

        let result = registry.dispatch("get_timer_status", vec![]).await;
        assert!(result.success);
        assert!(result.output.contains("10 minutes timer"));
        assert!(result.output.contains("remaining"));

        let result = registry.dispatch("cancel_timer", vec![]).await;
        assert_eq!(result.output, "Timer cancelled");

        let result = registry.dispatch("get_timer_status", vec![]).await;
        assert_eq!(result.output, "No timer is running");
    }

    #[tokio::test]
    async fn countdown_rejects_bad_duration() {
        let registry = registry();

        let result = registry
            .dispatch("start_countdown", vec![json!(-3), json!("seconds")])
            .await;
        assert!(!result.success);

        let result = registry
            .dispatch("start_countdown", vec![json!(5), json!("fortnights")])
            .await;
        assert!(!result.success);
        assert!(result.output.contains("fortnights"));
    }

    #[tokio::test]
    async fn countdown_rejects_overlong_duration_without_panicking() {
        let registry = registry();

        // Passes Integer validation but would overflow the second count
        let result = registry
            .dispatch("start_countdown", vec![json!(i64::MAX), json!("hours")])
            .await;
        assert!(!result.success);
        assert_eq!(result.error, Some(DispatchErrorKind::Handler));

        // Within arithmetic range but above the 24 hour cap
        let result = registry
            .dispatch("start_countdown", vec![json!(25), json!("hours")])
            .await;
        assert!(!result.success);
        assert!(result.output.contains("24 hour"));

        // Nothing was armed by either attempt
        let status = registry.dispatch("get_timer_status", vec![]).await;
        assert_eq!(status.output, "No timer is running");
    }

    #[tokio::test]
    async fn cancel_with_no_timer_is_polite() {
        let registry = registry();
        let result = registry.dispatch("cancel_timer", vec![]).await;
        assert!(result.success);
        assert_eq!(result.output, "No timer is running");
    }

    #[tokio::test]
    async fn weather_stub_responds() {
        let registry = registry();

        let result = registry.dispatch("weather", vec![]).await;
        assert!(result.success);
        assert_eq!(result.output, "I can't check the weather yet");

        let result = registry
            .dispatch("get_weather_forecast", vec![json!("Hobart")])
            .await;
        assert!(result.success);
        assert!(result.output.contains("Hobart"));
    }

    #[tokio::test]
    async fn lights_respond() {
        let registry = registry();
        let result = registry.dispatch("lights_on", vec![]).await;
        assert_eq!(result.output, "Turning on the lights");
        let result = registry.dispatch("turn_off_lights", vec![]).await;
        assert_eq!(result.output, "Turning off the lights");
    }

    #[test]
    fn time_is_rendered_for_speech() {
        let t = chrono::NaiveTime::from_hms_opt(15, 5, 0).unwrap();
        assert_eq!(spoken_time(t), "It is 3:05 P M");
        let t = chrono::NaiveTime::from_hms_opt(0, 30, 0).unwrap();
        assert_eq!(spoken_time(t), "It is 12:30 A M");
    }

    #[test]
    fn remaining_time_is_rendered_for_speech() {
        assert_eq!(
            spoken_remaining(Duration::from_secs(90)),
            "1 minute and 30 seconds remaining"
        );
        assert_eq!(
            spoken_remaining(Duration::from_secs(120)),
            "2 minutes remaining"
        );
        assert_eq!(
            spoken_remaining(Duration::from_secs(1)),
            "1 second remaining"
        );
    }
}
