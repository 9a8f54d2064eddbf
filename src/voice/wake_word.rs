//! Wakeword gate
//!
//! Examines each transcript for the activation phrase before any
//! downstream processing. A missing wakeword is expected traffic and is
//! logged at debug, never treated as an error.

/// Gates transcripts on the configured wakeword
pub struct WakewordGate {
    wakeword: String,
}

impl WakewordGate {
    /// Create a gate for the given activation phrase
    ///
    /// The wakeword is normalized to lowercase and trimmed.
    #[must_use]
    pub fn new(wakeword: &str) -> Self {
        Self {
            wakeword: wakeword.to_lowercase().trim().to_string(),
        }
    }

    /// The normalized wakeword
    #[must_use]
    pub fn wakeword(&self) -> &str {
        &self.wakeword
    }

    /// Case-insensitive check for the wakeword anywhere in the transcript
    #[must_use]
    pub fn check(&self, transcript: &str) -> bool {
        let hit = transcript.to_lowercase().contains(&self.wakeword);
        if !hit {
            tracing::debug!(transcript, "no wakeword, discarding");
        }
        hit
    }

    /// Extract the command portion after the wakeword
    ///
    /// Returns `None` when the wakeword is absent or nothing follows it.
    /// Leading punctuation, whitespace, and stray quotes from the
    /// recognizer are trimmed.
    #[must_use]
    pub fn strip(&self, transcript: &str) -> Option<String> {
        let lowered = transcript.to_lowercase();
        let after = lowered.split_once(&self.wakeword)?.1;
        let command = after
            .trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '.' || c == '!')
            .replace('"', "");

        if command.is_empty() {
            tracing::debug!("nothing after wakeword");
            None
        } else {
            Some(command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_is_case_insensitive() {
        let gate = WakewordGate::new("computer");
        assert!(gate.check("Computer, play music"));
        assert!(gate.check("COMPUTER PLAY MUSIC"));
        assert!(!gate.check("play music"));
    }

    #[test]
    fn wakeword_is_normalized() {
        let gate = WakewordGate::new("  Hey Hearth  ");
        assert_eq!(gate.wakeword(), "hey hearth");
        assert!(gate.check("hey hearth, what time is it"));
    }

    #[test]
    fn strip_returns_command() {
        let gate = WakewordGate::new("computer");
        assert_eq!(
            gate.strip("Computer, set timer for 10 minutes.").as_deref(),
            Some("set timer for 10 minutes")
        );
    }

    #[test]
    fn strip_removes_quotes() {
        let gate = WakewordGate::new("computer");
        assert_eq!(
            gate.strip("computer \"play music\"").as_deref(),
            Some("play music")
        );
    }

    #[test]
    fn strip_rejects_bare_wakeword() {
        let gate = WakewordGate::new("computer");
        assert!(gate.strip("computer.").is_none());
        assert!(gate.strip("something else entirely").is_none());
    }
}
