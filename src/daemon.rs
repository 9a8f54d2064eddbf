//! Assistant daemon
//!
//! Wires the two long-lived units together: a capture thread feeding
//! the segmenter and utterance queue, and a processing task that runs
//! each utterance to completion (transcribe, gate, resolve, dispatch,
//! speak). The only shared state between them is the queue and the
//! mute flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;

use crate::config::Config;
use crate::intent::{
    GenerativeEngine, HttpChatCompletion, Intent, IntentResolver, IntentSource, PatternMatcher,
};
use crate::tools::{register_builtins, DispatchErrorKind, ToolRegistry};
use crate::voice::{
    utterance_queue, AudioCapture, AudioPlayback, FrameAssembler, HttpSpeechToText,
    HttpTextToSpeech, RecognitionEngine, Segmenter, SegmenterConfig, SynthesisEngine,
    UtteranceReceiver, UtteranceSender, WakewordGate,
};
use crate::Result;

const CHAT_SYSTEM: &str = "You are a friendly voice assistant. \
Answer in one or two short spoken sentences. No markdown, no lists.";

/// Spoken when the cascade is exhausted and AI assistance is off
const APOLOGIES: &[&str] = &[
    "Sorry, I didn't catch that",
    "I'm not sure how to help with that",
    "I don't know how to do that yet",
];

/// The always-listening assistant pipeline
pub struct Daemon {
    config: Arc<Config>,
}

impl Daemon {
    /// Create a daemon from a validated configuration
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Run until interrupted
    ///
    /// # Errors
    ///
    /// Returns error on startup failure (invalid configuration,
    /// duplicate tool registration, no audio device). Failures local to
    /// one turn are logged and never end the run.
    pub async fn run(self) -> Result<()> {
        self.config.validate()?;

        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry)?;
        let registry = Arc::new(registry);

        let engines = &self.config.engines;
        let generative: Option<Arc<dyn GenerativeEngine>> = self.config.use_ai.then(|| {
            Arc::new(HttpChatCompletion::new(&engines.llm_url, &engines.llm_model))
                as Arc<dyn GenerativeEngine>
        });
        let resolver = IntentResolver::new(
            PatternMatcher::with_default_rules()?,
            generative.clone(),
            engines.generative_timeout,
        );

        let stt = HttpSpeechToText::new(&engines.stt_url, &engines.stt_model);
        let tts = HttpTextToSpeech::new(&engines.tts_url, &engines.tts_voice);
        let gate = WakewordGate::new(&self.config.wakeword);

        let mute = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = utterance_queue(self.config.audio.queue_capacity);

        let capture_handle = {
            let config = Arc::clone(&self.config);
            let mute = Arc::clone(&mute);
            let shutdown = Arc::clone(&shutdown);
            std::thread::spawn(move || {
                if let Err(e) = run_capture(&config, &sender, &mute, &shutdown) {
                    tracing::error!(error = %e, "capture unit failed");
                }
            })
        };

        tracing::info!(
            wakeword = %self.config.wakeword,
            use_ai = self.config.use_ai,
            "assistant running, press Ctrl+C to stop"
        );

        let processing = Processing {
            stt,
            tts,
            gate,
            resolver,
            registry,
            generative,
            mute,
        };

        tokio::select! {
            () = processing.run(receiver) => {
                tracing::warn!("processing unit stopped");
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("shutdown signal received");
            }
        }

        shutdown.store(true, Ordering::Release);
        if capture_handle.join().is_err() {
            tracing::error!("capture thread panicked");
        }

        Ok(())
    }
}

/// Capture unit body, runs on its own thread (cpal streams are not
/// `Send`)
fn run_capture(
    config: &Config,
    sender: &UtteranceSender,
    mute: &AtomicBool,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut capture = AudioCapture::new(config.audio.sample_rate)?;
    capture.start()?;

    let mut assembler = FrameAssembler::new(config.audio.samples_per_frame());
    let mut segmenter = Segmenter::new(SegmenterConfig::from(&config.audio));
    let poll = Duration::from_millis(u64::from(config.audio.chunk_duration_ms / 2).max(10));

    while !shutdown.load(Ordering::Acquire) {
        std::thread::sleep(poll);

        if mute.load(Ordering::Acquire) {
            // Our own speech is playing; drop everything captured
            capture.clear_buffer();
            assembler.clear();
            segmenter.reset();
            continue;
        }

        let samples = capture.take_buffer();
        for frame in assembler.push(&samples) {
            if let Some(utterance) = segmenter.submit(&frame) {
                tracing::debug!(
                    duration_ms = utterance.duration_ms(),
                    "utterance queued"
                );
                if sender.enqueue(utterance).is_err() {
                    // Consumer is gone, nothing left to do
                    capture.stop();
                    return Ok(());
                }
            }
        }
    }

    capture.stop();
    Ok(())
}

/// Processing unit state
struct Processing {
    stt: HttpSpeechToText,
    tts: HttpTextToSpeech,
    gate: WakewordGate,
    resolver: IntentResolver,
    registry: Arc<ToolRegistry>,
    generative: Option<Arc<dyn GenerativeEngine>>,
    mute: Arc<AtomicBool>,
}

impl Processing {
    /// Dequeue and run utterances to completion, one at a time
    async fn run(self, mut receiver: UtteranceReceiver) {
        while let Some(utterance) = receiver.dequeue().await {
            self.process_turn(&utterance).await;
        }
    }

    /// One full turn; every failure here is local to the turn
    async fn process_turn(&self, utterance: &crate::voice::Utterance) {
        let transcript = match self.stt.transcribe(utterance).await {
            Ok(transcript) => transcript,
            Err(e) => {
                tracing::warn!(error = %e, "recognition failed, turn aborted");
                return;
            }
        };

        if transcript.text.trim().is_empty() {
            tracing::debug!("empty transcript dropped");
            return;
        }

        if !self.gate.check(&transcript.text) {
            return;
        }
        let Some(command) = self.gate.strip(&transcript.text) else {
            tracing::debug!("wakeword with no command, turn dropped");
            return;
        };

        tracing::info!(command = %command, "command accepted");

        let reply = match self.resolver.resolve(&command, &self.registry).await {
            Some(intent) => self.dispatch(intent).await,
            None => self.chat_fallback(&command).await,
        };

        self.speak(&reply).await;
    }

    /// Dispatch an intent and phrase the spoken reply
    async fn dispatch(&self, intent: Intent) -> String {
        tracing::debug!(tool = %intent.name, source = ?intent.source, "dispatching intent");
        let result = self.registry.dispatch(&intent.name, intent.arguments).await;
        if result.success {
            return result.output;
        }

        match result.error {
            Some(DispatchErrorKind::NotFound) => "I don't know how to do that".to_string(),
            _ => "Sorry, that didn't work".to_string(),
        }
    }

    /// Tier 3: free-form conversational reply, or a canned apology when
    /// AI assistance is off
    async fn chat_fallback(&self, command: &str) -> String {
        tracing::debug!(source = ?IntentSource::Chat, "conversational fallback");
        if let Some(engine) = &self.generative {
            match engine.generate(CHAT_SYSTEM, command, false).await {
                Ok(reply) if !reply.trim().is_empty() => return reply.trim().to_string(),
                Ok(_) => tracing::warn!("empty conversational reply"),
                Err(e) => tracing::warn!(error = %e, "conversational reply failed"),
            }
        }

        APOLOGIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(APOLOGIES[0])
            .to_string()
    }

    /// Synthesize and play the reply with capture muted
    ///
    /// Synthesis failure degrades to a short audible cue, not silence.
    async fn speak(&self, text: &str) {
        let audio = self.tts.synthesize(text).await;

        self.mute.store(true, Ordering::Release);
        let played = tokio::task::spawn_blocking(move || -> Result<()> {
            let mut playback = AudioPlayback::new()?;
            match audio {
                Ok(bytes) => playback.play_encoded(&bytes),
                Err(e) => {
                    tracing::warn!(error = %e, "synthesis failed, playing error cue");
                    playback.error_cue()
                }
            }
        })
        .await;
        self.mute.store(false, Ordering::Release);

        match played {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "playback failed"),
            Err(e) => tracing::error!(error = %e, "playback task failed"),
        }
    }
}
