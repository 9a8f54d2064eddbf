//! Voice processing module
//!
//! Capture, silence-gated segmentation, the bounded utterance queue,
//! the wakeword gate, playback, and the STT/TTS engine boundaries.

mod capture;
mod frame;
mod playback;
mod queue;
mod segmenter;
mod stt;
mod tts;
mod wake_word;

pub use capture::{AudioCapture, FrameAssembler, samples_to_wav};
pub use frame::{AudioFrame, Utterance};
pub use playback::AudioPlayback;
pub use queue::{UtteranceReceiver, UtteranceSender, utterance_queue};
pub use segmenter::{Segmenter, SegmenterConfig};
pub use stt::{HttpSpeechToText, RecognitionEngine, Transcript};
pub use tts::{HttpTextToSpeech, SynthesisEngine};
pub use wake_word::WakewordGate;
