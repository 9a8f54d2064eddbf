//! Audio frame and utterance types flowing through the capture pipeline

/// One fixed-duration block of mono f32 PCM samples
///
/// Frames are produced by the capture stream at the configured chunk
/// duration and consumed by the segmenter. Immutable once produced.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    samples: Vec<f32>,
}

impl AudioFrame {
    /// Wrap captured samples in a frame
    #[must_use]
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// The PCM samples
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples in the frame
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the frame holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// RMS energy of the frame
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_squares: f32 = self.samples.iter().map(|s| s * s).sum();
        (sum_squares / self.samples.len() as f32).sqrt()
    }

    /// Consume the frame, yielding its samples
    #[must_use]
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

/// One contiguous captured span of speech, bounded by silence or the
/// maximum-duration cutoff
///
/// Owned by the utterance queue after finalization and consumed exactly
/// once by the recognition stage.
#[derive(Debug)]
pub struct Utterance {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Utterance {
    /// Build an utterance from concatenated frame samples
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// The PCM samples
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// The capture sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in milliseconds
    #[must_use]
    pub fn duration_ms(&self) -> u32 {
        if self.sample_rate == 0 {
            return 0;
        }
        u32::try_from(self.samples.len() as u64 * 1000 / u64::from(self.sample_rate))
            .unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_silence_is_zero() {
        let frame = AudioFrame::new(vec![0.0; 320]);
        assert!(frame.rms() < f32::EPSILON);
    }

    #[test]
    fn rms_of_constant_signal() {
        let frame = AudioFrame::new(vec![0.5; 320]);
        assert!((frame.rms() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_frame_rms() {
        assert!(AudioFrame::new(Vec::new()).rms() < f32::EPSILON);
    }

    #[test]
    fn utterance_duration() {
        // 16000 samples at 16kHz = 1 second
        let utterance = Utterance::new(vec![0.0; 16_000], 16_000);
        assert_eq!(utterance.duration_ms(), 1000);
    }
}
