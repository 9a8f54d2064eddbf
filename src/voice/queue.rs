//! Bounded hand-off between the capture and processing units
//!
//! Single producer (the segmenter, on the capture thread), single
//! consumer (the recognition stage, on the processing task). Capacity
//! is deliberately small: this is a real-time path, and backpressure
//! should block the producer rather than buffer latency.

use tokio::sync::mpsc;

use super::frame::Utterance;

/// Create a bounded utterance queue with the given capacity
#[must_use]
pub fn utterance_queue(capacity: usize) -> (UtteranceSender, UtteranceReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (UtteranceSender { tx }, UtteranceReceiver { rx })
}

/// Producer half, used from the capture thread
pub struct UtteranceSender {
    tx: mpsc::Sender<Utterance>,
}

impl UtteranceSender {
    /// Enqueue an utterance, blocking the capture thread under backpressure
    ///
    /// A just-finalized utterance is never dropped silently; recording
    /// continues into a fresh segmenter buffer while this call waits.
    ///
    /// # Errors
    ///
    /// Returns error when the consumer has shut down
    pub fn enqueue(&self, utterance: Utterance) -> crate::Result<()> {
        self.tx
            .blocking_send(utterance)
            .map_err(|_| crate::Error::Audio("utterance queue closed".to_string()))
    }

    /// Non-blocking enqueue for async contexts and tests
    ///
    /// # Errors
    ///
    /// Returns error when the consumer has shut down
    pub async fn enqueue_async(&self, utterance: Utterance) -> crate::Result<()> {
        self.tx
            .send(utterance)
            .await
            .map_err(|_| crate::Error::Audio("utterance queue closed".to_string()))
    }
}

/// Consumer half, used from the processing task
pub struct UtteranceReceiver {
    rx: mpsc::Receiver<Utterance>,
}

impl UtteranceReceiver {
    /// Dequeue the next utterance, waiting while the queue is empty
    ///
    /// Returns `None` when the producer has shut down.
    pub async fn dequeue(&mut self) -> Option<Utterance> {
        self.rx.recv().await
    }
}
