//! Streaming classification session
//!
//! A session owns a model handle, a FIFO sample queue and the most recent
//! prediction. Each [`ClassificationSession::predict`] call appends a chunk
//! of interleaved I/Q values; once `time_window * frame_width` samples are
//! queued, exactly that many (the oldest) are windowed, featurised and
//! classified. Until then the previous result is returned unchanged.
//!
//! Sessions are single-writer: `predict` takes `&mut self`, so concurrent
//! producers must serialise access themselves (one task per session or a
//! caller-held lock).
//!
//! # Example
//!
//! ```
//! use rfi_dsp::config::StreamConfig;
//! use rfi_dsp::ml::model::{FnModel, ModelInput};
//! use rfi_dsp::ml::session::ClassificationSession;
//! use rfi_dsp::{Label, RfiResult};
//!
//! let model = FnModel(|input: &ModelInput| -> RfiResult<Vec<Vec<f32>>> {
//!     Ok(vec![vec![0.0, 0.0, 1.0]; input.time_steps()])
//! });
//! let config = StreamConfig { time_window: 2, ..Default::default() };
//! let mut session = ClassificationSession::new(model, config)?;
//!
//! assert_eq!(session.predict(&vec![1.0; 2 * 1000])?, None);
//! assert_eq!(session.predict(&vec![1.0; 2 * 2072])?, Some(Label::Radar));
//! # Ok::<(), rfi_dsp::RfiError>(())
//! ```

use num_complex::Complex64;

use crate::analysis::label::Label;
use crate::config::StreamConfig;
use crate::error::{RfiError, RfiResult};
use crate::features::window::extract;
use crate::io::sample_buffer::SampleQueue;
use crate::ml::model::{classify, Model};
use crate::preprocessing::matrix::SignalMatrix;

/// Callback invoked with every dispatched payload, before windowing
pub type DispatchObserver = Box<dyn FnMut(&[Complex64]) + Send>;

/// Stateful streaming classifier
pub struct ClassificationSession<M> {
    model: M,
    config: StreamConfig,
    queue: Option<SampleQueue>,
    last_prediction: Option<Label>,
    dispatches: usize,
    dispatched_samples: usize,
    observer: Option<DispatchObserver>,
}

impl<M: Model> ClassificationSession<M> {
    /// Create a session around a model
    ///
    /// Buffering is enabled when `config.time_window > 1`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero time window, frame width or
    /// extraction window.
    pub fn new(model: M, config: StreamConfig) -> RfiResult<Self> {
        config.validate()?;
        let queue = config
            .is_buffered()
            .then(|| SampleQueue::new(2 * config.threshold()));
        log::debug!(
            "Classification session: time_window={}, threshold={}, buffered={}",
            config.time_window,
            config.threshold(),
            queue.is_some()
        );
        Ok(Self {
            model,
            config,
            queue,
            last_prediction: None,
            dispatches: 0,
            dispatched_samples: 0,
            observer: None,
        })
    }

    /// Attach a callback that sees every dispatched payload
    pub fn with_dispatch_observer(mut self, observer: DispatchObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Feed one chunk of interleaved `[I, Q, I, Q, ...]` values
    ///
    /// # Returns
    ///
    /// The new label if this call dispatched, otherwise the previous result
    /// (`None` before the first dispatch). Returning a stale result is the
    /// normal "not enough data yet" answer, not an error.
    ///
    /// A chunk that leaves `threshold` or more samples queued is drained in
    /// stream order, one dispatch per `threshold` samples, so one call may
    /// run the model several times. Only the last dispatch's label is
    /// returned; the earlier ones are observable through the dispatch
    /// observer and [`Self::dispatch_count`].
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a chunk that is not whole I/Q pairs, or, in
    /// single-shot mode, a chunk that is not exactly one frame. Extraction
    /// and model errors propagate; the queue keeps whatever was not yet
    /// dispatched.
    pub fn predict(&mut self, chunk: &[f64]) -> RfiResult<Option<Label>> {
        let threshold = self.config.threshold();

        let Some(queue) = self.queue.as_mut() else {
            if chunk.len() != threshold * 2 {
                return Err(RfiError::InvalidInput(format!(
                    "single-shot chunk holds {} values, expected {} ({} I/Q pairs)",
                    chunk.len(),
                    threshold * 2,
                    threshold
                )));
            }
            let samples: Vec<Complex64> = chunk
                .chunks_exact(2)
                .map(|pair| Complex64::new(pair[0], pair[1]))
                .collect();
            let label = self.dispatch(samples)?;
            return Ok(Some(label));
        };

        queue.push_interleaved(chunk)?;
        if queue.len() < threshold {
            log::trace!("Buffered {}/{} samples", queue.len(), threshold);
            return Ok(self.last_prediction);
        }

        // Drain whole payloads so fewer than `threshold` samples remain.
        loop {
            let payload = match self.queue.as_mut().and_then(|q| q.take_front(threshold)) {
                Some(payload) => payload,
                None => break,
            };
            self.dispatch(payload)?;
        }
        Ok(self.last_prediction)
    }

    fn dispatch(&mut self, payload: Vec<Complex64>) -> RfiResult<Label> {
        if let Some(observer) = self.observer.as_mut() {
            observer(&payload);
        }
        self.dispatches += 1;
        self.dispatched_samples += payload.len();

        let matrix = SignalMatrix::new(payload, self.config.time_window, self.config.frame_width)?;
        let extraction = extract(&matrix, &self.config.extraction)?;
        let label = classify(&mut self.model, &extraction.samples)?;

        log::debug!(
            "Dispatch #{}: {} samples -> {}",
            self.dispatches,
            self.config.threshold(),
            label
        );
        self.last_prediction = Some(label);
        Ok(label)
    }

    /// Most recent dispatched result
    pub fn last_prediction(&self) -> Option<Label> {
        self.last_prediction
    }

    /// Samples waiting for the next dispatch
    pub fn buffered_len(&self) -> usize {
        self.queue.as_ref().map_or(0, SampleQueue::len)
    }

    /// Samples needed per dispatch
    pub fn threshold(&self) -> usize {
        self.config.threshold()
    }

    /// Number of dispatches so far
    pub fn dispatch_count(&self) -> usize {
        self.dispatches
    }

    /// Total samples consumed by dispatches so far
    pub fn dispatched_samples(&self) -> usize {
        self.dispatched_samples
    }

    /// Drop buffered samples and the cached prediction
    pub fn reset(&mut self) {
        if let Some(queue) = self.queue.as_mut() {
            queue.clear();
        }
        self.last_prediction = None;
    }

    /// Replace the model handle, keeping buffered samples
    pub fn set_model(&mut self, model: M) {
        self.model = model;
    }

    /// Session configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl<M> std::fmt::Debug for ClassificationSession<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationSession")
            .field("config", &self.config)
            .field("buffered", &self.queue.as_ref().map(SampleQueue::len))
            .field("last_prediction", &self.last_prediction)
            .field("dispatches", &self.dispatches)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::{FnModel, ModelInput};
    use std::sync::{Arc, Mutex};

    type TestModel = FnModel<fn(&ModelInput) -> RfiResult<Vec<Vec<f32>>>>;

    fn radar_model() -> TestModel {
        fn score(input: &ModelInput) -> RfiResult<Vec<Vec<f32>>> {
            Ok(vec![vec![0.0, 0.1, 0.9, 0.0]; input.time_steps()])
        }
        FnModel(score as fn(&ModelInput) -> RfiResult<Vec<Vec<f32>>>)
    }

    fn buffered(time_window: usize) -> StreamConfig {
        StreamConfig {
            time_window,
            ..Default::default()
        }
    }

    /// `n` I/Q pairs numbered from `start`, interleaved
    fn pairs(start: usize, n: usize) -> Vec<f64> {
        (start..start + n).flat_map(|i| [i as f64, 1.0]).collect()
    }

    #[test]
    fn test_stale_result_until_threshold() {
        let mut s = ClassificationSession::new(radar_model(), buffered(2)).unwrap();
        assert_eq!(s.threshold(), 3072);

        assert_eq!(s.predict(&pairs(0, 1000)).unwrap(), None);
        assert_eq!(s.predict(&pairs(1000, 1000)).unwrap(), None);
        assert_eq!(s.dispatch_count(), 0);
        assert_eq!(s.buffered_len(), 2000);

        assert_eq!(s.predict(&pairs(2000, 1500)).unwrap(), Some(Label::Radar));
        assert_eq!(s.dispatch_count(), 1);
        assert_eq!(s.dispatched_samples(), 3072);
        assert_eq!(s.buffered_len(), 428);
    }

    #[test]
    fn test_exact_threshold_empties_queue() {
        let mut s = ClassificationSession::new(radar_model(), buffered(2)).unwrap();
        s.predict(&pairs(0, 3072)).unwrap();
        assert_eq!(s.buffered_len(), 0);
        assert_eq!(s.last_prediction(), Some(Label::Radar));
    }

    #[test]
    fn test_cached_result_returned_between_dispatches() {
        let mut s = ClassificationSession::new(radar_model(), buffered(2)).unwrap();
        s.predict(&pairs(0, 3100)).unwrap();
        assert_eq!(s.predict(&pairs(3100, 10)).unwrap(), Some(Label::Radar));
        assert_eq!(s.dispatch_count(), 1);
    }

    #[test]
    fn test_large_chunk_drains_to_below_threshold() {
        let mut s = ClassificationSession::new(radar_model(), buffered(2)).unwrap();
        s.predict(&pairs(0, 3 * 3072 + 5)).unwrap();
        assert_eq!(s.dispatch_count(), 3);
        assert_eq!(s.buffered_len(), 5);
    }

    #[test]
    fn test_multi_dispatch_chunk_returns_last_label() {
        let mut calls = 0usize;
        let alternating = FnModel(move |input: &ModelInput| -> RfiResult<Vec<Vec<f32>>> {
            let class = if calls % 2 == 0 { 2 } else { 5 };
            calls += 1;
            let mut row = vec![0.0; 6];
            row[class] = 1.0;
            Ok(vec![row; input.time_steps()])
        });
        let mut s = ClassificationSession::new(alternating, buffered(2)).unwrap();

        assert_eq!(s.predict(&pairs(0, 2 * 3072)).unwrap(), Some(Label::Lte));
        assert_eq!(s.dispatch_count(), 2);
        assert_eq!(s.buffered_len(), 0);
    }

    #[test]
    fn test_dispatched_payloads_preserve_stream_order() {
        let seen: Arc<Mutex<Vec<Complex64>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let mut s = ClassificationSession::new(radar_model(), buffered(2))
            .unwrap()
            .with_dispatch_observer(Box::new(move |payload| {
                assert_eq!(payload.len(), 3072);
                sink.lock().unwrap().extend_from_slice(payload);
            }));

        let sizes = [1000, 2500, 17, 4000, 3072, 1];
        let mut next = 0;
        for n in sizes {
            s.predict(&pairs(next, n)).unwrap();
            next += n;
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len() + s.buffered_len(), next);
        assert!(s.buffered_len() < s.threshold());
        for (i, sample) in seen.iter().enumerate() {
            assert_eq!(sample.re, i as f64);
        }
    }

    #[test]
    fn test_single_shot_is_stateless() {
        let mut s = ClassificationSession::new(radar_model(), StreamConfig::default()).unwrap();
        assert_eq!(s.predict(&pairs(0, 1536)).unwrap(), Some(Label::Radar));
        assert_eq!(s.buffered_len(), 0);
        assert!(s.predict(&pairs(0, 1000)).is_err());
    }

    #[test]
    fn test_odd_chunk_rejected() {
        let mut s = ClassificationSession::new(radar_model(), buffered(2)).unwrap();
        assert!(s.predict(&[1.0, 2.0, 3.0]).is_err());
        assert_eq!(s.buffered_len(), 0);
    }

    #[test]
    fn test_model_failure_propagates() {
        let failing = FnModel(|_: &ModelInput| -> RfiResult<Vec<Vec<f32>>> {
            Err(RfiError::Model("no weights".to_string()))
        });
        let mut s = ClassificationSession::new(failing, buffered(2)).unwrap();
        assert!(matches!(s.predict(&pairs(0, 3072)), Err(RfiError::Model(_))));
        assert_eq!(s.last_prediction(), None);
    }

    #[test]
    fn test_reset() {
        let mut s = ClassificationSession::new(radar_model(), buffered(2)).unwrap();
        s.predict(&pairs(0, 3500)).unwrap();
        s.reset();
        assert_eq!(s.buffered_len(), 0);
        assert_eq!(s.last_prediction(), None);
    }
}
