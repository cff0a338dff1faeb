use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use rerun::RecordingStream;
use serde::Serialize;

use crate::classifier::{Classifier, ClassificationResult, ClassifierHandle, GestureId};
use crate::config::PipelineConfig;
use crate::confirmation::{ConfirmationParams, ConfirmationTable, HandConfirmation};
use crate::error::{ClassifierError, PipelineError};
use crate::landmarks::{Handedness, Point3, TrackedFrame, average_position};
use crate::normalizer::FeatureVector;
use crate::registry::{self, GestureEvent, GestureRegistry, GestureSubscriber, SubscriberId};
use crate::tracker::Tracker;
use crate::visualization;

const DEBUG_TOPIC: &str = "hands";

/// One hand that passed normalization this frame.
struct HandJob {
    handedness: Handedness,
    features: FeatureVector,
    average_position: Point3,
}

/// Totals of a [`GesturePipeline::run`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub frames: usize,
    pub events: usize,
    pub tracker_errors: usize,
}

/// Frame loop: normalize, classify, confirm, dispatch.
///
/// Hands of one frame are classified concurrently on a two-worker rayon pool
/// and the frame waits for all of them before touching confirmation state. Each
/// hand slot has at most one classification in flight; a hand whose previous
/// call is still running is skipped, and with `classify_timeout_ms` set the
/// frame stops waiting at the deadline and drops the late hands.
pub struct GesturePipeline {
    config: PipelineConfig,
    params: ConfirmationParams,
    classifier: Arc<ClassifierHandle>,
    registry: Arc<RwLock<GestureRegistry>>,
    confirmations: ConfirmationTable,
    in_flight: [Arc<AtomicBool>; 2],
    workers: rayon::ThreadPool,
    last_time_ns: Option<i64>,
    frame_idx: u64,
    recording: Option<RecordingStream>,
}

impl GesturePipeline {
    pub fn new(
        config: PipelineConfig,
        classifier: Arc<ClassifierHandle>,
    ) -> Result<GesturePipeline, PipelineError> {
        config.validate()?;
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(Handedness::ALL.len())
            .thread_name(|i| format!("gesture-classify-{}", i))
            .build()?;
        Ok(GesturePipeline {
            params: ConfirmationParams::from(&config),
            config,
            classifier,
            registry: Arc::new(RwLock::new(GestureRegistry::new())),
            confirmations: ConfirmationTable::default(),
            in_flight: [Arc::new(AtomicBool::new(false)), Arc::new(AtomicBool::new(false))],
            workers,
            last_time_ns: None,
            frame_idx: 0,
            recording: None,
        })
    }

    /// Shares an existing registry instead of the pipeline's own.
    pub fn with_registry(mut self, registry: Arc<RwLock<GestureRegistry>>) -> Self {
        self.registry = registry;
        self
    }

    /// Attaches a rerun stream, written to only when `config.debug` is set.
    pub fn with_recording(mut self, recording: RecordingStream) -> Self {
        self.recording = Some(recording);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Arc<ClassifierHandle> {
        &self.classifier
    }

    pub fn registry(&self) -> Arc<RwLock<GestureRegistry>> {
        Arc::clone(&self.registry)
    }

    pub fn subscribe<I>(
        &self,
        gesture_ids: I,
        id: impl Into<SubscriberId>,
        subscriber: Arc<dyn GestureSubscriber>,
    ) where
        I: IntoIterator<Item = GestureId>,
    {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(gesture_ids, id, subscriber);
    }

    pub fn unsubscribe(&self, id: &SubscriberId) -> bool {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .unregister(id)
    }

    pub fn confirmation(&self, hand: Handedness) -> &HandConfirmation {
        self.confirmations.get(hand)
    }

    /// Number of frames processed, duplicates excluded.
    pub fn frames_processed(&self) -> u64 {
        self.frame_idx
    }

    /// Clears confirmation progress and the duplicate-frame guard.
    pub fn reset(&mut self) {
        self.confirmations.reset();
        self.last_time_ns = None;
    }

    /// Runs one frame through the pipeline and returns the gestures it confirmed.
    /// Frames are strictly sequential.
    pub fn process_frame(&mut self, frame: &TrackedFrame) -> Vec<GestureEvent> {
        if self.last_time_ns == Some(frame.time_ns) {
            log::trace!("frame at {} ns already processed", frame.time_ns);
            return Vec::new();
        }
        self.last_time_ns = Some(frame.time_ns);
        self.frame_idx += 1;

        if let Some(recording) = self.debug_recording() {
            if let Err(e) = visualization::log_frame(recording, DEBUG_TOPIC, self.frame_idx, frame) {
                log::warn!("failed to log frame {}: {}", self.frame_idx, e);
            }
        }

        let jobs = self.collect_hands(frame);
        if jobs.is_empty() {
            return Vec::new();
        }
        let Some(classifier) = self.classifier.current() else {
            log::debug!("classifier not ready, frame {} skipped", self.frame_idx);
            return Vec::new();
        };
        let results = self.classify_batch(&classifier, &jobs);

        let mut events = Vec::new();
        for (job, result) in jobs.iter().zip(results) {
            let Some(result) = result else {
                continue;
            };
            let Some(gesture_id) = self.confirmations.observe(job.handedness, result, &self.params)
            else {
                continue;
            };
            let event = GestureEvent {
                gesture_id,
                handedness: job.handedness,
                average_position: job.average_position,
                time_ns: frame.time_ns,
            };
            let delivered = self.dispatch(&event);
            log::info!(
                "gesture {} confirmed on {} hand, delivered to {} subscriber(s)",
                gesture_id,
                job.handedness,
                delivered
            );
            if let Some(recording) = self.debug_recording() {
                if let Err(e) =
                    visualization::log_gesture_event(recording, DEBUG_TOPIC, &event, frame.img_w_h)
                {
                    log::warn!("failed to log gesture {}: {}", gesture_id, e);
                }
            }
            events.push(event);
        }
        events
    }

    /// Drives the pipeline until the tracker runs dry. Tracker errors skip the
    /// poll and the loop carries on.
    pub fn run<T: Tracker + ?Sized>(&mut self, tracker: &mut T) -> RunStats {
        let mut stats = RunStats::default();
        loop {
            match tracker.next_frame() {
                Ok(Some(frame)) => {
                    stats.frames += 1;
                    stats.events += self.process_frame(&frame).len();
                }
                Ok(None) => break,
                Err(e) => {
                    stats.tracker_errors += 1;
                    log::warn!("tracker failed, waiting for next frame: {}", e);
                }
            }
        }
        stats
    }

    fn debug_recording(&self) -> Option<&RecordingStream> {
        if self.config.debug {
            self.recording.as_ref()
        } else {
            None
        }
    }

    /// Normalizes every hand, keeping the first complete observation per handedness.
    fn collect_hands(&self, frame: &TrackedFrame) -> Vec<HandJob> {
        let mut seen = [false; 2];
        let mut jobs = Vec::with_capacity(frame.hands.len().min(2));
        for hand in &frame.hands {
            let slot = hand.handedness.index();
            if seen[slot] {
                log::debug!("extra {} hand in frame {} dropped", hand.handedness, self.frame_idx);
                continue;
            }
            let Some(features) = FeatureVector::from_landmarks(&hand.landmarks, frame.img_w_h)
            else {
                log::debug!(
                    "{} hand with {} landmarks skipped in frame {}",
                    hand.handedness,
                    hand.landmarks.len(),
                    self.frame_idx
                );
                continue;
            };
            let Some(average_position) = average_position(&hand.landmarks) else {
                continue;
            };
            seen[slot] = true;
            jobs.push(HandJob {
                handedness: hand.handedness,
                features,
                average_position,
            });
        }
        jobs
    }

    /// Classifies all jobs concurrently. The returned vector lines up with
    /// `jobs`; `None` marks a hand that was busy, failed or missed the deadline.
    fn classify_batch(
        &self,
        classifier: &Arc<dyn Classifier>,
        jobs: &[HandJob],
    ) -> Vec<Option<ClassificationResult>> {
        let (tx, rx) = mpsc::channel();
        let mut pending = 0usize;
        for (idx, job) in jobs.iter().enumerate() {
            let busy = &self.in_flight[job.handedness.index()];
            if busy.swap(true, Ordering::AcqRel) {
                log::warn!(
                    "{} hand still waiting on a previous classification, skipped",
                    job.handedness
                );
                continue;
            }
            let busy = Arc::clone(busy);
            let classifier = Arc::clone(classifier);
            let features = job.features;
            let tx = tx.clone();
            pending += 1;
            self.workers.spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| classifier.classify(&features)))
                    .unwrap_or_else(|_| {
                        Err(ClassifierError::Inference("classifier panicked".to_string()))
                    });
                busy.store(false, Ordering::Release);
                // receiver is gone when the frame already hit its deadline
                let _ = tx.send((idx, result));
            });
        }
        drop(tx);

        let mut results = vec![None; jobs.len()];
        let deadline = self
            .config
            .classify_timeout_ms
            .map(|ms| (ms, Instant::now() + Duration::from_millis(ms)));
        while pending > 0 {
            let received = match deadline {
                Some((_, deadline)) => rx
                    .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                    .map_err(|e| e == RecvTimeoutError::Timeout),
                None => rx.recv().map_err(|_| false),
            };
            match received {
                Ok((idx, Ok(result))) => results[idx] = Some(result),
                Ok((idx, Err(e))) => {
                    log::warn!("{} hand classification failed: {}", jobs[idx].handedness, e);
                }
                Err(timed_out) => {
                    if let (true, Some((limit_ms, _))) = (timed_out, deadline) {
                        log::warn!(
                            "{} hand(s) dropped in frame {}: {}",
                            pending,
                            self.frame_idx,
                            ClassifierError::Timeout { limit_ms }
                        );
                    }
                    break;
                }
            }
            pending -= 1;
        }
        results
    }

    fn dispatch(&self, event: &GestureEvent) -> usize {
        let subscribers = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers_for(event.gesture_id);
        registry::deliver(&subscribers, event)
    }
}
