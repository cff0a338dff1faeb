use crate::classifier::{ClassificationResult, GestureId};
use crate::config::{LowConfidencePolicy, PipelineConfig};
use crate::landmarks::Handedness;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfirmationParams {
    pub threshold: u32,
    pub min_confidence: f32,
    pub low_confidence_policy: LowConfidencePolicy,
}

impl From<&PipelineConfig> for ConfirmationParams {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            threshold: config.confirmation_threshold,
            min_confidence: config.confidence_threshold,
            low_confidence_policy: config.low_confidence_policy,
        }
    }
}

impl Default for ConfirmationParams {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

/// Run-length state of one hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandConfirmation {
    pending: Option<GestureId>,
    count: u32,
}

impl HandConfirmation {
    pub fn pending(&self) -> Option<GestureId> {
        self.pending
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_idle(&self) -> bool {
        self.count == 0
    }

    pub fn reset(&mut self) {
        *self = HandConfirmation::default();
    }

    /// Feeds one frame's prediction, returning the gesture if this frame
    /// completes a run.
    pub fn observe(
        &mut self,
        result: ClassificationResult,
        params: &ConfirmationParams,
    ) -> Option<GestureId> {
        // NaN never qualifies
        if !(result.confidence >= params.min_confidence) {
            if params.low_confidence_policy == LowConfidencePolicy::Reset {
                self.reset();
            }
            return None;
        }

        if self.count == 0 || self.pending != Some(result.class_id) {
            self.pending = Some(result.class_id);
            self.count = 1;
        } else {
            self.count += 1;
        }

        if self.count >= params.threshold {
            self.count = 0;
            return self.pending;
        }
        None
    }
}

/// Confirmation state for both hands, indexed by [`Handedness`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationTable {
    hands: [HandConfirmation; 2],
}

impl ConfirmationTable {
    pub fn get(&self, hand: Handedness) -> &HandConfirmation {
        &self.hands[hand.index()]
    }

    pub fn observe(
        &mut self,
        hand: Handedness,
        result: ClassificationResult,
        params: &ConfirmationParams,
    ) -> Option<GestureId> {
        let state = &mut self.hands[hand.index()];
        let confirmed = state.observe(result, params);
        log::trace!(
            "{} hand: class {} conf {:.3} -> pending {:?} count {}",
            hand,
            result.class_id,
            result.confidence,
            state.pending(),
            state.count()
        );
        confirmed
    }

    pub fn reset(&mut self) {
        self.hands = Default::default();
    }
}
