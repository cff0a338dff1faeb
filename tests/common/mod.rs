#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use glam::{Vec2, Vec3};
use hand_gesture_pipeline::classifier::{ClassificationResult, Classifier};
use hand_gesture_pipeline::error::ClassifierError;
use hand_gesture_pipeline::landmarks::{HandObservation, Handedness, TrackedFrame};
use hand_gesture_pipeline::normalizer::FeatureVector;
use hand_gesture_pipeline::registry::{GestureEvent, GestureSubscriber};
use hand_gesture_pipeline::synthetic::{HandSynthesizer, SyntheticPose};

pub const IMG_W_H: (u32, u32) = (640, 480);

/// Noise-free hand in `pose` centered in the frame.
pub fn hand(pose: SyntheticPose, handedness: Handedness) -> HandObservation {
    HandSynthesizer::new(0, 0.0).sample(pose, handedness, Vec2::new(0.5, 0.75), 0.3)
}

pub fn frame(time_ns: i64, hands: Vec<HandObservation>) -> TrackedFrame {
    TrackedFrame {
        time_ns,
        img_w_h: IMG_W_H,
        hands,
    }
}

pub fn right_frame(time_ns: i64) -> TrackedFrame {
    frame(time_ns, vec![hand(SyntheticPose::OpenPalm, Handedness::Right)])
}

/// Hand skeleton cut short to `count` landmarks.
pub fn partial_hand(handedness: Handedness, count: usize) -> HandObservation {
    let mut h = hand(SyntheticPose::OpenPalm, handedness);
    h.landmarks.truncate(count);
    h
}

/// Left hands are mirrored, so the thumb base points to +x in feature space.
pub fn is_left(features: &FeatureVector) -> bool {
    features.as_slice()[2] > 0.0
}

/// Pops one scripted prediction per call; falls back to `fallback`.
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<ClassificationResult>>,
    fallback: ClassificationResult,
}

impl ScriptedClassifier {
    pub fn new(script: &[(u32, f32)]) -> Self {
        Self {
            script: Mutex::new(
                script
                    .iter()
                    .map(|&(c, p)| ClassificationResult::new(c, p))
                    .collect(),
            ),
            fallback: ClassificationResult::new(0, 0.0),
        }
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&self, _features: &FeatureVector) -> Result<ClassificationResult, ClassifierError> {
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback))
    }
}

/// Always predicts the same class.
pub fn constant(class_id: u32, confidence: f32) -> impl Classifier {
    move |_: &FeatureVector| Ok::<_, ClassifierError>(ClassificationResult::new(class_id, confidence))
}

#[derive(Default)]
pub struct RecordingSubscriber {
    pub events: Mutex<Vec<GestureEvent>>,
}

impl RecordingSubscriber {
    pub fn events(&self) -> Vec<GestureEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl GestureSubscriber for RecordingSubscriber {
    fn on_gesture(&self, event: &GestureEvent) {
        self.events.lock().unwrap().push(*event);
    }
}

pub fn event(gesture_id: u32, handedness: Handedness) -> GestureEvent {
    GestureEvent {
        gesture_id,
        handedness,
        average_position: Vec3::ZERO,
        time_ns: 0,
    }
}
