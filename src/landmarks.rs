use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Landmarks per hand produced by the tracker.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Index of the wrist landmark, used as the translation origin.
pub const WRIST: usize = 0;

/// A tracked keypoint in normalized [0, 1] frame-relative space.
pub type Point3 = Vec3;

/// Which hand an observation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub const ALL: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    /// Slot index (0-1) for per-hand tables.
    pub fn index(&self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected hand in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub handedness: Handedness,
    pub landmarks: Vec<Point3>,
    /// Detector confidence, passed through untouched.
    #[serde(default)]
    pub score: f32,
}

impl HandObservation {
    pub fn new(handedness: Handedness, landmarks: Vec<Point3>, score: f32) -> Self {
        Self {
            handedness,
            landmarks,
            score,
        }
    }

    /// Whether the observation carries a full hand skeleton.
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= HAND_LANDMARK_COUNT
    }
}

/// Everything the tracker returns for a single video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedFrame {
    pub time_ns: i64,
    /// Pixel size of the video frame.
    pub img_w_h: (u32, u32),
    #[serde(default)]
    pub hands: Vec<HandObservation>,
}

/// Mean position of all landmarks, `None` for an empty list.
pub fn average_position(landmarks: &[Point3]) -> Option<Point3> {
    if landmarks.is_empty() {
        return None;
    }
    let sum: Vec3 = landmarks.iter().copied().sum();
    Some(sum / landmarks.len() as f32)
}
