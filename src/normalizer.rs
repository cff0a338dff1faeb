use glam::Vec2;

use crate::landmarks::{HAND_LANDMARK_COUNT, Point3, WRIST};

/// Number of scalars in a valid feature vector (x, y per landmark).
pub const FEATURE_LEN: usize = HAND_LANDMARK_COUNT * 2;

/// Translation and scale normalized pose of one hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_LEN]);

impl FeatureVector {
    /// Normalizes a hand, returning `None` when the landmarks are malformed.
    pub fn from_landmarks(landmarks: &[Point3], img_w_h: (u32, u32)) -> Option<FeatureVector> {
        FeatureVector::try_from(normalize_landmarks(landmarks, img_w_h)).ok()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl TryFrom<Vec<f32>> for FeatureVector {
    type Error = Vec<f32>;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        <[f32; FEATURE_LEN]>::try_from(values).map(FeatureVector)
    }
}

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Projects normalized landmarks into integer pixel positions of the frame.
///
/// Coordinates are floored and clamped to the last pixel row/column; z is dropped.
pub fn project_to_pixels(landmarks: &[Point3], img_w_h: (u32, u32)) -> Vec<Vec2> {
    let (w, h) = img_w_h;
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let (w, h) = (w as f32, h as f32);
    landmarks
        .iter()
        .map(|p| {
            Vec2::new(
                (p.x * w).floor().min(w - 1.0),
                (p.y * h).floor().min(h - 1.0),
            )
        })
        .collect()
}

/// Translates pixel points to the wrist, flattens and scales them into [-1, 1].
///
/// A degenerate hand (every point on the wrist) yields all zeros.
pub fn pre_process_pixels(pixels: &[Vec2]) -> Vec<f32> {
    let Some(base) = pixels.get(WRIST).copied() else {
        return Vec::new();
    };
    let flat: Vec<f32> = pixels
        .iter()
        .flat_map(|p| {
            let d = *p - base;
            [d.x, d.y]
        })
        .collect();
    let max_value = flat.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    if max_value == 0.0 || !max_value.is_finite() {
        return vec![0.0; flat.len()];
    }
    flat.iter().map(|v| v / max_value).collect()
}

/// Full normalization of one hand.
///
/// The output length is twice the landmark count; only a 42-scalar result is a
/// valid [`FeatureVector`]. An empty result means the frame size was zero or no
/// landmarks were given.
pub fn normalize_landmarks(landmarks: &[Point3], img_w_h: (u32, u32)) -> Vec<f32> {
    pre_process_pixels(&project_to_pixels(landmarks, img_w_h))
}
