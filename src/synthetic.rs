use glam::{Vec2, Vec3};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::classifier::GestureId;
use crate::landmarks::{HAND_LANDMARK_COUNT, HandObservation, Handedness, TrackedFrame};

/// Nanoseconds between frames at 30 fps.
pub const FRAME_INTERVAL_NS: i64 = 33_333_333;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticPose {
    OpenPalm,
    Fist,
    Point,
}

impl SyntheticPose {
    pub const ALL: [SyntheticPose; 3] = [Self::OpenPalm, Self::Fist, Self::Point];

    /// Class label used when these poses feed a classifier.
    pub fn class_id(&self) -> GestureId {
        match self {
            Self::OpenPalm => 0,
            Self::Fist => 1,
            Self::Point => 2,
        }
    }
}

const OPEN_PALM: [(f32, f32); HAND_LANDMARK_COUNT] = [
    (0.0, 0.0),
    (-0.2, -0.1), (-0.35, -0.25), (-0.45, -0.4), (-0.55, -0.5),
    (-0.15, -0.5), (-0.17, -0.7), (-0.18, -0.85), (-0.19, -1.0),
    (0.0, -0.52), (0.0, -0.75), (0.0, -0.9), (0.0, -1.05),
    (0.13, -0.5), (0.15, -0.7), (0.16, -0.83), (0.17, -0.95),
    (0.25, -0.45), (0.3, -0.6), (0.33, -0.7), (0.36, -0.8),
];

const FIST: [(f32, f32); HAND_LANDMARK_COUNT] = [
    (0.0, 0.0),
    (-0.2, -0.1), (-0.3, -0.2), (-0.2, -0.35), (-0.1, -0.4),
    (-0.15, -0.5), (-0.17, -0.6), (-0.13, -0.45), (-0.12, -0.38),
    (0.0, -0.52), (0.0, -0.62), (0.01, -0.47), (0.01, -0.4),
    (0.13, -0.5), (0.14, -0.58), (0.13, -0.45), (0.12, -0.39),
    (0.25, -0.45), (0.27, -0.52), (0.25, -0.42), (0.23, -0.37),
];

const POINT: [(f32, f32); HAND_LANDMARK_COUNT] = [
    (0.0, 0.0),
    (-0.2, -0.1), (-0.3, -0.2), (-0.2, -0.35), (-0.1, -0.4),
    (-0.15, -0.5), (-0.17, -0.7), (-0.18, -0.85), (-0.19, -1.0),
    (0.0, -0.52), (0.0, -0.62), (0.01, -0.47), (0.01, -0.4),
    (0.13, -0.5), (0.14, -0.58), (0.13, -0.45), (0.12, -0.39),
    (0.25, -0.45), (0.27, -0.52), (0.25, -0.42), (0.23, -0.37),
];

/// Right-hand landmark offsets from the wrist, in hand-span units (y up is negative).
pub fn pose_template(pose: SyntheticPose) -> [Vec2; HAND_LANDMARK_COUNT] {
    let table = match pose {
        SyntheticPose::OpenPalm => OPEN_PALM,
        SyntheticPose::Fist => FIST,
        SyntheticPose::Point => POINT,
    };
    table.map(|(x, y)| Vec2::new(x, y))
}

pub struct HandSynthesizer {
    rng: ChaCha8Rng,
    jitter: f32,
}

impl HandSynthesizer {
    /// `jitter` is the per-coordinate uniform noise in normalized frame units.
    /// It is capped at one frame width; a non-finite jitter means no noise.
    pub fn new(seed: u64, jitter: f32) -> Self {
        let jitter = if jitter.is_finite() {
            jitter.abs().min(1.0)
        } else {
            0.0
        };
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            jitter,
        }
    }

    fn noise(&mut self) -> f32 {
        if self.jitter > 0.0 {
            self.rng.random_range(-self.jitter..self.jitter)
        } else {
            0.0
        }
    }

    /// A hand in `pose` with its wrist at `wrist` (normalized frame coordinates).
    /// Left hands are mirrored.
    pub fn sample(
        &mut self,
        pose: SyntheticPose,
        handedness: Handedness,
        wrist: Vec2,
        scale: f32,
    ) -> HandObservation {
        let mirror = match handedness {
            Handedness::Left => -1.0,
            Handedness::Right => 1.0,
        };
        let landmarks = pose_template(pose)
            .iter()
            .enumerate()
            .map(|(i, offset)| {
                let depth = -0.01 * i as f32;
                Vec3::new(
                    wrist.x + offset.x * scale * mirror + self.noise(),
                    wrist.y + offset.y * scale + self.noise(),
                    depth + self.noise(),
                )
            })
            .collect();
        let score = self.rng.random_range(0.85..1.0);
        HandObservation::new(handedness, landmarks, score)
    }

    /// A hand at a random position and size.
    pub fn sample_random(&mut self, pose: SyntheticPose, handedness: Handedness) -> HandObservation {
        let x = match handedness {
            Handedness::Left => self.rng.random_range(0.55..0.75),
            Handedness::Right => self.rng.random_range(0.25..0.45),
        };
        let wrist = Vec2::new(x, self.rng.random_range(0.6..0.85));
        let scale = self.rng.random_range(0.12..0.3);
        self.sample(pose, handedness, wrist, scale)
    }

    /// A recording where the right hand cycles through every pose, holding each
    /// for `segment_len` frames, and the left hand shows up on every other
    /// segment. About one frame in twenty loses part of a hand skeleton.
    pub fn recording(
        &mut self,
        num_frames: usize,
        img_w_h: (u32, u32),
        segment_len: usize,
    ) -> Vec<TrackedFrame> {
        let segment_len = segment_len.max(1);
        (0..num_frames)
            .map(|idx| {
                let segment = idx / segment_len;
                let right_pose = SyntheticPose::ALL[segment % SyntheticPose::ALL.len()];
                let mut hands = vec![self.sample_random(right_pose, Handedness::Right)];
                if segment % 2 == 1 {
                    let left_pose = SyntheticPose::ALL[(segment + 1) % SyntheticPose::ALL.len()];
                    hands.push(self.sample_random(left_pose, Handedness::Left));
                }
                if self.rng.random_bool(0.05) {
                    let keep = self.rng.random_range(5..HAND_LANDMARK_COUNT);
                    hands[0].landmarks.truncate(keep);
                }
                TrackedFrame {
                    time_ns: idx as i64 * FRAME_INTERVAL_NS,
                    img_w_h,
                    hands,
                }
            })
            .collect()
    }
}
