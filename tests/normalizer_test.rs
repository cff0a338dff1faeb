mod common;

use common::{IMG_W_H, hand};
use glam::{Vec2, Vec3};
use hand_gesture_pipeline::landmarks::Handedness;
use hand_gesture_pipeline::normalizer::{
    FEATURE_LEN, FeatureVector, normalize_landmarks, pre_process_pixels, project_to_pixels,
};
use hand_gesture_pipeline::synthetic::SyntheticPose;

#[test]
fn test_valid_hand_gives_42_scalars_with_wrist_at_origin() {
    for pose in SyntheticPose::ALL {
        for handedness in Handedness::ALL {
            let h = hand(pose, handedness);
            let features = normalize_landmarks(&h.landmarks, IMG_W_H);
            assert_eq!(features.len(), FEATURE_LEN);
            assert_eq!(features[0], 0.0);
            assert_eq!(features[1], 0.0);
            let max_abs = features.iter().fold(0.0f32, |m, v| m.max(v.abs()));
            assert!((max_abs - 1.0).abs() < 1e-6);
        }
    }
}

#[test]
fn test_projection_floors_and_clamps() {
    let landmarks = [
        Vec3::new(0.0, 0.0, 0.3),
        Vec3::new(0.5, 0.5, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.9999, 0.00999, 0.0),
    ];
    let pixels = project_to_pixels(&landmarks, (640, 480));
    assert_eq!(pixels[0], Vec2::new(0.0, 0.0));
    assert_eq!(pixels[1], Vec2::new(320.0, 240.0));
    assert_eq!(pixels[2], Vec2::new(639.0, 479.0));
    assert_eq!(pixels[3], Vec2::new(639.0, 4.0));
}

#[test]
fn test_known_values() {
    // wrist at (100, 100), two more points at (+50, 0) and (-100, +25)
    let pixels = [
        Vec2::new(100.0, 100.0),
        Vec2::new(150.0, 100.0),
        Vec2::new(0.0, 125.0),
    ];
    let features = pre_process_pixels(&pixels);
    let expected = [0.0, 0.0, 0.5, 0.0, -1.0, 0.25];
    assert_eq!(features.len(), expected.len());
    for (f, e) in features.iter().zip(expected) {
        assert!((f - e).abs() < 1e-6, "{} != {}", f, e);
    }
}

#[test]
fn test_scale_invariance() {
    let h = hand(SyntheticPose::Point, Handedness::Right);
    let pixels = project_to_pixels(&h.landmarks, IMG_W_H);
    let base = pre_process_pixels(&pixels);
    for factor in [0.25f32, 3.0, 17.5] {
        let scaled: Vec<Vec2> = pixels.iter().map(|p| *p * factor).collect();
        let features = pre_process_pixels(&scaled);
        for (a, b) in base.iter().zip(&features) {
            assert!((a - b).abs() < 1e-5);
        }
    }
}

#[test]
fn test_translation_invariance() {
    let h = hand(SyntheticPose::Fist, Handedness::Left);
    let pixels = project_to_pixels(&h.landmarks, IMG_W_H);
    let shifted: Vec<Vec2> = pixels.iter().map(|p| *p + Vec2::new(-42.0, 17.0)).collect();
    assert_eq!(pre_process_pixels(&pixels), pre_process_pixels(&shifted));
}

#[test]
fn test_degenerate_hand_is_all_zeros() {
    let landmarks = vec![Vec3::new(0.4, 0.4, 0.0); 21];
    let features = FeatureVector::from_landmarks(&landmarks, IMG_W_H).expect("21 landmarks");
    assert!(features.as_slice().iter().all(|v| *v == 0.0));
    assert!(features.as_slice().iter().all(|v| v.is_finite()));
}

#[test]
fn test_malformed_inputs_fail_the_gate() {
    let h = hand(SyntheticPose::OpenPalm, Handedness::Right);

    let short = &h.landmarks[..20];
    assert_eq!(normalize_landmarks(short, IMG_W_H).len(), 40);
    assert!(FeatureVector::from_landmarks(short, IMG_W_H).is_none());

    let mut long = h.landmarks.clone();
    long.push(Vec3::new(0.1, 0.1, 0.0));
    assert!(FeatureVector::from_landmarks(&long, IMG_W_H).is_none());

    assert!(normalize_landmarks(&[], IMG_W_H).is_empty());
    assert!(normalize_landmarks(&h.landmarks, (0, 480)).is_empty());
    assert!(FeatureVector::from_landmarks(&h.landmarks, (640, 0)).is_none());
}

#[test]
fn test_feature_vector_try_from() {
    assert!(FeatureVector::try_from(vec![0.5; FEATURE_LEN]).is_ok());
    let rejected = FeatureVector::try_from(vec![0.5; 41]).unwrap_err();
    assert_eq!(rejected.len(), 41);
}
