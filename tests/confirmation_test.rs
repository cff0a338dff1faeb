use hand_gesture_pipeline::classifier::ClassificationResult;
use hand_gesture_pipeline::config::LowConfidencePolicy;
use hand_gesture_pipeline::confirmation::{ConfirmationParams, ConfirmationTable, HandConfirmation};
use hand_gesture_pipeline::landmarks::Handedness;

fn params(threshold: u32) -> ConfirmationParams {
    ConfirmationParams {
        threshold,
        min_confidence: 0.7,
        low_confidence_policy: LowConfidencePolicy::Reset,
    }
}

fn feed(state: &mut HandConfirmation, frames: &[(u32, f32)], params: &ConfirmationParams) -> Vec<Option<u32>> {
    frames
        .iter()
        .map(|&(class_id, confidence)| state.observe(ClassificationResult::new(class_id, confidence), params))
        .collect()
}

#[test]
fn test_defaults_follow_config() {
    let p = ConfirmationParams::default();
    assert_eq!(p.threshold, 10);
    assert!((p.min_confidence - 0.7).abs() < 1e-6);
    assert_eq!(p.low_confidence_policy, LowConfidencePolicy::Reset);
}

#[test]
fn test_fires_once_at_threshold() {
    let p = params(4);
    let mut state = HandConfirmation::default();
    let fired = feed(&mut state, &[(3, 0.9); 4], &p);
    assert_eq!(fired, vec![None, None, None, Some(3)]);
    assert!(state.is_idle());
    assert_eq!(state.pending(), Some(3));
}

#[test]
fn test_held_pose_fires_every_threshold_frames() {
    let p = params(3);
    let mut state = HandConfirmation::default();
    let fired = feed(&mut state, &[(1, 0.95); 7], &p);
    let count = fired.iter().filter(|f| f.is_some()).count();
    assert_eq!(count, 2);
    assert_eq!(fired[2], Some(1));
    assert_eq!(fired[5], Some(1));
    assert_eq!(state.count(), 1);
}

#[test]
fn test_class_change_restarts_run() {
    let p = params(3);
    let mut state = HandConfirmation::default();
    let fired = feed(&mut state, &[(1, 0.9), (1, 0.9), (2, 0.9), (1, 0.9), (1, 0.9)], &p);
    assert!(fired.iter().all(|f| f.is_none()));
    assert_eq!(state.pending(), Some(1));
    assert_eq!(state.count(), 2);
}

#[test]
fn test_low_confidence_resets_run() {
    let p = params(3);
    let mut state = HandConfirmation::default();
    let fired = feed(
        &mut state,
        &[(5, 0.9), (5, 0.9), (5, 0.5), (5, 0.9), (5, 0.9), (5, 0.9)],
        &p,
    );
    assert_eq!(fired, vec![None, None, None, None, None, Some(5)]);
}

#[test]
fn test_low_confidence_resets_to_idle() {
    let p = params(3);
    let mut state = HandConfirmation::default();
    feed(&mut state, &[(5, 0.9), (5, 0.69)], &p);
    assert_eq!(state, HandConfirmation::default());
}

#[test]
fn test_ignore_policy_leaves_run_untouched() {
    let p = ConfirmationParams {
        low_confidence_policy: LowConfidencePolicy::Ignore,
        ..params(3)
    };
    let mut state = HandConfirmation::default();
    let fired = feed(&mut state, &[(5, 0.9), (5, 0.9), (5, 0.1), (5, 0.9)], &p);
    assert_eq!(fired, vec![None, None, None, Some(5)]);
}

#[test]
fn test_confidence_equal_to_threshold_qualifies() {
    let p = params(1);
    let mut state = HandConfirmation::default();
    assert_eq!(feed(&mut state, &[(9, 0.7)], &p), vec![Some(9)]);
}

#[test]
fn test_nan_confidence_never_qualifies() {
    let p = params(1);
    let mut state = HandConfirmation::default();
    assert_eq!(feed(&mut state, &[(9, f32::NAN)], &p), vec![None]);
    assert!(state.is_idle());
}

#[test]
fn test_hands_are_isolated() {
    let p = params(2);
    let mut table = ConfirmationTable::default();
    let r = |c| ClassificationResult::new(c, 0.9);
    assert_eq!(table.observe(Handedness::Left, r(1), &p), None);
    assert_eq!(table.observe(Handedness::Right, r(2), &p), None);
    assert_eq!(table.observe(Handedness::Left, r(1), &p), Some(1));
    assert_eq!(table.get(Handedness::Right).count(), 1);
    assert_eq!(table.get(Handedness::Right).pending(), Some(2));

    table.reset();
    assert!(table.get(Handedness::Right).is_idle());
    assert_eq!(table.get(Handedness::Left).pending(), None);
}
