use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rerun::{RecordingStream, RecordingStreamResult, TimeCell};

use crate::landmarks::{HandObservation, Handedness, TrackedFrame};
use crate::normalizer::project_to_pixels;
use crate::registry::GestureEvent;

pub fn id_to_color(id: usize) -> (u8, u8, u8, u8) {
    let mut rng = ChaCha8Rng::seed_from_u64(id as u64);
    let color_num = rng.random_range(0..2u32.pow(24));
    (
        ((color_num >> 16) % 256) as u8,
        ((color_num >> 8) % 256) as u8,
        (color_num % 256) as u8,
        255,
    )
}

pub fn hand_color(handedness: Handedness) -> (u8, u8, u8, u8) {
    let c = colorous::CATEGORY10[handedness.index()];
    (c.r, c.g, c.b, 255)
}

/// rerun use top left corner as (0, 0)
pub fn rerun_shift(p2ds: &[(f32, f32)]) -> Vec<(f32, f32)> {
    p2ds.iter().map(|(x, y)| (*x + 0.5, *y + 0.5)).collect()
}

pub fn set_frame_time(recording: &RecordingStream, frame_idx: u64, time_ns: i64) {
    recording.set_time("frame", TimeCell::from_sequence(frame_idx as i64));
    recording.set_time("stable", TimeCell::from_timestamp_nanos_since_epoch(time_ns));
}

/// Logs one hand's landmarks in pixel space, labelled by landmark index.
pub fn log_hand(
    recording: &RecordingStream,
    topic: &str,
    hand: &HandObservation,
    img_w_h: (u32, u32),
) -> RecordingStreamResult<()> {
    let pts: Vec<(f32, f32)> = project_to_pixels(&hand.landmarks, img_w_h)
        .iter()
        .map(|p| (p.x, p.y))
        .collect();
    let labels: Vec<String> = (0..pts.len()).map(|i| i.to_string()).collect();
    let pts = rerun_shift(&pts);
    recording.log(
        format!("{}/{}/pts", topic, hand.handedness.as_str().to_lowercase()),
        &rerun::Points2D::new(pts)
            .with_colors([hand_color(hand.handedness)])
            .with_labels(labels)
            .with_radii([rerun::Radius::new_ui_points(4.0)]),
    )
}

pub fn log_frame(
    recording: &RecordingStream,
    topic: &str,
    frame_idx: u64,
    frame: &TrackedFrame,
) -> RecordingStreamResult<()> {
    set_frame_time(recording, frame_idx, frame.time_ns);
    for hand in &frame.hands {
        log_hand(recording, topic, hand, frame.img_w_h)?;
    }
    Ok(())
}

/// Logs a fired gesture as a text entry and a marker at the hand position.
pub fn log_gesture_event(
    recording: &RecordingStream,
    topic: &str,
    event: &GestureEvent,
    img_w_h: (u32, u32),
) -> RecordingStreamResult<()> {
    recording.log(
        format!("{}/events", topic),
        &rerun::TextLog::new(format!(
            "gesture {} ({} hand)",
            event.gesture_id, event.handedness
        ))
        .with_level(rerun::TextLogLevel::INFO),
    )?;
    let p = event.average_position;
    let center = (p.x * img_w_h.0 as f32, p.y * img_w_h.1 as f32);
    recording.log(
        format!("{}/{}/gesture", topic, event.handedness.as_str().to_lowercase()),
        &rerun::Points2D::new(rerun_shift(&[center]))
            .with_colors([id_to_color(event.gesture_id as usize)])
            .with_labels([event.gesture_id.to_string()])
            .with_radii([rerun::Radius::new_ui_points(12.0)]),
    )
}
