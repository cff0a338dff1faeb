use std::path::{Path, PathBuf};

use glob::glob;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

use crate::error::TrackerError;
use crate::io;
use crate::landmarks::TrackedFrame;

/// Source of per-frame hand observations.
pub trait Tracker {
    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<TrackedFrame>, TrackerError>;
}

/// Replays previously recorded frames in order.
pub struct RecordedTracker {
    frames: std::vec::IntoIter<TrackedFrame>,
}

impl RecordedTracker {
    pub fn new(frames: Vec<TrackedFrame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }

    /// Opens a recording file, or every recording inside a folder.
    pub fn open(path: &Path) -> Result<Self, TrackerError> {
        let frames = if path.is_dir() {
            load_recordings(path)?
        } else {
            load_recording(path)?
        };
        Ok(Self::new(frames))
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl Tracker for RecordedTracker {
    fn next_frame(&mut self) -> Result<Option<TrackedFrame>, TrackerError> {
        Ok(self.frames.next())
    }
}

/// Loads one recording: a JSON array of frames.
pub fn load_recording(path: &Path) -> Result<Vec<TrackedFrame>, TrackerError> {
    io::object_from_json::<_, TrackerError>(path)
}

/// Writes frames as a recording readable by [`load_recording`].
pub fn save_recording(path: &Path, frames: &[TrackedFrame]) -> Result<(), TrackerError> {
    io::object_to_json::<_, TrackerError>(path, &frames)
}

/// Loads every `*.json` recording under `root_folder` in parallel and merges
/// them in timestamp order.
pub fn load_recordings(root_folder: &Path) -> Result<Vec<TrackedFrame>, TrackerError> {
    let pattern = format!("{}/*.json", root_folder.display());
    let mut sorted_path = glob(&pattern)?.collect::<Result<Vec<PathBuf>, _>>()?;
    sorted_path.sort();
    log::trace!("loading {} recordings from {}", sorted_path.len(), root_folder.display());

    let recordings: Vec<Vec<TrackedFrame>> = sorted_path
        .par_iter()
        .progress_count(sorted_path.len() as u64)
        .map(|path| load_recording(path))
        .collect::<Result<_, _>>()?;

    let mut frames: Vec<TrackedFrame> = recordings.into_iter().flatten().collect();
    frames.sort_by_key(|f| f.time_ns);
    Ok(frames)
}
