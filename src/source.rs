//! Landmark-detector seam and recorded-session replay.
//!
//! A replay file is JSON lines, one frame per line:
//!
//! ```text
//! {"size":{"width":640,"height":480},"hand":{"handedness":"Right","landmarks":[{"x":0.5,"y":0.5,"z":-0.05}, ...]}}
//! {"size":{"width":640,"height":480},"hand":null}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use crate::{
    landmarks::{FrameSize, LandmarkSet},
    pipeline::FrameReport,
    Error, Result,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    thread,
    time::{Duration, Instant},
};

/// Detector output for one camera frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameObservation {
    /// Camera frame dimensions
    pub size: FrameSize,
    /// First detected hand, if any
    #[serde(default)]
    pub hand: Option<LandmarkSet>,
}

impl FrameObservation {
    #[must_use]
    pub const fn new(size: FrameSize, hand: Option<LandmarkSet>) -> Self {
        Self { size, hand }
    }

    /// Frame in which the detector found no hand
    #[must_use]
    pub const fn empty(size: FrameSize) -> Self {
        Self { size, hand: None }
    }
}

/// Produces landmark frames and optionally renders results
pub trait LandmarkSource {
    /// Block until the next frame is available.
    ///
    /// `Ok(None)` marks the end of the stream; an error is fatal for the
    /// session.
    fn next_frame(&mut self) -> Result<Option<FrameObservation>>;

    /// Show the processed frame. Returns `false` when the user asked to exit.
    fn present(&mut self, _report: &FrameReport) -> Result<bool> {
        Ok(true)
    }
}

impl<T: LandmarkSource + ?Sized> LandmarkSource for Box<T> {
    fn next_frame(&mut self) -> Result<Option<FrameObservation>> {
        (**self).next_frame()
    }

    fn present(&mut self, report: &FrameReport) -> Result<bool> {
        (**self).present(report)
    }
}

/// Replays frames recorded as JSON lines
pub struct ReplaySource<R: BufRead> {
    reader: R,
    line_number: usize,
    frame_interval: Option<Duration>,
    last_frame: Option<Instant>,
    line: String,
}

impl ReplaySource<BufReader<File>> {
    /// Open a replay file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::IoError(format!("Failed to open replay {}: {e}", path.display())))?;
        info!("Replaying landmarks from {}", path.display());
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// Replay from any buffered reader
    pub const fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            frame_interval: None,
            last_frame: None,
            line: String::new(),
        }
    }

    /// Pace frames at `fps` instead of replaying as fast as possible
    #[must_use]
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.frame_interval = (fps.is_finite() && fps > 0.0).then(|| Duration::from_secs_f64(1.0 / fps));
        self
    }

    /// Line number of the most recently read line
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    fn pace(&mut self) {
        if let Some(interval) = self.frame_interval {
            if let Some(last) = self.last_frame {
                let elapsed = last.elapsed();
                if elapsed < interval {
                    thread::sleep(interval - elapsed);
                }
            }
            self.last_frame = Some(Instant::now());
        }
    }
}

impl<R: BufRead> LandmarkSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<FrameObservation>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| Error::Replay(format!("line {}: {e}", self.line_number + 1)))?;
            if read == 0 {
                debug!("Replay finished after {} lines", self.line_number);
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let frame: FrameObservation = serde_json::from_str(trimmed)
                .map_err(|e| Error::Replay(format!("line {}: {e}", self.line_number)))?;
            self.pace();
            return Ok(Some(frame));
        }
    }
}
