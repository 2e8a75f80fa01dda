//! Main application loop.
//!
//! One thread, one frame at a time: acquire, process, dispatch, present,
//! then check for a stop request. Whatever ends the session, the pipeline
//! is shut down before [`GestureMouseApp::run`] returns so no button stays
//! pressed.

use crate::{
    gesture::GestureCategory,
    input::InputSink,
    pipeline::GesturePipeline,
    source::LandmarkSource,
    Result,
};
use log::{debug, error, info};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Set by the SIGINT/SIGTERM handlers
static SIGNAL_RECEIVED: AtomicBool = AtomicBool::new(false);

extern "C" fn signal_handler(_sig: libc::c_int) {
    SIGNAL_RECEIVED.store(true, Ordering::SeqCst);
}

/// Cooperative stop request, checked once per frame
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    requested: Arc<AtomicBool>,
    watch_signals: bool,
}

impl StopFlag {
    /// Flag that is only set programmatically
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after the current frame
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst) || (self.watch_signals && SIGNAL_RECEIVED.load(Ordering::SeqCst))
    }
}

/// Install SIGINT/SIGTERM handlers and return a flag that observes them
#[must_use]
pub fn install_signal_handlers() -> StopFlag {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
    StopFlag {
        requested: Arc::new(AtomicBool::new(false)),
        watch_signals: true,
    }
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source ran out of frames
    EndOfStream,
    /// Stop flag or signal
    StopRequested,
    /// The user closed the overlay
    UserExit,
    /// Configured frame limit reached
    FrameLimit,
}

/// Summary of a finished session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// Frames processed
    pub frames: u64,
    /// Frames with a detected hand
    pub hand_frames: u64,
    /// Frames per acted-upon gesture
    pub gesture_frames: HashMap<GestureCategory, u64>,
    /// Average frame rate over the session
    pub fps: f64,
    /// Wall time of the loop
    pub elapsed: Duration,
    pub reason: StopReason,
}

impl SessionStats {
    /// Frames in which `gesture` was acted upon
    #[must_use]
    pub fn frames_with(&self, gesture: GestureCategory) -> u64 {
        self.gesture_frames.get(&gesture).copied().unwrap_or(0)
    }
}

/// Drives a [`GesturePipeline`] from a [`LandmarkSource`]
pub struct GestureMouseApp<Src: LandmarkSource, S: InputSink> {
    source: Src,
    pipeline: GesturePipeline<S>,
    stop: StopFlag,
    max_frames: Option<u64>,
}

impl<Src: LandmarkSource, S: InputSink> GestureMouseApp<Src, S> {
    pub fn new(source: Src, pipeline: GesturePipeline<S>, stop: StopFlag) -> Self {
        info!("Initializing hand gesture mouse");
        Self {
            source,
            pipeline,
            stop,
            max_frames: None,
        }
    }

    /// Stop after `limit` frames
    #[must_use]
    pub fn with_max_frames(mut self, limit: Option<u64>) -> Self {
        self.max_frames = limit;
        self
    }

    #[must_use]
    pub const fn pipeline(&self) -> &GesturePipeline<S> {
        &self.pipeline
    }

    #[must_use]
    pub const fn stop_flag(&self) -> &StopFlag {
        &self.stop
    }

    /// Run until the source ends, the user exits or a stop is requested.
    ///
    /// # Errors
    ///
    /// Returns the first frame-acquisition or presentation error. The
    /// pipeline has been shut down by then.
    pub fn run(&mut self) -> Result<SessionStats> {
        info!("Starting main application loop");
        let start_time = Instant::now();
        let mut stats = SessionStats {
            frames: 0,
            hand_frames: 0,
            gesture_frames: HashMap::new(),
            fps: 0.0,
            elapsed: Duration::ZERO,
            reason: StopReason::EndOfStream,
        };

        let result = self.run_loop(&mut stats, start_time);

        let released = self.pipeline.shutdown();
        if !released.is_empty() {
            info!("Released {} held button(s) on shutdown", released.len());
        }
        info!("Application shutting down");

        stats.elapsed = start_time.elapsed();
        stats.fps = average_fps(stats.frames, stats.elapsed);

        match result {
            Ok(reason) => {
                stats.reason = reason;
                info!(
                    "Session ended ({:?}) after {} frames at {:.1} FPS",
                    reason, stats.frames, stats.fps
                );
                Ok(stats)
            }
            Err(e) => {
                error!("Session aborted after {} frames: {e}", stats.frames);
                Err(e)
            }
        }
    }

    fn run_loop(&mut self, stats: &mut SessionStats, start_time: Instant) -> Result<StopReason> {
        let mut last_fps_update = Instant::now();

        loop {
            if self.stop.is_stop_requested() {
                info!("Stop requested");
                return Ok(StopReason::StopRequested);
            }
            if self.max_frames.is_some_and(|limit| stats.frames >= limit) {
                info!("Frame limit reached");
                return Ok(StopReason::FrameLimit);
            }

            let Some(frame) = self.source.next_frame()? else {
                info!("End of landmark stream reached");
                return Ok(StopReason::EndOfStream);
            };

            let report = self.pipeline.process(&frame);
            stats.frames += 1;
            if report.hand.is_some() {
                stats.hand_frames += 1;
            }
            *stats.gesture_frames.entry(report.gesture()).or_insert(0) += 1;

            if last_fps_update.elapsed() >= Duration::from_secs(1) {
                stats.fps = average_fps(stats.frames, start_time.elapsed());
                last_fps_update = Instant::now();
                debug!("FPS: {:.1}", stats.fps);
            }

            if !self.source.present(&report)? {
                info!("Exit requested by user");
                return Ok(StopReason::UserExit);
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)] // Frame counts stay far below f64 precision limits
fn average_fps(frames: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        frames as f64 / secs
    } else {
        0.0
    }
}
