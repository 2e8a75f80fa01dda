use crate::{
    config::Config,
    constants::HAND_CONNECTIONS,
    gesture::GestureCategory,
    landmarks::FrameSize,
    mapper::ActiveRegion,
    pipeline::FrameReport,
    source::{FrameObservation, LandmarkSource},
    utils::safe_cast::f64_to_i32,
    vision::HandLandmarkDetector,
    Error, Result,
};
use log::info;
use opencv::{
    core::{Mat, Point, Rect, Scalar},
    highgui::{self, WINDOW_NORMAL},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use std::time::Instant;

const WINDOW_NAME: &str = "Hand Gesture Mouse";
const KEY_ESC: i32 = 27;

/// Live camera frames run through the hand landmark model
pub struct CameraSource {
    capture: VideoCapture,
    detector: HandLandmarkDetector,
    flip_x: bool,
    show_window: bool,
    show_fps: bool,
    bbox_margin: i32,
    frame_margin: u32,
    frame: Mat,
    last_present: Option<Instant>,
}

impl CameraSource {
    /// Open the configured camera and load the landmark model
    ///
    /// # Errors
    ///
    /// Returns an error if the camera cannot be opened or the model fails
    /// to load.
    pub fn new(config: &Config, show_window: bool) -> Result<Self> {
        config.validate_models()?;
        let detector = HandLandmarkDetector::new(&config.models.hand_landmarks, config.models.min_confidence)?;

        info!("Opening camera {}", config.camera.index);
        let mut capture = VideoCapture::new(config.camera.index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::FrameAcquisition(format!(
                "Failed to open camera {}",
                config.camera.index
            )));
        }

        // Reduce buffer size for lower latency
        capture.set(CAP_PROP_BUFFERSIZE, 1.0)?;
        capture.set(CAP_PROP_FRAME_WIDTH, f64::from(config.camera.width))?;
        capture.set(CAP_PROP_FRAME_HEIGHT, f64::from(config.camera.height))?;

        if show_window {
            highgui::named_window(WINDOW_NAME, WINDOW_NORMAL)?;
        }

        Ok(Self {
            capture,
            detector,
            flip_x: config.camera.flip_x,
            show_window,
            show_fps: config.display.show_fps,
            bbox_margin: config.display.bbox_margin,
            frame_margin: config.cursor.frame_margin,
            frame: Mat::default(),
            last_present: None,
        })
    }

    fn draw_overlay(&self, canvas: &mut Mat, report: &FrameReport, fps: Option<f64>) -> Result<()> {
        let frame_size = FrameSize::new(
            u32::try_from(canvas.cols()).unwrap_or(0),
            u32::try_from(canvas.rows()).unwrap_or(0),
        );
        if let Some(region) = ActiveRegion::for_frame(frame_size, self.frame_margin) {
            imgproc::rectangle_points(
                canvas,
                Point::new(f64_to_i32(region.x_min)?, f64_to_i32(region.y_min)?),
                Point::new(f64_to_i32(region.x_max)?, f64_to_i32(region.y_max)?),
                Scalar::new(255.0, 0.0, 255.0, 0.0),
                2,
                LINE_8,
                0,
            )?;
        }

        if let Some(hand) = &report.hand {
            let bbox = hand.bounding_box.expanded(self.bbox_margin);
            imgproc::rectangle(
                canvas,
                Rect::new(bbox.xmin, bbox.ymin, bbox.width(), bbox.height()),
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                LINE_8,
                0,
            )?;

            for &(from, to) in &HAND_CONNECTIONS {
                let (a, b) = (hand.point(from), hand.point(to));
                imgproc::line(
                    canvas,
                    Point::new(a.x, a.y),
                    Point::new(b.x, b.y),
                    Scalar::new(255.0, 255.0, 255.0, 0.0),
                    1,
                    LINE_8,
                    0,
                )?;
            }
            for lm in &hand.points {
                imgproc::circle(
                    canvas,
                    Point::new(lm.point.x, lm.point.y),
                    3,
                    Scalar::new(255.0, 0.0, 0.0, 0.0),
                    -1,
                    LINE_8,
                    0,
                )?;
            }

            imgproc::circle(
                canvas,
                Point::new(hand.palm_center.x, hand.palm_center.y),
                8,
                Scalar::new(0.0, 165.0, 255.0, 0.0),
                2,
                LINE_8,
                0,
            )?;

            let label = format!("{} {:.2}", hand.handedness, hand.confidence);
            imgproc::put_text(
                canvas,
                &label,
                Point::new(bbox.xmin, bbox.ymin.saturating_sub(10)),
                FONT_HERSHEY_SIMPLEX,
                0.6,
                Scalar::new(0.0, 255.0, 255.0, 0.0),
                1,
                LINE_8,
                false,
            )?;
        }

        if let Some(recognition) = &report.recognition {
            for reading in &recognition.proximity {
                let color = if reading.within {
                    Scalar::new(0.0, 255.0, 0.0, 0.0)
                } else {
                    Scalar::new(0.0, 0.0, 255.0, 0.0)
                };
                let mid = reading.from.midpoint(&reading.to);
                imgproc::line(
                    canvas,
                    Point::new(reading.from.x, reading.from.y),
                    Point::new(reading.to.x, reading.to.y),
                    color,
                    2,
                    LINE_8,
                    0,
                )?;
                imgproc::circle(canvas, Point::new(mid.x, mid.y), 6, color, -1, LINE_8, 0)?;
            }
        }

        if report.gesture() != GestureCategory::None {
            imgproc::put_text(
                canvas,
                report.gesture().as_str(),
                Point::new(10, 60),
                FONT_HERSHEY_SIMPLEX,
                1.0,
                Scalar::new(0.0, 0.0, 255.0, 0.0),
                2,
                LINE_8,
                false,
            )?;
        }

        if let Some(fps) = fps {
            imgproc::put_text(
                canvas,
                &format!("FPS: {fps:.1}"),
                Point::new(10, 30),
                FONT_HERSHEY_SIMPLEX,
                1.0,
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                LINE_8,
                false,
            )?;
        }

        Ok(())
    }
}

impl LandmarkSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<FrameObservation>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Err(Error::FrameAcquisition("Camera returned no frame".to_string()));
        }

        if self.flip_x {
            opencv::core::flip(&frame, &mut self.frame, 1)?;
        } else {
            self.frame = frame;
        }

        let size = FrameSize::new(
            u32::try_from(self.frame.cols()).map_err(|e| Error::FrameAcquisition(e.to_string()))?,
            u32::try_from(self.frame.rows()).map_err(|e| Error::FrameAcquisition(e.to_string()))?,
        );
        let hand = self.detector.detect(&self.frame)?;
        Ok(Some(FrameObservation::new(size, hand)))
    }

    fn present(&mut self, report: &FrameReport) -> Result<bool> {
        if !self.show_window {
            return Ok(true);
        }

        let now = Instant::now();
        let fps = self
            .last_present
            .map(|last| 1.0 / now.duration_since(last).as_secs_f64().max(f64::EPSILON))
            .filter(|_| self.show_fps);
        self.last_present = Some(now);

        let mut canvas = self.frame.clone();
        self.draw_overlay(&mut canvas, report, fps)?;
        highgui::imshow(WINDOW_NAME, &canvas)?;

        // Check for exit
        let key = highgui::wait_key(1)?;
        Ok(!(key == KEY_ESC || key == i32::from(b'q')))
    }
}
