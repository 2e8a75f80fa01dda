use crate::{
    constants::NUM_HAND_LANDMARKS,
    landmarks::{Handedness, Landmark, LandmarkSet},
    utils::safe_cast::usize_to_i32,
    Error, Result,
};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, Vec3f, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Square input size of the hand landmark model
const HAND_LANDMARK_INPUT_SIZE: i32 = 224;

/// Values per landmark in the model output (x, y, z)
const COORDS_PER_LANDMARK: usize = 3;

/// Hand landmark detector using `ONNX` Runtime.
///
/// Expects a MediaPipe-style model: NHWC RGB input in `[0, 1]`, outputs
/// 21×3 landmarks in input pixels, a presence score and a handedness score.
pub struct HandLandmarkDetector {
    session: Session,
    input_size: i32,
    min_confidence: f32,
}

impl HandLandmarkDetector {
    /// Load a hand landmark model
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded or has no outputs.
    pub fn new<P: AsRef<Path>>(model_path: P, min_confidence: f32) -> Result<Self> {
        log::info!(
            "Initializing HandLandmarkDetector with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("hand_landmarks")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.outputs.len() < 2 {
            return Err(Error::ModelError(format!(
                "Hand landmark model must have landmark and presence outputs, found {}",
                session.outputs.len()
            )));
        }

        Ok(Self {
            session,
            input_size: HAND_LANDMARK_INPUT_SIZE,
            min_confidence,
        })
    }

    /// Detect one hand in a BGR frame.
    ///
    /// Returns `None` when the presence score is below the confidence
    /// threshold.
    pub fn detect(&self, frame: &Mat) -> Result<Option<LandmarkSet>> {
        let input = self.preprocess(frame)?;
        let outputs = self.forward(input)?;
        self.postprocess(&outputs)
    }

    #[allow(clippy::cast_sign_loss)] // OpenCV dimensions are positive
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let size = self.input_size as usize;
        let channels = 3;

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let mut data = vec![0.0f32; size * size * channels];
        for row in 0..size {
            for col in 0..size {
                let pixel = float_image.at_2d::<Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
                let base = (row * size + col) * channels;
                data[base..base + channels].copy_from_slice(&pixel.0);
            }
        }

        Array4::from_shape_vec((1, size, size, channels), data)
            .map_err(|e| Error::ModelError(format!("Failed to create input array: {e}")))
    }

    /// Run the model and flatten every output
    fn forward(&self, input: Array4<f32>) -> Result<Vec<Vec<f32>>> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        outputs
            .iter()
            .map(|output| -> Result<Vec<f32>> {
                let tensor = output.try_extract::<f32>()?;
                let view = tensor.view();
                Ok(view.iter().copied().collect())
            })
            .collect()
    }

    /// Landmark output, presence score and handedness score
    #[allow(clippy::cast_precision_loss)] // Input size is tiny
    fn postprocess(&self, outputs: &[Vec<f32>]) -> Result<Option<LandmarkSet>> {
        let expected = NUM_HAND_LANDMARKS * COORDS_PER_LANDMARK;
        let coords = outputs
            .iter()
            .find(|values| values.len() == expected)
            .ok_or_else(|| Error::ModelOutputError(format!("No output with {expected} landmark values")))?;
        let mut scores = outputs.iter().filter(|values| values.len() == 1).map(|values| values[0]);

        let presence = scores
            .next()
            .ok_or_else(|| Error::ModelOutputError("Missing hand presence score".to_string()))?;
        if presence < self.min_confidence {
            return Ok(None);
        }
        let handedness = if scores.next().unwrap_or(1.0) >= 0.5 {
            Handedness::Right
        } else {
            Handedness::Left
        };

        let scale = self.input_size as f32;
        let landmarks = coords
            .chunks_exact(COORDS_PER_LANDMARK)
            .map(|c| Landmark::new(c[0] / scale, c[1] / scale, c[2] / scale))
            .collect();

        LandmarkSet::new(landmarks, handedness, presence).map(Some)
    }
}
