use std::path::Path;

use thiserror::Error;
use tract_onnx::prelude::*;

use crate::client::ModelArtifactClient;

type ClassifierPlan = TypedRunnableModel<TypedModel>;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("model.download_failed: {0}")]
    Download(#[source] reqwest::Error),
    #[error("model.io_error: {0}")]
    Io(#[from] std::io::Error),
    #[error("model.invalid_artifact: {0}")]
    InvalidArtifact(String),
}

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("inference.run_failed: {0}")]
    Run(String),
    #[error("inference.no_output")]
    NoOutput,
}

/// Spatial size the model expects, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSize {
    pub width: u32,
    pub height: u32,
}

pub const DEFAULT_INPUT_SIZE: InputSize = InputSize {
    width: 150,
    height: 150,
};

/// A classifier loaded into an optimized, runnable plan.
///
/// Input is a single `[1, height, width, 3]` f32 image (channels last, values
/// in `[0, 1]`); output is the first tensor of the model, flattened.
pub struct ModelHandle {
    plan: ClassifierPlan,
    input_size: InputSize,
}

impl ModelHandle {
    pub fn load(path: &Path, input_size: InputSize) -> Result<Self, ModelLoadError> {
        let input_fact = InferenceFact::dt_shape(
            f32::datum_type(),
            tvec!(1, input_size.height as usize, input_size.width as usize, 3),
        );

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, input_fact))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ModelLoadError::InvalidArtifact(format!("{:#}", e)))?;

        Ok(Self { plan, input_size })
    }

    /// Downloads the artifact and loads it; the temporary copy is removed
    /// once the plan is built.
    pub async fn fetch(
        client: &ModelArtifactClient,
        input_size: InputSize,
    ) -> Result<Self, ModelLoadError> {
        let artifact = client.download().await?;

        tokio::task::spawn_blocking(move || Self::load(artifact.path(), input_size))
            .await
            .map_err(|e| ModelLoadError::InvalidArtifact(e.to_string()))?
    }

    pub fn input_size(&self) -> InputSize {
        self.input_size
    }

    pub fn classify(&self, input: Tensor) -> Result<Vec<f32>, InferenceError> {
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::Run(format!("{:#}", e)))?;

        let output = outputs.first().ok_or(InferenceError::NoOutput)?;
        let scores = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Run(format!("{:#}", e)))?;

        Ok(scores.iter().copied().collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::preprocess::to_input_tensor;
    use image::{Rgb, RgbImage};
    use std::io::Write;
    use std::path::PathBuf;

    /// ONNX graph taking `[1, 150, 150, 3]` f32: mean over height and width,
    /// then softmax over the three channels.
    pub(crate) fn mean_softmax_model() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mean_softmax.onnx")
    }

    #[test]
    fn should_return_one_probability_per_output_slot() {
        let handle = ModelHandle::load(&mean_softmax_model(), DEFAULT_INPUT_SIZE).unwrap();
        let image = RgbImage::from_pixel(150, 150, Rgb([255, 0, 51]));

        let scores = handle.classify(to_input_tensor(&image)).unwrap();

        assert_eq!(scores.len(), 3);
        assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(scores[0] > scores[2]);
        assert!(scores[2] > scores[1]);
    }

    #[test]
    fn should_reject_artifact_that_is_not_onnx() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a protobuf model").unwrap();

        let result = ModelHandle::load(file.path(), DEFAULT_INPUT_SIZE);

        assert!(matches!(result, Err(ModelLoadError::InvalidArtifact(_))));
    }

    #[test]
    fn should_reject_missing_artifact() {
        let result = ModelHandle::load(Path::new("/nonexistent/egg_model.onnx"), DEFAULT_INPUT_SIZE);

        assert!(result.is_err());
    }
}
