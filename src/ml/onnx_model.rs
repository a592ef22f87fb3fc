//! ONNX model loading and inference

use std::path::Path;

use ort::session::Session;

use crate::error::{RfiError, RfiResult};
use crate::ml::model::{Model, ModelInput};

/// Classifier exported to ONNX
///
/// Expects one `float32` input of shape `(1, time_steps, 4)` and reads the
/// first output, either `(1, classes)` or `(1, time_steps, classes)`.
pub struct OnnxModel {
    session: Session,
    input_name: String,
    output_name: String,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish()
    }
}

impl OnnxModel {
    /// Load ONNX model from file
    pub fn load(path: impl AsRef<Path>) -> RfiResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RfiError::MissingResource(path.to_path_buf()));
        }
        log::info!("Loading ONNX model from: {}", path.display());

        let session = Session::builder()
            .map_err(|e| RfiError::Model(format!("Failed to create session builder: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| RfiError::Model(format!("Failed to load model: {}", e)))?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| RfiError::Model("model declares no inputs".to_string()))?;
        let output_name = session
            .outputs()
            .first()
            .map(|output| output.name().to_string())
            .ok_or_else(|| RfiError::Model("model declares no outputs".to_string()))?;

        log::debug!("ONNX model input '{}', output '{}'", input_name, output_name);
        Ok(Self {
            session,
            input_name,
            output_name,
        })
    }
}

impl Model for OnnxModel {
    fn predict(&mut self, input: &ModelInput) -> RfiResult<Vec<Vec<f32>>> {
        let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let tensor = ort::value::Tensor::from_array((shape, input.as_slice().to_vec()))
            .map_err(|e| RfiError::Model(format!("Failed to create input tensor: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| RfiError::Model(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| RfiError::Model(format!("missing output '{}'", self.output_name)))?;
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| RfiError::Model(format!("Unexpected output type: {}", e)))?;

        let classes = shape
            .iter()
            .last()
            .map(|&d| d as usize)
            .filter(|&d| d > 0)
            .ok_or_else(|| RfiError::Model("model output has no class axis".to_string()))?;

        Ok(data.chunks(classes).map(<[f32]>::to_vec).collect())
    }
}
