//! # ONNX Runtime backend
//!
//! Runs an ONNX export of the colorization network. The fixed tensors the
//! network needs are exposed as extra graph inputs and fed on every forward
//! pass; the luminance tensor goes to the first graph input.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;

use chromia_tensor::Tensor4;

use crate::backend::{Blob, ModelBackend, ModelLoader};
use crate::error::DnnError;

/// Builder for the ONNX Runtime backend.
pub struct OrtBackendBuilder {
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Number of threads to use for inference.
    pub num_threads: usize,
}

impl OrtBackendBuilder {
    /// Creates a new `OrtBackendBuilder` with default settings.
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            num_threads: 4,
        }
    }

    /// Sets the number of threads to use for inference.
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Builds and returns an `OrtBackend` instance.
    pub fn build(self) -> Result<OrtBackend, DnnError> {
        OrtBackend::new(&self.model_path, self.num_threads)
    }
}

/// A colorization network executed by ONNX Runtime.
pub struct OrtBackend {
    session: Session,
    input_name: String,
    fixed_inputs: Vec<String>,
    output_name: String,
    fixed: HashMap<String, Blob>,
}

fn load_error(err: impl std::fmt::Display) -> DnnError {
    DnnError::ModelLoad(err.to_string())
}

fn inference_error(err: impl std::fmt::Display) -> DnnError {
    DnnError::Inference(err.to_string())
}

impl OrtBackend {
    /// Creates a new `OrtBackend` from an ONNX file.
    ///
    /// Pre-requisites:
    /// - ORT_DYLIB_PATH environment variable must be set to the path of the ORT dylib.
    pub fn new(model_path: &Path, num_threads: usize) -> Result<Self, DnnError> {
        if !model_path.exists() {
            return Err(DnnError::ModelLoad(format!(
                "model file not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(load_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(load_error)?
            .with_intra_threads(num_threads)
            .map_err(load_error)?
            .commit_from_file(model_path)
            .map_err(load_error)?;

        let mut inputs_names = session
            .inputs
            .iter()
            .map(|x| x.name.to_string())
            .collect::<Vec<_>>()
            .into_iter();

        let input_name = inputs_names
            .next()
            .ok_or_else(|| DnnError::ModelLoad("the model has no inputs".to_string()))?;
        let fixed_inputs = inputs_names.collect::<Vec<_>>();

        let output_name = session
            .outputs
            .first()
            .map(|x| x.name.to_string())
            .ok_or_else(|| DnnError::ModelLoad("the model has no outputs".to_string()))?;

        log::info!(
            "loaded {}: input {:?}, fixed inputs {:?}, output {:?}",
            model_path.display(),
            input_name,
            fixed_inputs,
            output_name
        );

        Ok(Self {
            session,
            input_name,
            fixed_inputs,
            output_name,
            fixed: HashMap::new(),
        })
    }
}

impl ModelBackend for OrtBackend {
    fn set_fixed_tensor(&mut self, layer: &str, blob: Blob) -> Result<(), DnnError> {
        if !self.fixed_inputs.iter().any(|name| name == layer) {
            return Err(DnnError::MissingLayer(layer.to_string()));
        }
        self.fixed.insert(layer.to_string(), blob);
        Ok(())
    }

    fn forward(&mut self, input: &Tensor4<f32>) -> Result<Tensor4<f32>, DnnError> {
        let mut inputs = Vec::with_capacity(1 + self.fixed.len());

        let shape = input.shape.iter().map(|&d| d as i64).collect::<Vec<_>>();
        let tensor = ort::value::Tensor::from_array((shape, input.as_slice().to_vec()))
            .map_err(inference_error)?;
        inputs.push((self.input_name.clone(), tensor.into_dyn()));

        for (name, blob) in self.fixed.iter() {
            let shape = blob.shape.iter().map(|&d| d as i64).collect::<Vec<_>>();
            let tensor = ort::value::Tensor::from_array((shape, blob.data.clone()))
                .map_err(inference_error)?;
            inputs.push((name.clone(), tensor.into_dyn()));
        }

        let outputs = self.session.run(inputs).map_err(inference_error)?;

        let (out_shape, out_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(inference_error)?;

        let out_shape = out_shape.iter().map(|&d| d as usize).collect::<Vec<_>>();
        let shape: [usize; 4] =
            out_shape
                .as_slice()
                .try_into()
                .map_err(|_| DnnError::UnexpectedOutputShape {
                    expected: "[1, 2, h, w]".to_string(),
                    actual: out_shape.clone(),
                })?;

        Ok(Tensor4::from_shape_vec(shape, out_data.to_vec())?)
    }
}

impl ModelLoader for OrtBackend {
    /// Load an ONNX export.
    ///
    /// ONNX files carry their own graph, so `weights` is the model file and
    /// `topology` is only checked for existence when it names another file.
    fn load(topology: &Path, weights: &Path) -> Result<Self, DnnError> {
        if topology != weights && !topology.exists() {
            return Err(DnnError::ModelLoad(format!(
                "topology file not found: {}",
                topology.display()
            )));
        }
        log::debug!("topology {} is embedded in the onnx graph", topology.display());
        OrtBackendBuilder::new(weights.to_path_buf()).build()
    }
}
