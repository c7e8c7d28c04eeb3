use std::path::Path;

use chromia_tensor::{Tensor, Tensor4};

use crate::error::DnnError;

/// A dense `f32` tensor of arbitrary rank exchanged with a model backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Blob {
    /// dimensions, outermost first
    pub shape: Vec<usize>,
    /// row-major values
    pub data: Vec<f32>,
}

impl Blob {
    /// Create a blob, checking that `data` fills `shape` exactly.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, DnnError> {
        if shape.iter().product::<usize>() != data.len() {
            return Err(DnnError::InvalidBlob {
                shape,
                len: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Create a blob with every value set to `value`.
    pub fn filled(shape: Vec<usize>, value: f32) -> Self {
        let numel = shape.iter().product::<usize>();
        Self {
            shape,
            data: vec![value; numel],
        }
    }

    /// Number of values held.
    pub fn numel(&self) -> usize {
        self.data.len()
    }
}

impl<const N: usize> From<Tensor<f32, N>> for Blob {
    fn from(tensor: Tensor<f32, N>) -> Self {
        Self {
            shape: tensor.shape.to_vec(),
            data: tensor.into_vec(),
        }
    }
}

/// The opaque inference capability the colorization network runs on.
///
/// Implementations wrap a concrete engine. A forward pass may mutate internal
/// buffers, so a backend serves one inference call at a time.
pub trait ModelBackend {
    /// Attach a constant tensor to a named layer of the network.
    ///
    /// # Errors
    ///
    /// Returns [`DnnError::MissingLayer`] if the network has no such layer.
    fn set_fixed_tensor(&mut self, layer: &str, blob: Blob) -> Result<(), DnnError>;

    /// Run a forward pass on an NCHW input and return the NCHW output.
    fn forward(&mut self, input: &Tensor4<f32>) -> Result<Tensor4<f32>, DnnError>;
}

/// A backend that can be constructed from a topology descriptor and weights.
pub trait ModelLoader: ModelBackend + Sized {
    /// Load the network from its files.
    fn load(topology: &Path, weights: &Path) -> Result<Self, DnnError>;
}

impl<M: ModelBackend + ?Sized> ModelBackend for Box<M> {
    fn set_fixed_tensor(&mut self, layer: &str, blob: Blob) -> Result<(), DnnError> {
        (**self).set_fixed_tensor(layer, blob)
    }

    fn forward(&mut self, input: &Tensor4<f32>) -> Result<Tensor4<f32>, DnnError> {
        (**self).forward(input)
    }
}
