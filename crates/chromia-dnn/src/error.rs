use chromia_image::ImageSize;

/// An error type for the dnn module.
#[derive(thiserror::Error, Debug)]
pub enum DnnError {
    /// The network does not expose a layer the adapter needs to configure.
    #[error("Layer {0} not found in the network")]
    MissingLayer(String),

    /// The cluster prior does not have the expected shape.
    #[error("Invalid cluster prior shape {0:?}, expected [313, 2]")]
    InvalidClusterPrior(Vec<usize>),

    /// The model files could not be loaded.
    #[error("Failed to load model. {0}")]
    ModelLoad(String),

    /// The forward pass failed.
    #[error("Inference failed. {0}")]
    Inference(String),

    /// The network produced a tensor of an unexpected shape.
    #[error("Unexpected output shape {actual:?}, expected {expected}")]
    UnexpectedOutputShape {
        /// description of the expected layout
        expected: String,
        /// shape returned by the network
        actual: Vec<usize>,
    },

    /// The luminance plane does not match the network input resolution.
    #[error("Input size {actual} does not match the network input size {expected}")]
    InputSizeMismatch {
        /// configured network input size
        expected: ImageSize,
        /// size of the plane passed in
        actual: ImageSize,
    },

    /// A fixed tensor has a data length inconsistent with its shape.
    #[error("Blob with shape {shape:?} cannot hold {len} values")]
    InvalidBlob {
        /// declared shape
        shape: Vec<usize>,
        /// number of values supplied
        len: usize,
    },

    /// Image error.
    #[error(transparent)]
    ImageError(#[from] chromia_image::ImageError),

    /// Tensor error.
    #[error(transparent)]
    TensorError(#[from] chromia_tensor::TensorError),

    /// Error reading model side files.
    #[error(transparent)]
    IoError(#[from] chromia_io::IoError),
}
