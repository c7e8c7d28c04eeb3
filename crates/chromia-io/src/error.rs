/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] chromia_image::ImageError),

    /// Error to decode or encode the image.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// Error to build a tensor from decoded data.
    #[error("Failed to create tensor. {0}")]
    TensorCreationError(#[from] chromia_tensor::TensorError),

    /// The array file header is malformed or uses an unsupported layout.
    #[error("Invalid npy file: {0}")]
    InvalidNpy(String),

    /// A frame does not match the dimensions declared by the stream.
    #[error("Frame size {actual} does not match stream size {expected}")]
    FrameSizeMismatch {
        /// size declared when the stream was opened
        expected: chromia_image::ImageSize,
        /// size of the offending frame
        actual: chromia_image::ImageSize,
    },

    /// A raw frame buffer is too small for the declared frame layout.
    #[error("Frame buffer too small: expected {expected} bytes of pixels, got {actual} bytes")]
    InvalidFrameBuffer {
        /// bytes of pixel data the frame needs
        expected: usize,
        /// bytes available in the buffer
        actual: usize,
    },

    /// The stream was already closed.
    #[error("Stream is closed")]
    StreamClosed,

    /// Error raised by the GStreamer video backend.
    #[cfg(feature = "gstreamer")]
    #[error(transparent)]
    VideoError(#[from] crate::stream::video::VideoError),
}
