use crate::image::ImageSize;

/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the image has no pixels.
    #[error("Image must have a positive size, got {0}")]
    EmptyImage(ImageSize),

    /// Error when the underlying tensor cannot be created.
    #[error("Invalid shape. {0}")]
    InvalidShape(#[from] chromia_tensor::TensorError),

    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image size is not valid.
    #[error("Invalid image size ({0}, {1}), expected ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel values are not finite.
    #[error("Pixel value at offset {0} is not finite")]
    NonFinitePixel(usize),

    /// Error when the planes to merge or split disagree in size.
    #[error("Channel planes disagree in size: expected {expected}, got {actual}")]
    ChannelMismatch {
        /// size of the reference plane
        expected: ImageSize,
        /// size of the offending plane
        actual: ImageSize,
    },

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds for {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the pixel index is out of bounds.
    #[error("Pixel index ({0}, {1}) is out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the pixel data cannot be cast.
    #[error("Failed to cast image data to {0}")]
    CastError(String),
}
