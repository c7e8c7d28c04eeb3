#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image representation for computer vision purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// color space tagged image wrappers.
pub mod color_spaces;

/// basic pixel-wise operations on images.
pub mod ops;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
