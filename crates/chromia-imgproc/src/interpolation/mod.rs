//! Pixel interpolation kernels used when resampling images.
//!
//! # Interpolation Modes
//!
//! - **Nearest**: picks the closest source pixel, no blending
//! - **Bilinear**: weighted blend of the four neighbouring pixels

mod bilinear;
pub(crate) mod interpolate;
mod nearest;

pub use interpolate::interpolate_pixel;
pub use interpolate::InterpolationMode;
