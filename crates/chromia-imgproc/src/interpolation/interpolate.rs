use super::bilinear::bilinear_interpolation;
use super::nearest::nearest_neighbor_interpolation;
use chromia_image::Image;

/// Interpolation mode for the resize operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Bilinear interpolation
    #[default]
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
}

/// Kernel for interpolating a pixel value
///
/// # Arguments
///
/// * `image` - The input image container with shape (height, width, C).
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `interpolation` - The interpolation mode to use.
///
/// Coordinates outside the image replicate the border pixels.
///
/// # Returns
///
/// The interpolated pixel values, one per channel.
pub fn interpolate_pixel<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
    interpolation: InterpolationMode,
) -> [f32; C] {
    match interpolation {
        InterpolationMode::Bilinear => bilinear_interpolation(image, u, v),
        InterpolationMode::Nearest => nearest_neighbor_interpolation(image, u, v),
    }
}
