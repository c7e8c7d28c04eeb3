use chromia_image::Image;

/// Kernel for nearest neighbor interpolation
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel values.
pub(crate) fn nearest_neighbor_interpolation<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
) -> [f32; C] {
    let (rows, cols) = (image.rows(), image.cols());

    let iu = (u.max(0.0).round() as usize).min(cols - 1);
    let iv = (v.max(0.0).round() as usize).min(rows - 1);

    let base = (iv * cols + iu) * C;

    let mut pixel = [0.0; C];
    pixel.copy_from_slice(&image.as_slice()[base..base + C]);

    pixel
}
