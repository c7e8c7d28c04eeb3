use chromia_image::Image;

/// Kernel for bilinear interpolation
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
pub(crate) fn bilinear_interpolation<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
) -> [f32; C] {
    let (rows, cols) = (image.rows(), image.cols());

    let u = u.max(0.0);
    let v = v.max(0.0);

    let iu0 = (u.trunc() as usize).min(cols - 1);
    let iv0 = (v.trunc() as usize).min(rows - 1);

    // past the last column/row the weights collapse onto the border pixel
    let frac_u = if iu0 + 1 < cols { u.fract() } else { 0.0 };
    let frac_v = if iv0 + 1 < rows { v.fract() } else { 0.0 };

    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let w00 = frac_uu * frac_vv;
    let w01 = frac_u * frac_vv;
    let w10 = frac_uu * frac_v;
    let w11 = frac_u * frac_v;

    let iu1 = (iu0 + 1).min(cols - 1);
    let iv1 = (iv0 + 1).min(rows - 1);

    let base00 = (iv0 * cols + iu0) * C;
    let base01 = (iv0 * cols + iu1) * C;
    let base10 = (iv1 * cols + iu0) * C;
    let base11 = (iv1 * cols + iu1) * C;

    let data = image.as_slice();

    let p00 = &data[base00..base00 + C];
    let p01 = &data[base01..base01 + C];
    let p10 = &data[base10..base10 + C];
    let p11 = &data[base11..base11 + C];

    let mut pixel = [0.0; C];
    for k in 0..C {
        pixel[k] = p00[k] * w00 + p01[k] * w01 + p10[k] * w10 + p11[k] * w11;
    }

    pixel
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromia_image::{ImageError, ImageSize};

    #[test]
    fn bilinear_midpoint() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0, 1.0, 2.0, 3.0],
        )?;
        assert_eq!(bilinear_interpolation(&image, 0.5, 0.5), [1.5]);
        assert_eq!(bilinear_interpolation(&image, 1.0, 0.0), [1.0]);
        // beyond the border replicates the edge
        assert_eq!(bilinear_interpolation(&image, 5.0, 5.0), [3.0]);
        assert_eq!(bilinear_interpolation(&image, -1.0, 0.0), [0.0]);
        Ok(())
    }
}
