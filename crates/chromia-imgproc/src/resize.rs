use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::parallel;
use chromia_image::{Image, ImageError, ImageSize};

/// Map a destination coordinate to the source grid using pixel centers.
///
/// Matches the half-pixel convention of common image libraries so that a
/// resize followed by the inverse resize stays centered.
#[inline]
fn source_coordinate(dst_index: usize, scale: f32) -> f32 {
    ((dst_index as f32 + 0.5) * scale - 0.5).max(0.0)
}

/// Resize an image to the size of the destination container.
///
/// The function resizes an image using the specified interpolation mode. It
/// supports any number of channels. Values are not clipped, so planes holding
/// unbounded quantities (e.g. chrominance) keep their range.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container, already allocated at the target size.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use chromia_image::{Image, ImageSize};
/// use chromia_imgproc::resize::resize_native;
/// use chromia_imgproc::interpolation::InterpolationMode;
///
/// let image = Image::<_, 3>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0f32; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let new_size = ImageSize {
///     width: 2,
///     height: 3,
/// };
///
/// let mut image_resized = Image::<_, 3>::from_size_val(new_size, 0.0).unwrap();
///
/// resize_native(
///     &image,
///     &mut image_resized,
///     InterpolationMode::Nearest,
/// )
/// .unwrap();
///
/// assert_eq!(image_resized.num_channels(), 3);
/// assert_eq!(image_resized.size().width, 2);
/// assert_eq!(image_resized.size().height, 3);
/// ```
pub fn resize_native<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    // same size, nothing to interpolate
    if src.size() == dst.size() {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let scale_x = src.cols() as f32 / dst.cols() as f32;
    let scale_y = src.rows() as f32 / dst.rows() as f32;

    parallel::par_iter_rows_indexed(dst, |row, col, dst_pixel| {
        let u = source_coordinate(col, scale_x);
        let v = source_coordinate(row, scale_y);
        let pixel = interpolate_pixel(src, u, v, interpolation);
        dst_pixel.copy_from_slice(&pixel);
    });

    Ok(())
}

/// Resize an image into a freshly allocated buffer of the given size.
///
/// # Errors
///
/// Returns [`ImageError::EmptyImage`] if the requested size has a zero dimension.
///
/// # Example
///
/// ```
/// use chromia_image::{Image, ImageSize};
/// use chromia_imgproc::resize::resize;
/// use chromia_imgproc::interpolation::InterpolationMode;
///
/// let image = Image::<f32, 1>::from_size_val([8, 6].into(), 1.0).unwrap();
/// let small = resize(&image, [4, 3].into(), InterpolationMode::Bilinear).unwrap();
///
/// assert_eq!(small.width(), 4);
/// assert_eq!(small.height(), 3);
/// ```
pub fn resize<const C: usize>(
    src: &Image<f32, C>,
    new_size: ImageSize,
    interpolation: InterpolationMode,
) -> Result<Image<f32, C>, ImageError> {
    let mut dst = Image::from_size_val(new_size, 0.0f32)?;
    resize_native(src, &mut dst, interpolation)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn resize_smoke_ch3() -> Result<(), ImageError> {
        let image = Image::<_, 3>::new(
            ImageSize {
                width: 4,
                height: 5,
            },
            vec![0f32; 4 * 5 * 3],
        )?;

        let new_size = ImageSize {
            width: 2,
            height: 3,
        };

        let mut image_resized = Image::<_, 3>::from_size_val(new_size, 0.0)?;

        resize_native(&image, &mut image_resized, InterpolationMode::Bilinear)?;

        assert_eq!(image_resized.num_channels(), 3);
        assert_eq!(image_resized.size().width, 2);
        assert_eq!(image_resized.size().height, 3);

        Ok(())
    }

    #[test]
    fn resize_downscale_averages_neighbours() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 4,
                height: 1,
            },
            vec![0.0, 2.0, 4.0, 6.0],
        )?;
        let resized = resize(
            &image,
            ImageSize {
                width: 2,
                height: 1,
            },
            InterpolationMode::Bilinear,
        )?;
        assert_eq!(resized.as_slice(), &[1.0, 5.0]);
        Ok(())
    }

    #[test]
    fn resize_upscale_keeps_constant_and_range() -> Result<(), ImageError> {
        let image = Image::<f32, 2>::from_size_val([3, 3].into(), 0.0)?;
        let mut image = image;
        image
            .as_slice_mut()
            .chunks_exact_mut(2)
            .for_each(|px| px.copy_from_slice(&[300.0, -42.5]));

        let resized = resize(&image, [7, 5].into(), InterpolationMode::Bilinear)?;
        for px in resized.as_slice().chunks_exact(2) {
            assert_abs_diff_eq!(px[0], 300.0, epsilon = 1e-4);
            assert_abs_diff_eq!(px[1], -42.5, epsilon = 1e-4);
        }
        Ok(())
    }

    #[test]
    fn resize_nearest_picks_source_values() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![1.0, 2.0, 3.0, 4.0],
        )?;
        let resized = resize(&image, [4, 4].into(), InterpolationMode::Nearest)?;
        assert!(resized
            .as_slice()
            .iter()
            .all(|v| image.as_slice().contains(v)));
        assert_eq!(resized.as_slice()[0], 1.0);
        assert_eq!(resized.as_slice()[15], 4.0);
        Ok(())
    }

    #[test]
    fn resize_is_deterministic() -> Result<(), ImageError> {
        let data = (0..10 * 7).map(|x| (x as f32).sin()).collect::<Vec<_>>();
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 10,
                height: 7,
            },
            data,
        )?;
        let a = resize(&image, [3, 4].into(), InterpolationMode::Bilinear)?;
        let b = resize(&image, [3, 4].into(), InterpolationMode::Bilinear)?;
        assert_eq!(a, b);
        Ok(())
    }
}
