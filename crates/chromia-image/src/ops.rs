use crate::{Image, ImageError};

/// Cast the pixel data of an image to a different type.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image.
/// * `scale` - The scale to multiply the pixel data with.
///
/// Example:
///
/// ```
/// use chromia_image::{Image, ImageSize};
/// use chromia_image::ops::cast_and_scale;
///
/// let image = Image::<u8, 1>::new(
///     ImageSize { width: 2, height: 1 },
///     vec![0u8, 255],
/// ).unwrap();
///
/// let mut image_f32 = Image::from_size_val(image.size(), 0.0f32).unwrap();
///
/// cast_and_scale(&image, &mut image_f32, 1. / 255.0).unwrap();
///
/// assert_eq!(image_f32.get_pixel(0, 0, 0).unwrap(), &0.0f32);
/// assert_eq!(image_f32.get_pixel(1, 0, 0).unwrap(), &1.0f32);
/// ```
pub fn cast_and_scale<T, U, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<U, C>,
    scale: U,
) -> Result<(), ImageError>
where
    T: Copy + num_traits::NumCast,
    U: Copy + num_traits::NumCast + std::ops::Mul<U, Output = U>,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .try_for_each(|(out, &inp)| {
            let x = U::from(inp).ok_or(ImageError::CastError(
                std::any::type_name::<U>().to_string(),
            ))?;
            *out = x * scale;
            Ok::<(), ImageError>(())
        })?;

    Ok(())
}

/// Scale a normalized float image back to the 8-bit range.
///
/// Values are clipped to `[0, 1]` before being multiplied by 255 and rounded.
///
/// ```
/// use chromia_image::{Image, ImageSize};
/// use chromia_image::ops::denormalize_u8;
///
/// let image = Image::<f32, 1>::new(ImageSize { width: 3, height: 1 }, vec![-0.2, 0.5, 1.7]).unwrap();
/// let mut out = Image::from_size_val(image.size(), 0u8).unwrap();
///
/// denormalize_u8(&image, &mut out).unwrap();
/// assert_eq!(out.as_slice(), &[0, 128, 255]);
/// ```
pub fn denormalize_u8<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .for_each(|(out, &inp)| {
            *out = (inp.clamp(0.0, 1.0) * 255.0).round() as u8;
        });

    Ok(())
}

/// Check that every pixel of the image is a finite number.
///
/// # Errors
///
/// Returns [`ImageError::NonFinitePixel`] with the offset of the first NaN or
/// infinite value.
pub fn ensure_finite<const C: usize>(image: &Image<f32, C>) -> Result<(), ImageError> {
    match image.as_slice().iter().position(|x| !x.is_finite()) {
        Some(offset) => Err(ImageError::NonFinitePixel(offset)),
        None => Ok(()),
    }
}
