use chromia_image::{
    ops::{cast_and_scale, denormalize_u8},
    Image, ImageError, ImageSize,
};
use chromia_imgproc::{
    interpolation::InterpolationMode,
    resize::resize,
    stack::{hstack, vstack},
};

/// Place an image and its colorization next to each other, fitted to `max_size`.
///
/// The pair is stacked along the axis that leaves the larger result once
/// scaled: vertically for wide images, horizontally otherwise. The stacked
/// image is then resized, keeping its aspect ratio, so that it fits within
/// `max_size`.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if the two images differ in size.
pub fn comparison_image(
    original: &Image<u8, 3>,
    colorized: &Image<u8, 3>,
    max_size: ImageSize,
) -> Result<Image<u8, 3>, ImageError> {
    if original.size() != colorized.size() {
        return Err(ImageError::InvalidImageSize(
            original.width(),
            original.height(),
            colorized.width(),
            colorized.height(),
        ));
    }

    let ImageSize { width, height } = original.size();

    let fit_w = max_size.width as f32 / (2 * width) as f32;
    let fit_h = max_size.height as f32 / (2 * height) as f32;

    let stacked = if fit_w < fit_h {
        vstack(original, colorized)?
    } else {
        hstack(original, colorized)?
    };

    let scale = f32::min(
        max_size.width as f32 / stacked.width() as f32,
        max_size.height as f32 / stacked.height() as f32,
    );
    let fitted = ImageSize {
        width: ((stacked.width() as f32 * scale) as usize).max(1),
        height: ((stacked.height() as f32 * scale) as usize).max(1),
    };
    if fitted == stacked.size() {
        return Ok(stacked);
    }

    let mut stacked_f32 = Image::from_size_val(stacked.size(), 0.0f32)?;
    cast_and_scale(&stacked, &mut stacked_f32, 1.0 / 255.0)?;

    let resized = resize(&stacked_f32, fitted, InterpolationMode::Bilinear)?;

    let mut out = Image::from_size_val(fitted, 0u8)?;
    denormalize_u8(&resized, &mut out)?;
    Ok(out)
}
