use chromia_dnn::{ColorizationNet, ModelBackend};
use chromia_image::{
    color_spaces::{Labf32, Rgbf32},
    ops::{cast_and_scale, denormalize_u8},
    Image,
};
use chromia_imgproc::{
    channels::{mean_center, merge_channels, split_channels},
    color::ConvertColor,
    interpolation::InterpolationMode,
    resize::resize,
};

use crate::error::StageError;

/// Per-frame parameters of the colorization pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOptions {
    /// value subtracted from the luminance plane before inference
    pub luminance_offset: f32,
    /// filter used for both resampling steps
    pub interpolation: InterpolationMode,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            luminance_offset: 50.0,
            interpolation: InterpolationMode::Bilinear,
        }
    }
}

/// Colorize one 8-bit RGB frame.
///
/// The frame is converted to LAB, its luminance is downsampled to the network
/// resolution and the predicted chrominance is upsampled back and recombined
/// with the full resolution luminance. The output has the size of the input.
///
/// The pipeline is a pure function of the frame and the network weights, so
/// the same input always produces the same output.
///
/// # Errors
///
/// Returns the [`StageError`] of the first stage that failed.
pub fn colorize_frame<M: ModelBackend>(
    net: &mut ColorizationNet<M>,
    frame: &Image<u8, 3>,
    options: &FrameOptions,
) -> Result<Image<u8, 3>, StageError> {
    let size = frame.size();

    let mut rgb = Rgbf32::from_size_val(size, 0.0)?;
    cast_and_scale(frame, rgb.as_image_mut(), 1.0 / 255.0)?;

    let mut lab = Labf32::from_size_val(size, 0.0)?;
    rgb.convert(&mut lab)?;

    let lab_small = resize(lab.as_image(), net.input_size(), options.interpolation)?;
    let (l_small, _, _) = split_channels(&lab_small)?;
    let l_input = mean_center(&l_small, options.luminance_offset)?;

    let (a_small, b_small) = net.predict_chroma(&l_input)?;

    let a = resize(&a_small, size, options.interpolation)?;
    let b = resize(&b_small, size, options.interpolation)?;

    // the chrominance is predicted at low resolution, the luminance is kept at full
    let l = lab.channel(0)?;
    let lab_out = Labf32::from(merge_channels(&l, &a, &b)?);

    let mut rgb_out = Rgbf32::from_size_val(size, 0.0)?;
    lab_out.convert(&mut rgb_out)?;

    let mut out = Image::from_size_val(size, 0u8)?;
    denormalize_u8(rgb_out.as_image(), &mut out)?;

    Ok(out)
}
