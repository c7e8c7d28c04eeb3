use crate::parallel;
use chromia_image::{ops::ensure_finite, Image, ImageError};

// sRGB (D65) to CIE XYZ
const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.412453, 0.357580, 0.180423],
    [0.212671, 0.715160, 0.072169],
    [0.019334, 0.119193, 0.950227],
];

const XYZ_TO_RGB: [[f32; 3]; 3] = [
    [3.240479, -1.537150, -0.498535],
    [-0.969256, 1.875991, 0.041556],
    [0.055648, -0.204043, 1.057311],
];

// D65 reference white, Y is normalized to 1
const WHITE_X: f32 = 0.950456;
const WHITE_Z: f32 = 1.088754;

const LAB_EPSILON: f32 = 0.008856;
const LAB_KAPPA: f32 = 903.3;
const LAB_SLOPE: f32 = 7.787;
const LAB_BIAS: f32 = 16.0 / 116.0;
// f(LAB_EPSILON), the knee of the inverse companding
const LAB_F_EPSILON: f32 = 0.206893;

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_SLOPE * t + LAB_BIAS
    }
}

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    if t > LAB_F_EPSILON {
        t * t * t
    } else {
        (t - LAB_BIAS) / LAB_SLOPE
    }
}

/// Convert a normalized RGB image to the CIE L*a*b* color space.
///
/// The input is interpreted as sRGB with values in `[0, 1]`; the gamma curve is
/// removed before projecting to XYZ with a D65 white point.
///
/// # Arguments
///
/// * `src` - The input RGB image with values in `[0, 1]`.
/// * `dst` - The output LAB image.
///
/// # Returns
///
/// The LAB image with the following channels:
///
/// * L: lightness in the range [0, 100].
/// * A: green-red chrominance, roughly in [-127, 127].
/// * B: blue-yellow chrominance, roughly in [-127, 127].
///
/// Precondition: the input and output images must have the same size.
///
/// # Errors
///
/// Returns [`ImageError::NonFinitePixel`] if the input holds NaN or infinite values.
///
/// # Example
///
/// ```
/// use chromia_image::{Image, ImageSize};
/// use chromia_imgproc::color::lab_from_rgb;
///
/// let image = Image::<f32, 3>::new(
///     ImageSize { width: 1, height: 1 },
///     vec![1.0, 1.0, 1.0],
/// ).unwrap();
///
/// let mut lab = Image::<f32, 3>::from_size_val(image.size(), 0.0).unwrap();
///
/// lab_from_rgb(&image, &mut lab).unwrap();
///
/// assert!((lab.as_slice()[0] - 100.0).abs() < 1e-3);
/// ```
pub fn lab_from_rgb(src: &Image<f32, 3>, dst: &mut Image<f32, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    ensure_finite(src)?;

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let r = srgb_to_linear(src_pixel[0]);
        let g = srgb_to_linear(src_pixel[1]);
        let b = srgb_to_linear(src_pixel[2]);

        let x = (RGB_TO_XYZ[0][0] * r + RGB_TO_XYZ[0][1] * g + RGB_TO_XYZ[0][2] * b) / WHITE_X;
        let y = RGB_TO_XYZ[1][0] * r + RGB_TO_XYZ[1][1] * g + RGB_TO_XYZ[1][2] * b;
        let z = (RGB_TO_XYZ[2][0] * r + RGB_TO_XYZ[2][1] * g + RGB_TO_XYZ[2][2] * b) / WHITE_Z;

        let fx = lab_f(x);
        let fy = lab_f(y);
        let fz = lab_f(z);

        let l = if y > LAB_EPSILON {
            116.0 * fy - 16.0
        } else {
            LAB_KAPPA * y
        };

        dst_pixel[0] = l;
        dst_pixel[1] = 500.0 * (fx - fy);
        dst_pixel[2] = 200.0 * (fy - fz);
    });

    Ok(())
}

/// Convert a CIE L*a*b* image back to normalized RGB.
///
/// This is the inverse of [`lab_from_rgb`]. The result is clipped to `[0, 1]`,
/// so chrominance values outside the sRGB gamut saturate instead of wrapping.
///
/// # Arguments
///
/// * `src` - The input LAB image.
/// * `dst` - The output RGB image with values in `[0, 1]`.
///
/// # Errors
///
/// Returns [`ImageError::NonFinitePixel`] if the input holds NaN or infinite values.
///
/// # Example
///
/// ```
/// use chromia_image::{Image, ImageSize};
/// use chromia_imgproc::color::rgb_from_lab;
///
/// let lab = Image::<f32, 3>::new(
///     ImageSize { width: 1, height: 1 },
///     vec![100.0, 0.0, 0.0],
/// ).unwrap();
///
/// let mut rgb = Image::<f32, 3>::from_size_val(lab.size(), 0.0).unwrap();
///
/// rgb_from_lab(&lab, &mut rgb).unwrap();
///
/// assert!(rgb.as_slice().iter().all(|v| (v - 1.0).abs() < 1e-3));
/// ```
pub fn rgb_from_lab(src: &Image<f32, 3>, dst: &mut Image<f32, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    ensure_finite(src)?;

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let (l, a, b) = (src_pixel[0], src_pixel[1], src_pixel[2]);

        let fy = (l + 16.0) / 116.0;
        let y = if l > LAB_KAPPA * LAB_EPSILON {
            fy * fy * fy
        } else {
            l / LAB_KAPPA
        };
        let x = lab_f_inv(fy + a / 500.0) * WHITE_X;
        let z = lab_f_inv(fy - b / 200.0) * WHITE_Z;

        for (k, out) in dst_pixel.iter_mut().enumerate() {
            let linear = XYZ_TO_RGB[k][0] * x + XYZ_TO_RGB[k][1] * y + XYZ_TO_RGB[k][2] * z;
            *out = linear_to_srgb(linear).clamp(0.0, 1.0);
        }
    });

    Ok(())
}
