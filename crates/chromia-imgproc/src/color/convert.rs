use chromia_image::{
    color_spaces::{Labf32, Rgbf32},
    ImageError,
};

/// Trait for type-safe color space conversion
///
/// This trait provides a clean, ergonomic API for converting between different
/// color spaces with compile-time type safety.
///
/// # Example
///
/// ```
/// use chromia_image::ImageSize;
/// use chromia_image::color_spaces::{Labf32, Rgbf32};
/// use chromia_imgproc::color::ConvertColor;
///
/// let rgb = Rgbf32::from_size_vec(
///     ImageSize { width: 4, height: 5 },
///     vec![0.5f32; 4 * 5 * 3],
/// ).unwrap();
///
/// let mut lab = Labf32::from_size_val(rgb.size(), 0.0).unwrap();
///
/// rgb.convert(&mut lab).unwrap();
/// ```
pub trait ConvertColor<Dst> {
    /// Convert this image to another color space
    fn convert(&self, dst: &mut Dst) -> Result<(), ImageError>;
}

/// Macro to implement color conversions
macro_rules! impl_convert {
    ($src:ty => $dst:ty, $func:path) => {
        impl ConvertColor<$dst> for $src {
            fn convert(&self, dst: &mut $dst) -> Result<(), ImageError> {
                $func(&self.0, &mut dst.0)
            }
        }
    };
}

// ===== RGB <-> LAB Conversions =====
impl_convert!(Rgbf32 => Labf32, crate::color::lab_from_rgb);
impl_convert!(Labf32 => Rgbf32, crate::color::rgb_from_lab);

#[cfg(test)]
mod tests {
    use super::*;
    use chromia_image::ImageSize;

    #[test]
    fn typed_round_trip() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        let rgb = Rgbf32::from_size_vec(size, vec![0.1, 0.2, 0.3, 0.9, 0.8, 0.7])?;
        let mut lab = Labf32::from_size_val(size, 0.0)?;
        rgb.convert(&mut lab)?;

        let mut back = Rgbf32::from_size_val(size, 0.0)?;
        lab.convert(&mut back)?;

        for (a, b) in rgb.as_slice().iter().zip(back.as_slice()) {
            approx::assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
        }
        Ok(())
    }
}
