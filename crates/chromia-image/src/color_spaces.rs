use crate::{
    error::ImageError,
    image::{Image, ImageSize},
};
use std::ops::{Deref, DerefMut};

/// Macro to define a color space wrapper type with explicit bit depth
macro_rules! define_color_space {
    ($name:ident, $type:ty, $channels:expr, $doc:expr) => {
        #[doc = $doc]
        ///
        /// This is a zero-cost wrapper that tags the pixel buffer with its color model.
        #[derive(Clone, Debug, PartialEq)]
        #[repr(transparent)]
        pub struct $name(pub Image<$type, $channels>);

        impl $name {
            #[doc = concat!("Create ", stringify!($name), " image from size and data")]
            pub fn from_size_vec(size: ImageSize, data: Vec<$type>) -> Result<Self, ImageError> {
                Ok(Self(Image::new(size, data)?))
            }

            #[doc = concat!("Create ", stringify!($name), " image from size with default value")]
            pub fn from_size_val(size: ImageSize, val: $type) -> Result<Self, ImageError> {
                Ok(Self(Image::from_size_val(size, val)?))
            }

            /// Unwrap into the underlying Image
            pub fn into_inner(self) -> Image<$type, $channels> {
                self.0
            }

            /// Get a reference to the underlying Image
            pub fn as_image(&self) -> &Image<$type, $channels> {
                &self.0
            }

            /// Get a mutable reference to the underlying Image
            pub fn as_image_mut(&mut self) -> &mut Image<$type, $channels> {
                &mut self.0
            }
        }

        impl Deref for $name {
            type Target = Image<$type, $channels>;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl AsRef<Image<$type, $channels>> for $name {
            fn as_ref(&self) -> &Image<$type, $channels> {
                &self.0
            }
        }

        impl From<Image<$type, $channels>> for $name {
            fn from(image: Image<$type, $channels>) -> Self {
                Self(image)
            }
        }
    };
}

define_color_space!(
    Rgbf32,
    f32,
    3,
    "RGB color space with 32-bit floating point channels normalized to [0, 1]"
);
define_color_space!(
    Labf32,
    f32,
    3,
    "CIE L*a*b* color space with 32-bit floating point channels (L in [0, 100])"
);
define_color_space!(
    Grayf32,
    f32,
    1,
    "Single channel plane with 32-bit floating point values (luminance or chrominance)"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_and_unwrap() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        let lab = Labf32::from_size_val(size, 50.0)?;
        assert_eq!(lab.num_channels(), 3);
        assert_eq!(lab.as_image().size(), size);

        let image = lab.into_inner();
        let gray = Grayf32::from(image.channel(0)?);
        assert_eq!(gray.as_slice(), &[50.0, 50.0]);
        Ok(())
    }
}
