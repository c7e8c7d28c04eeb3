use crate::parallel;
use chromia_image::{Image, ImageError};

/// Split a three channel image into its planes.
///
/// This is a pure rearrangement: plane `k` holds channel `k` of every pixel.
///
/// # Example
///
/// ```
/// use chromia_image::{Image, ImageSize};
/// use chromia_imgproc::channels::split_channels;
///
/// let lab = Image::<f32, 3>::new(
///     ImageSize { width: 2, height: 1 },
///     vec![50.0, 1.0, 2.0, 60.0, 3.0, 4.0],
/// ).unwrap();
///
/// let (l, a, b) = split_channels(&lab).unwrap();
/// assert_eq!(l.as_slice(), &[50.0, 60.0]);
/// assert_eq!(a.as_slice(), &[1.0, 3.0]);
/// assert_eq!(b.as_slice(), &[2.0, 4.0]);
/// ```
#[allow(clippy::type_complexity)]
pub fn split_channels<T>(
    src: &Image<T, 3>,
) -> Result<(Image<T, 1>, Image<T, 1>, Image<T, 1>), ImageError>
where
    T: Copy,
{
    Ok((src.channel(0)?, src.channel(1)?, src.channel(2)?))
}

/// Merge three single channel planes into an interleaved image.
///
/// # Errors
///
/// Returns [`ImageError::ChannelMismatch`] if the planes do not share the same size.
///
/// # Example
///
/// ```
/// use chromia_image::{Image, ImageSize};
/// use chromia_imgproc::channels::merge_channels;
///
/// let size = ImageSize { width: 2, height: 1 };
/// let l = Image::<f32, 1>::new(size, vec![50.0, 60.0]).unwrap();
/// let a = Image::<f32, 1>::new(size, vec![1.0, 3.0]).unwrap();
/// let b = Image::<f32, 1>::new(size, vec![2.0, 4.0]).unwrap();
///
/// let lab = merge_channels(&l, &a, &b).unwrap();
/// assert_eq!(lab.as_slice(), &[50.0, 1.0, 2.0, 60.0, 3.0, 4.0]);
/// ```
pub fn merge_channels<T>(
    c0: &Image<T, 1>,
    c1: &Image<T, 1>,
    c2: &Image<T, 1>,
) -> Result<Image<T, 3>, ImageError>
where
    T: Copy,
{
    for plane in [c1, c2] {
        if plane.size() != c0.size() {
            return Err(ImageError::ChannelMismatch {
                expected: c0.size(),
                actual: plane.size(),
            });
        }
    }

    let data = c0
        .as_slice()
        .iter()
        .zip(c1.as_slice())
        .zip(c2.as_slice())
        .flat_map(|((&x0, &x1), &x2)| [x0, x1, x2])
        .collect();

    Image::new(c0.size(), data)
}

/// Subtract a fixed offset from every value of a luminance plane.
///
/// Returns a new plane; the source is left untouched so callers can keep using
/// the original values.
///
/// # Example
///
/// ```
/// use chromia_image::{Image, ImageSize};
/// use chromia_imgproc::channels::mean_center;
///
/// let l = Image::<f32, 1>::new(ImageSize { width: 2, height: 1 }, vec![50.0, 75.0]).unwrap();
/// let centered = mean_center(&l, 50.0).unwrap();
///
/// assert_eq!(centered.as_slice(), &[0.0, 25.0]);
/// assert_eq!(l.as_slice(), &[50.0, 75.0]);
/// ```
pub fn mean_center(src: &Image<f32, 1>, offset: f32) -> Result<Image<f32, 1>, ImageError> {
    let mut dst = Image::from_size_val(src.size(), 0.0f32)?;
    parallel::par_iter_rows_val(src, &mut dst, |&x, y| {
        *y = x - offset;
    });
    Ok(dst)
}
