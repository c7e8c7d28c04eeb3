use chromia_image::{Image, ImageError, ImageSize};

/// Place two images side by side, `left` first.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if the heights differ.
///
/// # Example
///
/// ```
/// use chromia_image::Image;
/// use chromia_imgproc::stack::hstack;
///
/// let a = Image::<u8, 1>::from_size_val([2, 3].into(), 0).unwrap();
/// let b = Image::<u8, 1>::from_size_val([1, 3].into(), 255).unwrap();
/// let ab = hstack(&a, &b).unwrap();
///
/// assert_eq!(ab.width(), 3);
/// assert_eq!(ab.height(), 3);
/// assert_eq!(ab.as_slice()[..3], [0, 0, 255]);
/// ```
pub fn hstack<T, const C: usize>(
    left: &Image<T, C>,
    right: &Image<T, C>,
) -> Result<Image<T, C>, ImageError>
where
    T: Copy,
{
    if left.rows() != right.rows() {
        return Err(ImageError::InvalidImageSize(
            left.cols(),
            left.rows(),
            right.cols(),
            right.rows(),
        ));
    }

    let mut data = Vec::with_capacity(left.numel() + right.numel());
    for (l, r) in left
        .as_slice()
        .chunks_exact(left.cols() * C)
        .zip(right.as_slice().chunks_exact(right.cols() * C))
    {
        data.extend_from_slice(l);
        data.extend_from_slice(r);
    }

    Image::new(
        ImageSize {
            width: left.cols() + right.cols(),
            height: left.rows(),
        },
        data,
    )
}

/// Place two images on top of each other, `top` first.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if the widths differ.
pub fn vstack<T, const C: usize>(
    top: &Image<T, C>,
    bottom: &Image<T, C>,
) -> Result<Image<T, C>, ImageError>
where
    T: Copy,
{
    if top.cols() != bottom.cols() {
        return Err(ImageError::InvalidImageSize(
            top.cols(),
            top.rows(),
            bottom.cols(),
            bottom.rows(),
        ));
    }

    let mut data = Vec::with_capacity(top.numel() + bottom.numel());
    data.extend_from_slice(top.as_slice());
    data.extend_from_slice(bottom.as_slice());

    Image::new(
        ImageSize {
            width: top.cols(),
            height: top.rows() + bottom.rows(),
        },
        data,
    )
}
