use std::path::Path;

use chromia_image::{Image, ImageSize};

use crate::error::IoError;

/// File extensions the image boundary can read and write, lower case.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Check whether a path carries one of the [`SUPPORTED_IMAGE_EXTENSIONS`].
///
/// The comparison is case insensitive.
pub fn is_supported_image(file_path: impl AsRef<Path>) -> bool {
    file_path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_IMAGE_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
}

/// Reads an image from the given file path as 8-bit RGB.
///
/// The method tries to read from any image format supported by the image crate.
/// Grayscale and alpha images are expanded/flattened to three channels.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the image data.
///
/// # Errors
///
/// Returns [`IoError::FileDoesNotExist`] if the path is missing and
/// [`IoError::ImageDecodeError`] if the content cannot be decoded.
pub fn read_image_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path));
    }

    // open the file and map it to memory
    let file = std::fs::File::open(&file_path)?;
    let mmap = unsafe { memmap2::Mmap::map(&file)? };

    // decode the data directly from memory
    let img = image::ImageReader::new(std::io::Cursor::new(&mmap))
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    log::debug!("decoded {} ({}, {:?})", file_path.display(), size, img.color());

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Writes an 8-bit RGB image to the given file path.
///
/// The encoder is chosen from the file extension.
///
/// # Arguments
///
/// * `file_path` - The destination path, ending in one of [`SUPPORTED_IMAGE_EXTENSIONS`].
/// * `image` - The image to encode.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    if !is_supported_image(file_path) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let buffer = image::RgbImage::from_raw(
        image.width() as u32,
        image.height() as u32,
        image.as_slice().to_vec(),
    )
    .ok_or(IoError::ImageCreationError(
        chromia_image::ImageError::InvalidChannelShape(
            image.numel(),
            image.width() * image.height() * 3,
        ),
    ))?;

    buffer.save(file_path)?;

    Ok(())
}
