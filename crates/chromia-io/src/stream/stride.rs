use crate::error::IoError;

/// Number of bytes per row of a packed 8-bit RGB frame in a raw video buffer.
///
/// Raw video rows start on a 4 byte boundary, so the stride is `width * 3`
/// rounded up to the next multiple of 4.
///
/// # Examples
///
/// ```rust
/// use chromia_io::stream::stride::rgb_row_stride;
///
/// assert_eq!(rgb_row_stride(64), 192);
/// assert_eq!(rgb_row_stride(66), 200);
/// ```
pub fn rgb_row_stride(width: usize) -> usize {
    (width * 3 + 3) & !3
}

/// Copy tightly packed rows into a buffer whose rows are `stride` bytes apart.
///
/// The padding bytes at the end of each row are zero.
pub fn pad_rows(src: &[u8], row_bytes: usize, stride: usize) -> Vec<u8> {
    if row_bytes == 0 || row_bytes == stride {
        return src.to_vec();
    }
    let mut dst = vec![0u8; src.len() / row_bytes * stride];
    dst.chunks_exact_mut(stride)
        .zip(src.chunks_exact(row_bytes))
        .for_each(|(dst_row, src_row)| dst_row[..row_bytes].copy_from_slice(src_row));
    dst
}

/// Drop the row padding of a buffer holding `height` rows `stride` bytes apart.
///
/// # Errors
///
/// Returns [`IoError::InvalidFrameBuffer`] if the stride is shorter than a row
/// or the buffer holds fewer than `height` rows.
pub fn unpad_rows(
    src: &[u8],
    row_bytes: usize,
    stride: usize,
    height: usize,
) -> Result<Vec<u8>, IoError> {
    let needed = stride
        .checked_mul(height.saturating_sub(1))
        .and_then(|n| n.checked_add(row_bytes));
    match needed {
        Some(needed) if stride >= row_bytes && src.len() >= needed => {}
        _ => {
            return Err(IoError::InvalidFrameBuffer {
                expected: row_bytes * height,
                actual: src.len(),
            })
        }
    }

    if stride == row_bytes {
        return Ok(src[..row_bytes * height].to_vec());
    }

    let mut pixels = Vec::with_capacity(row_bytes * height);
    for y in 0..height {
        let start = y * stride;
        pixels.extend_from_slice(&src[start..start + row_bytes]);
    }
    Ok(pixels)
}
