use std::path::Path;

use chromia_tensor::Tensor;

use crate::error::IoError;

const NPY_MAGIC: &[u8] = b"\x93NUMPY";

/// Element types that can be decoded from a `.npy` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NpyDtype {
    F32,
    F64,
    I32,
    I64,
}

impl NpyDtype {
    fn parse(descr: &str) -> Result<Self, IoError> {
        match descr {
            "<f4" => Ok(Self::F32),
            "<f8" => Ok(Self::F64),
            "<i4" => Ok(Self::I32),
            "<i8" => Ok(Self::I64),
            other => Err(IoError::InvalidNpy(format!("unsupported dtype {other}"))),
        }
    }

    fn item_size(&self) -> usize {
        match self {
            Self::F32 | Self::I32 => 4,
            Self::F64 | Self::I64 => 8,
        }
    }

    fn decode(&self, bytes: &[u8]) -> f32 {
        match self {
            Self::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            Self::I32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32,
            Self::F64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes[..8]);
                f64::from_le_bytes(buf) as f32
            }
            Self::I64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes[..8]);
                i64::from_le_bytes(buf) as f32
            }
        }
    }
}

#[derive(Debug)]
struct NpyHeader {
    dtype: NpyDtype,
    shape: Vec<usize>,
}

/// Locate the literal that follows `'key':` in the header dictionary.
fn header_value<'a>(header: &'a str, key: &str) -> Result<&'a str, IoError> {
    let pattern = format!("'{key}':");
    let start = header
        .find(&pattern)
        .ok_or_else(|| IoError::InvalidNpy(format!("missing key {key}")))?;
    Ok(header[start + pattern.len()..].trim_start())
}

fn parse_header(header: &str) -> Result<NpyHeader, IoError> {
    let descr = header_value(header, "descr")?;
    let descr = descr
        .strip_prefix('\'')
        .and_then(|s| s.split('\'').next())
        .ok_or_else(|| IoError::InvalidNpy("malformed descr".to_string()))?;
    let dtype = NpyDtype::parse(descr)?;

    if header_value(header, "fortran_order")?.starts_with("True") {
        return Err(IoError::InvalidNpy(
            "fortran ordered arrays are not supported".to_string(),
        ));
    }

    let shape = header_value(header, "shape")?;
    let shape = shape
        .strip_prefix('(')
        .and_then(|s| s.split(')').next())
        .ok_or_else(|| IoError::InvalidNpy("malformed shape".to_string()))?;
    let shape = shape
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| IoError::InvalidNpy(format!("invalid dimension {s}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NpyHeader { dtype, shape })
}

/// Decode the content of a `.npy` file into an `f32` tensor of rank `N`.
///
/// Supports format versions 1.0 to 3.0 with little endian `f4`, `f8`, `i4` and
/// `i8` element types in C order. Values are converted to `f32`.
///
/// # Errors
///
/// Returns [`IoError::InvalidNpy`] if the header is malformed, the element type
/// is unsupported, the rank differs from `N` or the payload is truncated.
pub fn parse_npy_f32<const N: usize>(bytes: &[u8]) -> Result<Tensor<f32, N>, IoError> {
    if bytes.len() < 10 || !bytes.starts_with(NPY_MAGIC) {
        return Err(IoError::InvalidNpy("missing magic string".to_string()));
    }

    let major = bytes[6];
    let (header_len, header_start): (usize, usize) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(IoError::InvalidNpy("truncated header".to_string()));
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        v => return Err(IoError::InvalidNpy(format!("unsupported version {v}"))),
    };

    let data_start = header_start
        .checked_add(header_len)
        .ok_or_else(|| IoError::InvalidNpy("header length overflows".to_string()))?;
    let header = bytes
        .get(header_start..data_start)
        .ok_or_else(|| IoError::InvalidNpy("truncated header".to_string()))?;
    let header = std::str::from_utf8(header)
        .map_err(|_| IoError::InvalidNpy("header is not valid text".to_string()))?;
    let header = parse_header(header)?;

    let shape: [usize; N] = header.shape.as_slice().try_into().map_err(|_| {
        IoError::InvalidNpy(format!(
            "expected {N} dimensions, found shape {:?}",
            header.shape
        ))
    })?;

    let overflow = || IoError::InvalidNpy(format!("shape {shape:?} is too large"));
    let numel = shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(overflow)?;
    let item_size = header.dtype.item_size();
    let data_end = numel
        .checked_mul(item_size)
        .and_then(|len| len.checked_add(data_start))
        .ok_or_else(overflow)?;
    let payload = bytes
        .get(data_start..data_end)
        .ok_or_else(|| IoError::InvalidNpy("truncated data".to_string()))?;

    let data = payload
        .chunks_exact(item_size)
        .map(|chunk| header.dtype.decode(chunk))
        .collect();

    Ok(Tensor::from_shape_vec(shape, data)?)
}

/// Read a `.npy` file into an `f32` tensor of rank `N`.
///
/// See [`parse_npy_f32`] for the supported layouts.
///
/// # Example
///
/// ```no_run
/// use chromia_io::npy::read_npy_f32;
///
/// let points = read_npy_f32::<2>("models/pts_in_hull.npy").unwrap();
/// assert_eq!(points.shape, [313, 2]);
/// ```
pub fn read_npy_f32<const N: usize>(file_path: impl AsRef<Path>) -> Result<Tensor<f32, N>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes = std::fs::read(file_path)?;
    let tensor = parse_npy_f32(&bytes)?;
    log::debug!("loaded {} with shape {:?}", file_path.display(), tensor.shape);

    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;

    // builds a v1 file the way numpy.save lays it out
    fn npy_bytes(descr: &str, shape: &str, payload: &[u8]) -> Vec<u8> {
        let mut header =
            format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape}, }}");
        while (10 + header.len() + 1) % 64 != 0 {
            header.push(' ');
        }
        header.push('\n');

        let mut bytes = NPY_MAGIC.to_vec();
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn parse_f4_matrix() -> Result<(), IoError> {
        let payload = [1.0f32, -2.5, 3.0, 4.0, 5.0, 6.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<_>>();
        let bytes = npy_bytes("<f4", "(3, 2)", &payload);

        let tensor = parse_npy_f32::<2>(&bytes)?;
        assert_eq!(tensor.shape, [3, 2]);
        assert_eq!(tensor.as_slice(), &[1.0, -2.5, 3.0, 4.0, 5.0, 6.0]);
        Ok(())
    }

    #[test]
    fn parse_i8_matrix() -> Result<(), IoError> {
        let payload = [-90i64, 50, -90, 60]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<_>>();
        let bytes = npy_bytes("<i8", "(2, 2)", &payload);

        let tensor = parse_npy_f32::<2>(&bytes)?;
        assert_eq!(tensor.as_slice(), &[-90.0, 50.0, -90.0, 60.0]);
        Ok(())
    }

    #[test]
    fn parse_f8_vector() -> Result<(), IoError> {
        let payload = [0.5f64, 2.606]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<_>>();
        let bytes = npy_bytes("<f8", "(2,)", &payload);

        let tensor = parse_npy_f32::<1>(&bytes)?;
        assert_eq!(tensor.as_slice(), &[0.5, 2.606]);
        Ok(())
    }

    #[test]
    fn parse_rejects_bad_input() {
        let payload = vec![0u8; 4 * 4];

        // rank mismatch
        let bytes = npy_bytes("<f4", "(2, 2)", &payload);
        assert!(matches!(
            parse_npy_f32::<4>(&bytes),
            Err(IoError::InvalidNpy(_))
        ));

        // big endian
        let bytes = npy_bytes(">f4", "(2, 2)", &payload);
        assert!(parse_npy_f32::<2>(&bytes).is_err());

        // truncated payload
        let bytes = npy_bytes("<f4", "(3, 2)", &payload);
        assert!(parse_npy_f32::<2>(&bytes).is_err());

        assert!(parse_npy_f32::<2>(b"not a numpy file").is_err());
    }

    #[test]
    fn parse_rejects_oversized_shapes() {
        let payload = vec![0u8; 16];

        // element count overflows usize
        let huge = format!("({}, {})", usize::MAX, 2);
        let bytes = npy_bytes("<f4", &huge, &payload);
        assert!(matches!(
            parse_npy_f32::<2>(&bytes),
            Err(IoError::InvalidNpy(_))
        ));

        // element count fits, byte length does not
        let huge = format!("({}, {})", usize::MAX / 2, 1);
        let bytes = npy_bytes("<f8", &huge, &payload);
        assert!(matches!(
            parse_npy_f32::<2>(&bytes),
            Err(IoError::InvalidNpy(_))
        ));
    }

    #[test]
    fn read_from_file() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("points.npy");

        let payload = [7.0f32, 8.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<_>>();
        std::fs::write(&file_path, npy_bytes("<f4", "(1, 2)", &payload))?;

        let tensor = read_npy_f32::<2>(&file_path)?;
        assert_eq!(tensor.shape, [1, 2]);

        assert!(matches!(
            read_npy_f32::<2>(tmp_dir.path().join("nope.npy")),
            Err(IoError::FileDoesNotExist(_))
        ));
        Ok(())
    }
}
