use std::path::Path;

use chromia_tensor::{Tensor2, Tensor4};

use crate::error::DnnError;

/// Number of quantized chrominance bins predicted by the network.
pub const NUM_CLUSTERS: usize = 313;

/// The chrominance cluster centers of the colorization network.
///
/// Stored as the `2 x 313 x 1 x 1` convolution kernel the network's class
/// layer expects: channel 0 holds the A coordinates and channel 1 the B
/// coordinates of every bin.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterPrior {
    kernel: Tensor4<f32>,
}

impl ClusterPrior {
    /// Build the prior from a `313 x 2` table of `(a, b)` bin centers.
    ///
    /// # Errors
    ///
    /// Returns [`DnnError::InvalidClusterPrior`] if the table has another shape.
    pub fn from_points(points: Tensor2<f32>) -> Result<Self, DnnError> {
        if points.shape != [NUM_CLUSTERS, 2] {
            return Err(DnnError::InvalidClusterPrior(points.shape.to_vec()));
        }

        let kernel = points
            .permute_axes([1, 0])?
            .reshape([2, NUM_CLUSTERS, 1, 1])?;

        Ok(Self { kernel })
    }

    /// Load the bin centers from a `.npy` file holding a `313 x 2` array.
    pub fn from_npy(file_path: impl AsRef<Path>) -> Result<Self, DnnError> {
        let points = chromia_io::npy::read_npy_f32::<2>(file_path)?;
        Self::from_points(points)
    }

    /// The `2 x 313 x 1 x 1` kernel.
    pub fn kernel(&self) -> &Tensor4<f32> {
        &self.kernel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Result<Tensor2<f32>, DnnError> {
        let data = (0..NUM_CLUSTERS)
            .flat_map(|i| [i as f32, -(i as f32)])
            .collect();
        Ok(Tensor2::from_shape_vec([NUM_CLUSTERS, 2], data)?)
    }

    #[test]
    fn prior_is_transposed_into_a_kernel() -> Result<(), DnnError> {
        let prior = ClusterPrior::from_points(points()?)?;
        let kernel = prior.kernel();

        assert_eq!(kernel.shape, [2, NUM_CLUSTERS, 1, 1]);
        assert_eq!(kernel.get([0, 5, 0, 0]), Some(&5.0));
        assert_eq!(kernel.get([1, 5, 0, 0]), Some(&-5.0));
        assert_eq!(kernel.get([1, 312, 0, 0]), Some(&-312.0));
        Ok(())
    }

    #[test]
    fn prior_rejects_wrong_shape() -> Result<(), DnnError> {
        let bad = Tensor2::from_shape_vec([2, NUM_CLUSTERS], vec![0.0; 2 * NUM_CLUSTERS])?;
        assert!(matches!(
            ClusterPrior::from_points(bad),
            Err(DnnError::InvalidClusterPrior(shape)) if shape == vec![2, NUM_CLUSTERS]
        ));
        Ok(())
    }

    #[test]
    fn prior_from_int64_npy() -> Result<(), Box<dyn std::error::Error>> {
        let header = format!(
            "{{'descr': '<i8', 'fortran_order': False, 'shape': ({NUM_CLUSTERS}, 2), }}"
        );
        // magic, version 1.0, header padded to a multiple of 64 bytes
        let mut header = header.into_bytes();
        let padded = (10 + header.len() + 1).div_ceil(64) * 64;
        header.resize(padded - 10 - 1, b' ');
        header.push(b'\n');

        let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&header);
        for i in 0..NUM_CLUSTERS as i64 {
            bytes.extend_from_slice(&(i - 110).to_le_bytes());
            bytes.extend_from_slice(&(110 - i).to_le_bytes());
        }

        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("pts_in_hull.npy");
        std::fs::write(&file_path, bytes)?;

        let prior = ClusterPrior::from_npy(&file_path)?;
        assert_eq!(prior.kernel().get([0, 0, 0, 0]), Some(&-110.0));
        assert_eq!(prior.kernel().get([1, 0, 0, 0]), Some(&110.0));
        assert_eq!(prior.kernel().get([0, 312, 0, 0]), Some(&202.0));
        Ok(())
    }

    #[test]
    fn prior_missing_file() {
        assert!(matches!(
            ClusterPrior::from_npy("does/not/exist.npy"),
            Err(DnnError::IoError(_))
        ));
    }
}
