use std::time::Instant;

use chromia_image::{Image, ImageSize};
use chromia_tensor::Tensor4;

use crate::backend::{Blob, ModelBackend};
use crate::error::DnnError;
use crate::prior::{ClusterPrior, NUM_CLUSTERS};

/// Layer receiving the cluster centers as a fixed convolution kernel.
pub const CLASS_KERNEL_LAYER: &str = "class8_ab";

/// Layer receiving the class rebalancing bias.
pub const REBALANCE_LAYER: &str = "conv8_313_rh";

/// Rebalancing value the reference network was trained with.
pub const DEFAULT_REBALANCE: f32 = 2.606;

/// Input resolution of the reference network.
pub const DEFAULT_INPUT_SIZE: ImageSize = ImageSize {
    width: 224,
    height: 224,
};

/// A colorization network ready for inference.
///
/// Owning the backend guarantees the fixed tensors are attached before the
/// first forward pass: the only way to obtain a `ColorizationNet` is
/// [`ColorizationNet::prepare`].
pub struct ColorizationNet<M> {
    model: M,
    input_size: ImageSize,
}

impl<M: ModelBackend> ColorizationNet<M> {
    /// Attach the cluster kernel and the rebalancing bias to the network.
    ///
    /// # Arguments
    ///
    /// * `model` - The loaded network.
    /// * `prior` - The chrominance cluster centers.
    /// * `rebalance` - Value of the `1 x 313` rebalancing tensor.
    /// * `input_size` - The fixed resolution the network consumes.
    ///
    /// # Errors
    ///
    /// Returns [`DnnError::MissingLayer`] if the network lacks either target layer.
    pub fn prepare(
        mut model: M,
        prior: &ClusterPrior,
        rebalance: f32,
        input_size: ImageSize,
    ) -> Result<Self, DnnError> {
        model.set_fixed_tensor(CLASS_KERNEL_LAYER, Blob::from(prior.kernel().clone()))?;
        model.set_fixed_tensor(
            REBALANCE_LAYER,
            Blob::filled(vec![1, NUM_CLUSTERS], rebalance),
        )?;

        log::debug!(
            "network prepared: input {}, rebalance {}",
            input_size,
            rebalance
        );

        Ok(Self { model, input_size })
    }

    /// The resolution the network consumes.
    pub fn input_size(&self) -> ImageSize {
        self.input_size
    }

    /// Predict the A and B planes for a mean-centered luminance plane.
    ///
    /// The plane is wrapped as a `[1, 1, H, W]` tensor; the network must answer
    /// with a `[1, 2, h, w]` tensor whose two channels are returned as images of
    /// size `w x h`.
    ///
    /// # Errors
    ///
    /// Returns [`DnnError::InputSizeMismatch`] if the plane is not at the input
    /// resolution and [`DnnError::UnexpectedOutputShape`] if the output layout
    /// differs from the one above.
    pub fn predict_chroma(
        &mut self,
        luminance: &Image<f32, 1>,
    ) -> Result<(Image<f32, 1>, Image<f32, 1>), DnnError> {
        if luminance.size() != self.input_size {
            return Err(DnnError::InputSizeMismatch {
                expected: self.input_size,
                actual: luminance.size(),
            });
        }

        let ImageSize { width, height } = self.input_size;
        let input = Tensor4::from_shape_vec([1, 1, height, width], luminance.as_slice().to_vec())?;

        let start = Instant::now();
        let output = self.model.forward(&input)?;
        log::debug!(
            "forward pass took {:.1} ms",
            start.elapsed().as_secs_f32() * 1000.0
        );

        let [batch, channels, out_h, out_w] = output.shape;
        if batch != 1 || channels != 2 || out_h == 0 || out_w == 0 {
            return Err(DnnError::UnexpectedOutputShape {
                expected: "[1, 2, h, w]".to_string(),
                actual: output.shape.to_vec(),
            });
        }

        let out_size = ImageSize {
            width: out_w,
            height: out_h,
        };
        let mut data = output.into_vec();
        let b = data.split_off(out_size.area());

        Ok((Image::new(out_size, data)?, Image::new(out_size, b)?))
    }

    /// Give back the underlying backend.
    pub fn into_inner(self) -> M {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use chromia_tensor::Tensor2;

    // stands in for a network exposing the two injectable layers
    #[derive(Default)]
    struct RecordingModel {
        layers: Vec<&'static str>,
        fixed: HashMap<String, Blob>,
        output_shape: [usize; 4],
        inputs: Vec<Tensor4<f32>>,
    }

    impl RecordingModel {
        fn new(output_shape: [usize; 4]) -> Self {
            Self {
                layers: vec![CLASS_KERNEL_LAYER, REBALANCE_LAYER],
                output_shape,
                ..Default::default()
            }
        }
    }

    impl ModelBackend for RecordingModel {
        fn set_fixed_tensor(&mut self, layer: &str, blob: Blob) -> Result<(), DnnError> {
            if !self.layers.contains(&layer) {
                return Err(DnnError::MissingLayer(layer.to_string()));
            }
            self.fixed.insert(layer.to_string(), blob);
            Ok(())
        }

        fn forward(&mut self, input: &Tensor4<f32>) -> Result<Tensor4<f32>, DnnError> {
            self.inputs.push(input.clone());
            // channel 0 carries A=10, channel 1 carries B=-10
            Ok(Tensor4::from_shape_fn(self.output_shape, |[_, c, _, _]| {
                if c == 0 {
                    10.0
                } else {
                    -10.0
                }
            }))
        }
    }

    fn prior() -> Result<ClusterPrior, DnnError> {
        let points = Tensor2::from_shape_vec([NUM_CLUSTERS, 2], vec![1.0; NUM_CLUSTERS * 2])?;
        ClusterPrior::from_points(points)
    }

    #[test]
    fn prepare_injects_fixed_tensors() -> Result<(), DnnError> {
        let net = ColorizationNet::prepare(
            RecordingModel::new([1, 2, 2, 2]),
            &prior()?,
            DEFAULT_REBALANCE,
            [4, 4].into(),
        )?;
        let model = net.into_inner();

        let kernel = &model.fixed[CLASS_KERNEL_LAYER];
        assert_eq!(kernel.shape, vec![2, NUM_CLUSTERS, 1, 1]);

        let rebalance = &model.fixed[REBALANCE_LAYER];
        assert_eq!(rebalance.shape, vec![1, NUM_CLUSTERS]);
        assert!(rebalance.data.iter().all(|v| *v == DEFAULT_REBALANCE));
        Ok(())
    }

    #[test]
    fn prepare_fails_on_missing_layer() -> Result<(), DnnError> {
        let mut model = RecordingModel::new([1, 2, 2, 2]);
        model.layers = vec![CLASS_KERNEL_LAYER];

        let result = ColorizationNet::prepare(model, &prior()?, DEFAULT_REBALANCE, [4, 4].into());
        assert!(matches!(result, Err(DnnError::MissingLayer(layer)) if layer == REBALANCE_LAYER));
        Ok(())
    }

    #[test]
    fn predict_chroma_wraps_and_unwraps() -> Result<(), DnnError> {
        let mut net = ColorizationNet::prepare(
            RecordingModel::new([1, 2, 2, 3]),
            &prior()?,
            DEFAULT_REBALANCE,
            [4, 4].into(),
        )?;

        let luminance = Image::<f32, 1>::from_size_val([4, 4].into(), -3.5)?;
        let (a, b) = net.predict_chroma(&luminance)?;

        assert_eq!(a.size(), ImageSize { width: 3, height: 2 });
        assert!(a.as_slice().iter().all(|v| *v == 10.0));
        assert!(b.as_slice().iter().all(|v| *v == -10.0));

        let model = net.into_inner();
        assert_eq!(model.inputs.len(), 1);
        assert_eq!(model.inputs[0].shape, [1, 1, 4, 4]);
        assert!(model.inputs[0].as_slice().iter().all(|v| *v == -3.5));
        Ok(())
    }

    #[test]
    fn predict_chroma_validates_shapes() -> Result<(), DnnError> {
        let mut net = ColorizationNet::prepare(
            RecordingModel::new([1, 3, 2, 2]),
            &prior()?,
            DEFAULT_REBALANCE,
            [4, 4].into(),
        )?;

        let wrong_size = Image::<f32, 1>::from_size_val([5, 4].into(), 0.0)?;
        assert!(matches!(
            net.predict_chroma(&wrong_size),
            Err(DnnError::InputSizeMismatch { .. })
        ));

        let luminance = Image::<f32, 1>::from_size_val([4, 4].into(), 0.0)?;
        assert!(matches!(
            net.predict_chroma(&luminance),
            Err(DnnError::UnexpectedOutputShape { .. })
        ));
        Ok(())
    }
}
