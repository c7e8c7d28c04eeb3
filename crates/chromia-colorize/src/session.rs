use chromia_dnn::{ClusterPrior, ColorizationNet, ModelBackend, ModelLoader};
use chromia_image::Image;

use crate::config::ColorizeConfig;
use crate::error::{ColorizeError, StageError};
use crate::frame::{colorize_frame, FrameOptions};

/// A prepared network together with the configuration it was built from.
///
/// A session is created once per run and reused by every image and video
/// job. It is not shared between threads: each forward pass mutates the
/// backend.
pub struct ColorizationSession<M> {
    net: ColorizationNet<M>,
    config: ColorizeConfig,
}

impl<M: ModelLoader> ColorizationSession<M> {
    /// Validate the configuration, load the network and attach its fixed tensors.
    ///
    /// # Errors
    ///
    /// Returns [`ColorizeError::Config`] if the configuration is invalid and
    /// [`ColorizeError::ModelConfiguration`] if the network or the cluster
    /// prior cannot be loaded or do not fit together.
    pub fn open(config: ColorizeConfig) -> Result<Self, ColorizeError> {
        config.validate()?;

        log::info!(
            "loading model {} / {}",
            config.model.topology.display(),
            config.model.weights.display()
        );
        let model = M::load(&config.model.topology, &config.model.weights)
            .map_err(ColorizeError::ModelConfiguration)?;
        let prior = ClusterPrior::from_npy(&config.model.cluster_prior)
            .map_err(ColorizeError::ModelConfiguration)?;

        Self::from_model(model, &prior, config)
    }
}

impl<M: ModelBackend> ColorizationSession<M> {
    /// Build a session around an already loaded backend.
    ///
    /// The configuration paths are not checked.
    pub fn from_model(
        model: M,
        prior: &ClusterPrior,
        config: ColorizeConfig,
    ) -> Result<Self, ColorizeError> {
        let net = ColorizationNet::prepare(
            model,
            prior,
            config.rebalance,
            config.network_input_size(),
        )
        .map_err(ColorizeError::ModelConfiguration)?;

        Ok(Self { net, config })
    }

    /// The configuration of this session.
    pub fn config(&self) -> &ColorizeConfig {
        &self.config
    }

    /// Parameters applied to every frame.
    pub fn frame_options(&self) -> FrameOptions {
        FrameOptions {
            luminance_offset: self.config.luminance_offset,
            interpolation: self.config.interpolation.into(),
        }
    }

    /// Colorize one 8-bit RGB frame with this session's network.
    pub fn colorize_frame(&mut self, frame: &Image<u8, 3>) -> Result<Image<u8, 3>, StageError> {
        let options = self.frame_options();
        colorize_frame(&mut self.net, frame, &options)
    }

    /// Give back the underlying backend.
    pub fn into_inner(self) -> M {
        self.net.into_inner()
    }
}
