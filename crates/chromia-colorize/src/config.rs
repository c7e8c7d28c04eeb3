use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use chromia_image::ImageSize;
use chromia_imgproc::interpolation::InterpolationMode;

use crate::error::ColorizeError;

/// Paths to the three files the colorization network is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPaths {
    /// network topology descriptor
    pub topology: PathBuf,
    /// trained weights
    pub weights: PathBuf,
    /// `313 x 2` array of chrominance bin centers
    pub cluster_prior: PathBuf,
}

/// Resampling filter used to move between frame and network resolutions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// bilinear blend of the four nearest pixels
    #[default]
    Bilinear,
    /// closest pixel
    Nearest,
}

impl From<Interpolation> for InterpolationMode {
    fn from(interpolation: Interpolation) -> Self {
        match interpolation {
            Interpolation::Bilinear => InterpolationMode::Bilinear,
            Interpolation::Nearest => InterpolationMode::Nearest,
        }
    }
}

fn default_input_size() -> [usize; 2] {
    [224, 224]
}

fn default_luminance_offset() -> f32 {
    50.0
}

fn default_rebalance() -> f32 {
    chromia_dnn::net::DEFAULT_REBALANCE
}

fn default_output_suffix() -> String {
    "_colorized".to_string()
}

/// Configuration of a colorization session.
///
/// Every field but `model` and `output_dir` has a default matching the
/// reference network, so a minimal JSON file reads:
///
/// ```json
/// {
///   "model": {
///     "topology": "models/colorization_deploy_v2.prototxt",
///     "weights": "models/colorization_release_v2.caffemodel",
///     "cluster_prior": "models/pts_in_hull.npy"
///   },
///   "output_dir": "out"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorizeConfig {
    /// network files
    pub model: ModelPaths,
    /// directory receiving the colorized files
    pub output_dir: PathBuf,
    /// network input resolution as `[width, height]`
    #[serde(default = "default_input_size")]
    pub input_size: [usize; 2],
    /// value subtracted from the luminance plane before inference
    #[serde(default = "default_luminance_offset")]
    pub luminance_offset: f32,
    /// value of the class rebalancing tensor
    #[serde(default = "default_rebalance")]
    pub rebalance: f32,
    /// appended to the input file stem to name outputs
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
    /// resampling filter
    #[serde(default)]
    pub interpolation: Interpolation,
    /// also write a side by side comparison for still images
    #[serde(default)]
    pub save_comparison: bool,
}

impl ColorizeConfig {
    /// Create a configuration with default parameters.
    pub fn new(model: ModelPaths, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            model,
            output_dir: output_dir.into(),
            input_size: default_input_size(),
            luminance_offset: default_luminance_offset(),
            rebalance: default_rebalance(),
            output_suffix: default_output_suffix(),
            interpolation: Interpolation::default(),
            save_comparison: false,
        }
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ColorizeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file.
    pub fn from_json_file(file_path: impl AsRef<Path>) -> Result<Self, ColorizeError> {
        let file_path = file_path.as_ref();
        let json = std::fs::read_to_string(file_path)?;
        log::debug!("loaded configuration from {}", file_path.display());
        Self::from_json_str(&json)
    }

    /// The network input resolution.
    pub fn network_input_size(&self) -> ImageSize {
        self.input_size.into()
    }

    /// Check that every configured path exists and the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ColorizeError::Config`] listing every problem found.
    pub fn validate(&self) -> Result<(), ColorizeError> {
        let mut problems = Vec::new();

        let paths = [
            ("model topology", &self.model.topology),
            ("model weights", &self.model.weights),
            ("cluster prior", &self.model.cluster_prior),
            ("output directory", &self.output_dir),
        ];
        for (name, path) in paths {
            if !path.exists() {
                problems.push(format!("{name} {} does not exist", path.display()));
            }
        }

        if self.input_size.contains(&0) {
            problems.push(format!("input size {:?} has a zero dimension", self.input_size));
        }
        if !self.luminance_offset.is_finite() {
            problems.push("luminance offset must be finite".to_string());
        }
        if !self.rebalance.is_finite() {
            problems.push("rebalance must be finite".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ColorizeError::Config(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_uses_defaults() -> Result<(), ColorizeError> {
        let config = ColorizeConfig::from_json_str(
            r#"{
                "model": {
                    "topology": "a.prototxt",
                    "weights": "b.caffemodel",
                    "cluster_prior": "c.npy"
                },
                "output_dir": "out"
            }"#,
        )?;

        assert_eq!(config.network_input_size(), [224, 224].into());
        assert_eq!(config.luminance_offset, 50.0);
        assert_eq!(config.rebalance, 2.606);
        assert_eq!(config.output_suffix, "_colorized");
        assert_eq!(config.interpolation, Interpolation::Bilinear);
        assert!(!config.save_comparison);
        Ok(())
    }

    #[test]
    fn overrides_are_parsed() -> Result<(), ColorizeError> {
        let config = ColorizeConfig::from_json_str(
            r#"{
                "model": {"topology": "a", "weights": "b", "cluster_prior": "c"},
                "output_dir": "out",
                "input_size": [256, 128],
                "interpolation": "nearest",
                "output_suffix": "_color"
            }"#,
        )?;
        assert_eq!(
            config.network_input_size(),
            ImageSize {
                width: 256,
                height: 128
            }
        );
        assert_eq!(
            InterpolationMode::from(config.interpolation),
            InterpolationMode::Nearest
        );
        assert_eq!(config.output_suffix, "_color");
        Ok(())
    }

    #[test]
    fn validate_lists_every_missing_path() -> Result<(), ColorizeError> {
        let tmp_dir = tempfile::tempdir()?;
        let weights = tmp_dir.path().join("weights.onnx");
        std::fs::write(&weights, b"")?;

        let config = ColorizeConfig::new(
            ModelPaths {
                topology: tmp_dir.path().join("missing.prototxt"),
                weights,
                cluster_prior: tmp_dir.path().join("missing.npy"),
            },
            tmp_dir.path(),
        );

        match config.validate() {
            Err(ColorizeError::Config(problems)) => {
                assert_eq!(problems.len(), 2);
                assert!(problems[0].contains("missing.prototxt"));
                assert!(problems[1].contains("missing.npy"));
            }
            other => panic!("unexpected result {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            ColorizeConfig::from_json_str("{ \"model\": 3 }"),
            Err(ColorizeError::ConfigParse(_))
        ));
    }
}
