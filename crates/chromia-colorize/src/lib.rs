#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Side by side comparison of an original and its colorization.
pub mod compare;

/// Explicit configuration of a colorization session.
pub mod config;

/// Error types for the colorization jobs.
pub mod error;

/// Colorization of a single frame.
pub mod frame;

/// Still image jobs.
pub mod image_job;

/// Loaded model plus configuration, shared by all jobs of a run.
pub mod session;

/// Frame-sequential video jobs.
pub mod video;

pub use crate::config::{ColorizeConfig, ModelPaths};
pub use crate::error::{ColorizeError, FrameColorizationError, StageError};
pub use crate::image_job::{colorize_directory, colorize_image, ImageJobReport};
pub use crate::session::ColorizationSession;
pub use crate::video::{VideoColorizer, VideoJobReport, VideoJobState};

#[cfg(feature = "gstreamer")]
pub use crate::video::colorize_video;
