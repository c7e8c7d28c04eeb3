#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`IoError`] variants for file access, encoding/decoding failures,
/// and format-specific errors.
pub mod error;

/// High-level image reading and writing functions.
///
/// See [`functional::read_image_rgb8`] for automatic format detection.
pub mod functional;

/// Reader for numpy `.npy` array files.
pub mod npy;

/// Frame-sequential video sources and sinks.
///
/// The [`stream::VideoSource`] and [`stream::VideoSink`] traits abstract over a
/// video file; GStreamer backed implementations require the `gstreamer` feature.
pub mod stream;

pub use crate::error::IoError;
