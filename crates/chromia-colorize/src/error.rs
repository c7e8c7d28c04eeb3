use std::path::PathBuf;

use chromia_dnn::DnnError;
use chromia_image::ImageError;
use chromia_io::IoError;

/// The stage of the frame pipeline that failed.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// A buffer was malformed: wrong shape, wrong size or non-finite values.
    #[error("Invalid image. {0}")]
    InvalidImage(ImageError),

    /// Channel planes disagreed on their dimensions.
    #[error("Channel mismatch. {0}")]
    ChannelMismatch(ImageError),

    /// The network rejected the input or failed to run.
    #[error("Inference failed. {0}")]
    Inference(#[from] DnnError),
}

impl From<ImageError> for StageError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::ChannelMismatch { .. } => StageError::ChannelMismatch(err),
            _ => StageError::InvalidImage(err),
        }
    }
}

/// A frame could not be colorized.
#[derive(thiserror::Error, Debug)]
#[error("Failed to colorize frame {index}. {source}")]
pub struct FrameColorizationError {
    /// position of the frame in its job, 0 for still images
    pub index: u64,
    /// the failing stage
    #[source]
    pub source: StageError,
}

/// An error type for the colorization jobs.
#[derive(thiserror::Error, Debug)]
pub enum ColorizeError {
    /// A frame failed to colorize.
    #[error(transparent)]
    Frame(#[from] FrameColorizationError),

    /// The network files are inconsistent with what the pipeline expects.
    #[error("Model configuration error. {0}")]
    ModelConfiguration(#[source] DnnError),

    /// The input image or video could not be opened.
    #[error("Source {path} unavailable. {source}")]
    SourceUnavailable {
        /// input path
        path: PathBuf,
        /// underlying I/O failure
        #[source]
        source: IoError,
    },

    /// A frame could not be pulled from an open source.
    #[error("Failed to read frame {index}. {source}")]
    FrameRead {
        /// position of the frame that failed
        index: u64,
        /// underlying I/O failure
        #[source]
        source: IoError,
    },

    /// The output could not be written.
    #[error("Failed to write {path}. {source}")]
    SinkWrite {
        /// output path
        path: PathBuf,
        /// underlying I/O failure
        #[source]
        source: IoError,
    },

    /// The video job was cancelled between frames.
    #[error("Cancelled")]
    Cancelled,

    /// A video job stopped early; frames written so far are kept.
    #[error("Video job aborted after {processed} frames, partial output kept at {output}. {source}")]
    Aborted {
        /// frames colorized and written before the failure
        processed: u64,
        /// path of the partial output
        output: PathBuf,
        /// what stopped the job
        #[source]
        source: Box<ColorizeError>,
    },

    /// A path has no file name to derive the output name from.
    #[error("Invalid path {0}")]
    InvalidPath(PathBuf),

    /// The configuration is invalid, with one message per problem.
    #[error("Invalid configuration: {}", .0.join("; "))]
    Config(Vec<String>),

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration. {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Directory traversal error.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
}

impl ColorizeError {
    /// Frames written before the job stopped, if the error stems from a video job.
    pub fn frames_processed(&self) -> Option<u64> {
        match self {
            ColorizeError::Aborted { processed, .. } => Some(*processed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_errors_are_classified() {
        let mismatch = ImageError::ChannelMismatch {
            expected: [2, 2].into(),
            actual: [1, 2].into(),
        };
        assert!(matches!(
            StageError::from(mismatch),
            StageError::ChannelMismatch(_)
        ));
        assert!(matches!(
            StageError::from(ImageError::NonFinitePixel(3)),
            StageError::InvalidImage(_)
        ));
    }

    #[test]
    fn aborted_reports_progress() {
        let err = ColorizeError::Aborted {
            processed: 7,
            output: PathBuf::from("out.mp4"),
            source: Box::new(ColorizeError::Cancelled),
        };
        assert_eq!(err.frames_processed(), Some(7));
        assert!(err.to_string().contains("after 7 frames"));
        assert_eq!(ColorizeError::Cancelled.frames_processed(), None);
    }
}
