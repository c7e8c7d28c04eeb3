use chromia_image::{Image, ImageSize};

use crate::error::IoError;

/// In-memory frame sources and sinks.
pub mod memory;

/// Row layout of raw RGB video buffers.
pub mod stride;

/// GStreamer video file reader and writer.
#[cfg(feature = "gstreamer")]
pub mod video;

pub use memory::{FrameCollector, FrameSequence};

#[cfg(feature = "gstreamer")]
pub use video::{VideoError, VideoReader, VideoWriter};

/// A frame-sequential video source.
///
/// Yields decoded 8-bit RGB frames in presentation order together with the
/// stream properties declared when it was opened.
pub trait VideoSource {
    /// Frames per second declared by the stream.
    fn fps(&self) -> f64;

    /// Dimensions shared by every frame of the stream.
    fn size(&self) -> ImageSize;

    /// Estimated total number of frames, if the container reports it.
    fn frame_count_hint(&self) -> Option<u64>;

    /// Pull the next frame, or `None` once the end of the stream is reached.
    fn read(&mut self) -> Result<Option<Image<u8, 3>>, IoError>;

    /// Release the underlying resources.
    fn close(&mut self) -> Result<(), IoError>;
}

/// A frame-sequential video sink accepting frames at a fixed rate and size.
pub trait VideoSink {
    /// Append one frame to the stream.
    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), IoError>;

    /// Flush pending frames and finalize the container.
    fn close(&mut self) -> Result<(), IoError>;
}

impl<S: VideoSource + ?Sized> VideoSource for &mut S {
    fn fps(&self) -> f64 {
        (**self).fps()
    }

    fn size(&self) -> ImageSize {
        (**self).size()
    }

    fn frame_count_hint(&self) -> Option<u64> {
        (**self).frame_count_hint()
    }

    fn read(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        (**self).read()
    }

    fn close(&mut self) -> Result<(), IoError> {
        (**self).close()
    }
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn fps(&self) -> f64 {
        (**self).fps()
    }

    fn size(&self) -> ImageSize {
        (**self).size()
    }

    fn frame_count_hint(&self) -> Option<u64> {
        (**self).frame_count_hint()
    }

    fn read(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        (**self).read()
    }

    fn close(&mut self) -> Result<(), IoError> {
        (**self).close()
    }
}

impl<S: VideoSink + ?Sized> VideoSink for &mut S {
    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), IoError> {
        (**self).write(frame)
    }

    fn close(&mut self) -> Result<(), IoError> {
        (**self).close()
    }
}

impl<S: VideoSink + ?Sized> VideoSink for Box<S> {
    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), IoError> {
        (**self).write(frame)
    }

    fn close(&mut self) -> Result<(), IoError> {
        (**self).close()
    }
}
