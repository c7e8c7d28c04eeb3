use std::collections::VecDeque;

use chromia_image::{Image, ImageSize};

use super::{VideoSink, VideoSource};
use crate::error::IoError;

/// A video source backed by frames held in memory.
///
/// Useful for image sequences and for driving pipelines in tests.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: VecDeque<Image<u8, 3>>,
    fps: f64,
    size: ImageSize,
    total: u64,
    closed: bool,
}

impl FrameSequence {
    /// Create a source from a list of frames sharing the same size.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FrameSizeMismatch`] if the frames disagree on size.
    pub fn new(frames: Vec<Image<u8, 3>>, fps: f64, size: ImageSize) -> Result<Self, IoError> {
        if let Some(frame) = frames.iter().find(|f| f.size() != size) {
            return Err(IoError::FrameSizeMismatch {
                expected: size,
                actual: frame.size(),
            });
        }

        Ok(Self {
            total: frames.len() as u64,
            frames: frames.into(),
            fps,
            size,
            closed: false,
        })
    }

    /// Whether [`VideoSource::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl VideoSource for FrameSequence {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn size(&self) -> ImageSize {
        self.size
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(self.total)
    }

    fn read(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        if self.closed {
            return Err(IoError::StreamClosed);
        }
        Ok(self.frames.pop_front())
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.closed = true;
        Ok(())
    }
}

/// A video sink that keeps every written frame in memory.
#[derive(Debug, Clone)]
pub struct FrameCollector {
    frames: Vec<Image<u8, 3>>,
    size: ImageSize,
    closed: bool,
}

impl FrameCollector {
    /// Create an empty sink accepting frames of the given size.
    pub fn new(size: ImageSize) -> Self {
        Self {
            frames: Vec::new(),
            size,
            closed: false,
        }
    }

    /// Frames written so far, in order.
    pub fn frames(&self) -> &[Image<u8, 3>] {
        &self.frames
    }

    /// Whether [`VideoSink::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Consume the sink and return its frames.
    pub fn into_frames(self) -> Vec<Image<u8, 3>> {
        self.frames
    }
}

impl VideoSink for FrameCollector {
    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::StreamClosed);
        }
        if frame.size() != self.size {
            return Err(IoError::FrameSizeMismatch {
                expected: self.size,
                actual: frame.size(),
            });
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_to_collector() -> Result<(), IoError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let frames = (0..5u8)
            .map(|i| Image::<u8, 3>::from_size_val(size, i))
            .collect::<Result<Vec<_>, _>>()?;

        let mut source = FrameSequence::new(frames.clone(), 25.0, size)?;
        let mut sink = FrameCollector::new(size);
        assert_eq!(source.frame_count_hint(), Some(5));

        while let Some(frame) = source.read()? {
            sink.write(&frame)?;
        }
        source.close()?;
        sink.close()?;

        assert!(source.is_closed() && sink.is_closed());
        assert_eq!(sink.frames(), frames.as_slice());
        assert!(matches!(source.read(), Err(IoError::StreamClosed)));
        Ok(())
    }

    #[test]
    fn size_mismatch_is_rejected() -> Result<(), IoError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let other = Image::<u8, 3>::from_size_val([2, 2].into(), 0)?;

        assert!(matches!(
            FrameSequence::new(vec![other.clone()], 30.0, size),
            Err(IoError::FrameSizeMismatch { .. })
        ));

        let mut sink = FrameCollector::new(size);
        assert!(sink.write(&other).is_err());
        Ok(())
    }
}
