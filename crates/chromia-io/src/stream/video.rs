use std::path::{Path, PathBuf};

use gstreamer::prelude::*;

use chromia_image::{Image, ImageSize};

use super::stride::{pad_rows, rgb_row_stride, unpad_rows};
use super::{VideoSink, VideoSource};
use crate::error::IoError;

// denominator used to express fractional frame rates
const FPS_DENOMINATOR: i32 = 1000;

/// An error type for the GStreamer video backend.
#[derive(thiserror::Error, Debug)]
pub enum VideoError {
    /// An error occurred during GStreamer initialization or pipeline parsing.
    #[error(transparent)]
    GStreamerError(#[from] gstreamer::glib::Error),

    /// An error occurred during GStreamer downcast of pipeline element.
    #[error("Failed to downcast pipeline")]
    DowncastPipelineError(gstreamer::Element),

    /// An error occurred when looking up an element by name.
    #[error("Failed to get an element by name")]
    GetElementByNameError,

    /// An error occurred during GStreamer to get the bus.
    #[error("Failed to get the bus")]
    BusError,

    /// An error occurred during GStreamer to set the pipeline state.
    #[error(transparent)]
    SetPipelineStateError(#[from] gstreamer::StateChangeError),

    /// An error occurred when pushing data through the pipeline.
    #[error(transparent)]
    GstreamerFlowError(#[from] gstreamer::FlowError),

    /// An error occurred during GStreamer to get the caps from the sample.
    #[error("Failed caps: {0}")]
    GetCapsError(String),

    /// An error occurred during GStreamer to get the buffer from the sample.
    #[error("Failed to get the buffer from the sample")]
    GetBufferError,

    /// The video file does not exist.
    #[error("Video file not found: {0}")]
    FileNotFound(PathBuf),

    /// An error for an invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An element posted an error on the pipeline bus.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// The stream ended before delivering its first frame.
    #[error("Video stream has no frames: {0}")]
    EmptyStream(PathBuf),

    /// The decoded stream does not declare a usable frame rate.
    #[error("Video stream does not declare a frame rate: {0}")]
    MissingFrameRate(PathBuf),
}

fn init_gstreamer() -> Result<(), VideoError> {
    // make sure that we do not initialize gstreamer several times
    if !gstreamer::INITIALIZED.load(std::sync::atomic::Ordering::Relaxed) {
        gstreamer::init()?;
    }
    Ok(())
}

fn parse_pipeline(description: &str) -> Result<gstreamer::Pipeline, VideoError> {
    log::debug!("Pipeline: {}", description);
    gstreamer::parse::launch(description)?
        .dynamic_cast::<gstreamer::Pipeline>()
        .map_err(VideoError::DowncastPipelineError)
}

/// Drain the bus looking for an error posted by any element.
fn pending_bus_error(pipeline: &gstreamer::Pipeline) -> Option<VideoError> {
    let bus = pipeline.bus()?;
    while let Some(msg) = bus.pop_filtered(&[gstreamer::MessageType::Error]) {
        if let gstreamer::MessageView::Error(err) = msg.view() {
            log::error!(
                "Error from {:?}: {} ({:?})",
                msg.src().map(|s| s.path_string()),
                err.error(),
                err.debug()
            );
            return Some(VideoError::PipelineError(err.error().to_string()));
        }
    }
    None
}

/// Frames per second of a `numer/denom` caps fraction, if it describes a positive rate.
fn frame_rate(numer: i32, denom: i32) -> Option<f64> {
    (numer > 0 && denom > 0).then(|| numer as f64 / denom as f64)
}

fn location(path: &Path) -> String {
    if cfg!(windows) {
        path.to_string_lossy().replace('\\', "/")
    } else {
        path.to_string_lossy().into_owned()
    }
}

/// Writes RGB frames to an H.264 encoded MP4 file.
pub struct VideoWriter {
    pipeline: gstreamer::Pipeline,
    appsrc: gstreamer_app::AppSrc,
    size: ImageSize,
    fps_numerator: i32,
    counter: u64,
    closed: bool,
}

impl VideoWriter {
    /// Create a new VideoWriter and start its pipeline.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to save the video file.
    /// * `fps` - The frames per second of the video.
    /// * `size` - The size of the video frames.
    pub fn new(path: impl AsRef<Path>, fps: f64, size: ImageSize) -> Result<Self, VideoError> {
        init_gstreamer()?;

        let fps_numerator = (fps * FPS_DENOMINATOR as f64).round() as i32;
        if fps_numerator <= 0 {
            return Err(VideoError::InvalidConfig(format!("invalid frame rate {fps}")));
        }

        let pipeline = parse_pipeline(&format!(
            "appsrc name=src ! \
            videoconvert ! video/x-raw,format=I420 ! \
            x264enc ! \
            video/x-h264,profile=main ! \
            h264parse ! \
            mp4mux ! \
            filesink location=\"{}\"",
            location(path.as_ref())
        ))?;

        let appsrc = pipeline
            .by_name("src")
            .ok_or(VideoError::GetElementByNameError)?
            .dynamic_cast::<gstreamer_app::AppSrc>()
            .map_err(VideoError::DowncastPipelineError)?;

        appsrc.set_format(gstreamer::Format::Time);
        let caps = gstreamer::Caps::builder("video/x-raw")
            .field("format", "RGB")
            .field("width", size.width as i32)
            .field("height", size.height as i32)
            .field(
                "framerate",
                gstreamer::Fraction::new(fps_numerator, FPS_DENOMINATOR),
            )
            .build();
        appsrc.set_caps(Some(&caps));
        appsrc.set_is_live(false);
        // wait for the encoder instead of dropping frames
        appsrc.set_property("block", true);

        pipeline.set_state(gstreamer::State::Playing)?;

        Ok(Self {
            pipeline,
            appsrc,
            size,
            fps_numerator,
            counter: 0,
            closed: false,
        })
    }

    /// Write an image to the video file.
    pub fn write(&mut self, img: &Image<u8, 3>) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::StreamClosed);
        }
        if img.size() != self.size {
            return Err(IoError::FrameSizeMismatch {
                expected: self.size,
                actual: img.size(),
            });
        }
        if let Some(err) = pending_bus_error(&self.pipeline) {
            return Err(err.into());
        }

        let frame_ns = |n: u64| -> u64 {
            (n as u128 * 1_000_000_000 * FPS_DENOMINATOR as u128 / self.fps_numerator as u128)
                as u64
        };
        let pts = gstreamer::ClockTime::from_nseconds(frame_ns(self.counter));
        let duration = gstreamer::ClockTime::from_nseconds(
            frame_ns(self.counter + 1) - frame_ns(self.counter),
        );

        let row_bytes = self.size.width * 3;
        let data = pad_rows(img.as_slice(), row_bytes, rgb_row_stride(self.size.width));
        let mut buffer = gstreamer::Buffer::from_mut_slice(data);
        let buffer_ref = buffer.get_mut().ok_or_else(|| {
            VideoError::InvalidConfig("Failed to get mutable buffer reference".to_string())
        })?;
        buffer_ref.set_pts(pts);
        buffer_ref.set_duration(duration);

        self.appsrc
            .push_buffer(buffer)
            .map_err(VideoError::GstreamerFlowError)?;
        self.counter += 1;

        Ok(())
    }

    /// Send end of stream, wait for the muxer to finalize the file and stop the pipeline.
    pub fn close(&mut self) -> Result<(), IoError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.appsrc.end_of_stream() {
            Ok(_) => log::debug!("EOS signal sent successfully."),
            Err(gstreamer::FlowError::NotLinked) => {
                log::warn!("Appsrc already EOS or not linked when sending EOS.")
            }
            Err(err) => return Err(VideoError::GstreamerFlowError(err).into()),
        }

        let bus = self.pipeline.bus().ok_or(VideoError::BusError)?;
        let result = match bus.timed_pop_filtered(
            gstreamer::ClockTime::NONE,
            &[gstreamer::MessageType::Eos, gstreamer::MessageType::Error],
        ) {
            Some(msg) => match msg.view() {
                gstreamer::MessageView::Error(err) => {
                    Err(VideoError::PipelineError(err.error().to_string()))
                }
                _ => Ok(()),
            },
            None => Ok(()),
        };

        self.pipeline.set_state(gstreamer::State::Null).map_err(VideoError::from)?;
        log::debug!("VideoWriter closed after {} frames", self.counter);

        Ok(result?)
    }
}

impl VideoSink for VideoWriter {
    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), IoError> {
        VideoWriter::write(self, frame)
    }

    fn close(&mut self) -> Result<(), IoError> {
        VideoWriter::close(self)
    }
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        if !self.closed {
            log::debug!("Closing VideoWriter in Drop.");
            if let Err(e) = self.close() {
                log::error!("Error closing video writer in drop: {}", e);
            }
        }
    }
}

/// Reads the frames of a video file as 8-bit RGB images.
pub struct VideoReader {
    pipeline: gstreamer::Pipeline,
    appsink: gstreamer_app::AppSink,
    fps: f64,
    size: ImageSize,
    frame_count_hint: Option<u64>,
    closed: bool,
}

impl VideoReader {
    /// Open a video file and wait until the stream properties are known.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        init_gstreamer()?;

        let path = path.as_ref();
        if !path.exists() {
            return Err(VideoError::FileNotFound(path.to_path_buf()));
        }

        let pipeline = parse_pipeline(&format!(
            "filesrc location=\"{}\" ! \
            decodebin ! \
            videoconvert ! \
            video/x-raw,format=RGB ! \
            appsink name=sink sync=false max-buffers=4 drop=false",
            location(path)
        ))?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or(VideoError::GetElementByNameError)?
            .dynamic_cast::<gstreamer_app::AppSink>()
            .map_err(VideoError::DowncastPipelineError)?;

        pipeline.set_state(gstreamer::State::Playing)?;

        // blocks until the first frame is decoded or the pipeline gives up
        let (state_change, _, _) = pipeline.state(gstreamer::ClockTime::NONE);
        let preroll = match state_change {
            Ok(_) => appsink.pull_preroll().map_err(|_| {
                pending_bus_error(&pipeline)
                    .unwrap_or_else(|| VideoError::EmptyStream(path.to_path_buf()))
            }),
            Err(err) => Err(pending_bus_error(&pipeline).unwrap_or(err.into())),
        };
        let preroll = match preroll {
            Ok(preroll) => preroll,
            Err(err) => {
                pipeline.set_state(gstreamer::State::Null)?;
                return Err(err);
            }
        };

        let structure = preroll
            .caps()
            .and_then(|caps| caps.structure(0))
            .ok_or_else(|| VideoError::GetCapsError("missing caps".to_string()))?;

        let width = structure
            .get::<i32>("width")
            .map_err(|e| VideoError::GetCapsError(e.to_string()))?;
        let height = structure
            .get::<i32>("height")
            .map_err(|e| VideoError::GetCapsError(e.to_string()))?;
        let size = ImageSize {
            width: width as usize,
            height: height as usize,
        };

        let fps = structure
            .get::<gstreamer::Fraction>("framerate")
            .ok()
            .and_then(|f| frame_rate(f.numer(), f.denom()));
        let Some(fps) = fps else {
            pipeline.set_state(gstreamer::State::Null)?;
            return Err(VideoError::MissingFrameRate(path.to_path_buf()));
        };

        let frame_count_hint = pipeline
            .query_duration::<gstreamer::ClockTime>()
            .map(|d| (d.seconds_f64() * fps).round() as u64)
            .filter(|n| *n > 0);

        log::info!(
            "VideoReader opened {}: size={}, fps={:.2}, frames~{:?}",
            path.display(),
            size,
            fps,
            frame_count_hint
        );

        Ok(Self {
            pipeline,
            appsink,
            fps,
            size,
            frame_count_hint,
            closed: false,
        })
    }

    /// Read the next frame, or `None` at the end of the stream.
    pub fn read(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        if self.closed {
            return Err(IoError::StreamClosed);
        }

        let sample = match self.appsink.pull_sample() {
            Ok(sample) => sample,
            Err(_) if self.appsink.is_eos() => return Ok(None),
            Err(err) => {
                let err = pending_bus_error(&self.pipeline)
                    .unwrap_or_else(|| VideoError::PipelineError(err.to_string()));
                return Err(err.into());
            }
        };

        let buffer = sample.buffer().ok_or(VideoError::GetBufferError)?;
        let map = buffer
            .map_readable()
            .map_err(|_| VideoError::GetBufferError)?;
        let data = map.as_slice();

        let row_bytes = self.size.width * 3;
        let stride = data.len() / self.size.height.max(1);
        let pixels = unpad_rows(data, row_bytes, stride, self.size.height)?;

        Ok(Some(Image::new(self.size, pixels)?))
    }

    /// Stop the pipeline.
    pub fn close(&mut self) -> Result<(), IoError> {
        if !self.closed {
            self.closed = true;
            self.pipeline
                .set_state(gstreamer::State::Null)
                .map_err(VideoError::from)?;
        }
        Ok(())
    }
}

impl VideoSource for VideoReader {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn size(&self) -> ImageSize {
        self.size
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.frame_count_hint
    }

    fn read(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        VideoReader::read(self)
    }

    fn close(&mut self) -> Result<(), IoError> {
        VideoReader::close(self)
    }
}

impl Drop for VideoReader {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("Error closing video reader in drop: {}", e);
        }
    }
}
