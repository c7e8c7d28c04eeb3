use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chromia_dnn::ModelBackend;
use chromia_image::ImageSize;
use chromia_io::{
    stream::{VideoSink, VideoSource},
    IoError,
};
use indicatif::ProgressBar;

use crate::error::{ColorizeError, FrameColorizationError};
use crate::session::ColorizationSession;

/// Lifecycle of a video job.
///
/// `Opening -> Streaming -> Draining -> Closed`, with `Aborted` reachable
/// from every state but `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoJobState {
    /// opening the source and the sink
    Opening,
    /// pulling, colorizing and writing frames one at a time
    Streaming,
    /// flushing the sink and releasing the source
    Draining,
    /// the job completed
    Closed,
    /// the job stopped on an error, partial output is kept
    Aborted,
}

/// Result of a completed video job.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoJobReport {
    /// where the colorized stream was written
    pub output_path: PathBuf,
    /// number of frames colorized and written
    pub frames_processed: u64,
    /// final state, always [`VideoJobState::Closed`] for a returned report
    pub state: VideoJobState,
    /// frame rate of the source, reused for the sink
    pub fps: f64,
    /// frame dimensions shared by source and sink
    pub size: ImageSize,
}

/// Derive the output path `<output_dir>/<stem><suffix>.mp4` of a video.
///
/// # Errors
///
/// Returns [`ColorizeError::InvalidPath`] if the input has no file stem.
pub fn output_video_path(
    input_path: &Path,
    output_dir: &Path,
    suffix: &str,
) -> Result<PathBuf, ColorizeError> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ColorizeError::InvalidPath(input_path.to_path_buf()))?;
    Ok(output_dir.join(format!("{stem}{suffix}.mp4")))
}

/// Colorizes a frame-sequential source into a frame-sequential sink.
///
/// Frames are processed strictly in order, one in and one out. The first
/// failing frame aborts the job; frames written before it stay in the sink,
/// which is still closed so the partial output remains readable.
pub struct VideoColorizer<'a, M> {
    session: &'a mut ColorizationSession<M>,
    cancel: Arc<AtomicBool>,
    progress: ProgressBar,
    state: VideoJobState,
}

impl<'a, M: ModelBackend> VideoColorizer<'a, M> {
    /// Create a job without cancellation or visible progress.
    pub fn new(session: &'a mut ColorizationSession<M>) -> Self {
        Self {
            session,
            cancel: Arc::new(AtomicBool::new(false)),
            progress: ProgressBar::hidden(),
            state: VideoJobState::Opening,
        }
    }

    /// Stop the job before the next frame once `cancel` is set.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Advance `progress` by one per written frame.
    ///
    /// The length is set from the source frame count hint when it is known.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// The current state of the job.
    pub fn state(&self) -> VideoJobState {
        self.state
    }

    /// Run the job.
    ///
    /// `open_source` is called first; `open_sink` then receives the frame rate
    /// and size declared by the source.
    ///
    /// # Errors
    ///
    /// - [`ColorizeError::SourceUnavailable`] if the source cannot be opened.
    /// - [`ColorizeError::SinkWrite`] if the sink cannot be opened.
    ///
    /// In both cases nothing is written. Any failure once frames flow, and a
    /// cancellation, is reported as [`ColorizeError::Aborted`] with the number
    /// of frames written.
    pub fn run<S, K, FS, FK>(
        &mut self,
        input_path: &Path,
        output_path: &Path,
        open_source: FS,
        open_sink: FK,
    ) -> Result<VideoJobReport, ColorizeError>
    where
        S: VideoSource,
        K: VideoSink,
        FS: FnOnce() -> Result<S, IoError>,
        FK: FnOnce(f64, ImageSize) -> Result<K, IoError>,
    {
        self.state = VideoJobState::Opening;

        let mut source = match open_source() {
            Ok(source) => source,
            Err(source) => {
                self.state = VideoJobState::Aborted;
                return Err(ColorizeError::SourceUnavailable {
                    path: input_path.to_path_buf(),
                    source,
                });
            }
        };

        let (fps, size) = (source.fps(), source.size());

        let mut sink = match open_sink(fps, size) {
            Ok(sink) => sink,
            Err(err) => {
                if let Err(close_err) = source.close() {
                    log::warn!("failed to close {}: {close_err}", input_path.display());
                }
                self.state = VideoJobState::Aborted;
                return Err(ColorizeError::SinkWrite {
                    path: output_path.to_path_buf(),
                    source: err,
                });
            }
        };

        log::info!(
            "colorizing {} -> {} ({size}, {fps:.2} fps)",
            input_path.display(),
            output_path.display()
        );
        if let Some(frame_count) = source.frame_count_hint() {
            self.progress.set_length(frame_count);
        }

        self.state = VideoJobState::Streaming;
        let mut processed = 0u64;
        let streamed = self.stream(&mut source, &mut sink, output_path, &mut processed);

        self.state = VideoJobState::Draining;
        let drained = sink.close().map_err(|err| ColorizeError::SinkWrite {
            path: output_path.to_path_buf(),
            source: err,
        });
        if let Err(err) = source.close() {
            log::warn!("failed to close {}: {err}", input_path.display());
        }

        let failure = match (streamed, drained) {
            (Ok(()), Ok(())) => None,
            (Ok(()), Err(err)) => Some(err),
            (Err(err), drained) => {
                if let Err(close_err) = drained {
                    log::warn!("{close_err}");
                }
                Some(err)
            }
        };

        if let Some(err) = failure {
            self.state = VideoJobState::Aborted;
            self.progress.abandon();
            log::error!("video job aborted after {processed} frames: {err}");
            return Err(ColorizeError::Aborted {
                processed,
                output: output_path.to_path_buf(),
                source: Box::new(err),
            });
        }

        self.state = VideoJobState::Closed;
        self.progress.finish();
        log::info!("wrote {processed} frames to {}", output_path.display());

        Ok(VideoJobReport {
            output_path: output_path.to_path_buf(),
            frames_processed: processed,
            state: self.state,
            fps,
            size,
        })
    }

    fn stream<S: VideoSource, K: VideoSink>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        output_path: &Path,
        processed: &mut u64,
    ) -> Result<(), ColorizeError> {
        loop {
            if self.cancel.load(Ordering::SeqCst) {
                return Err(ColorizeError::Cancelled);
            }

            let index = *processed;
            let frame = match source.read() {
                Ok(Some(frame)) => frame,
                Ok(None) => return Ok(()),
                Err(err) => return Err(ColorizeError::FrameRead { index, source: err }),
            };

            let colorized = self
                .session
                .colorize_frame(&frame)
                .map_err(|source| FrameColorizationError { index, source })?;

            sink.write(&colorized)
                .map_err(|err| ColorizeError::SinkWrite {
                    path: output_path.to_path_buf(),
                    source: err,
                })?;

            *processed += 1;
            self.progress.inc(1);
        }
    }
}

/// Colorize a video file into `<output_dir>/<stem><suffix>.mp4`.
///
/// The source is decoded and the result encoded through GStreamer.
#[cfg(feature = "gstreamer")]
pub fn colorize_video<M: ModelBackend>(
    session: &mut ColorizationSession<M>,
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    cancel: Arc<AtomicBool>,
    progress: ProgressBar,
) -> Result<VideoJobReport, ColorizeError> {
    use chromia_io::stream::{VideoReader, VideoWriter};

    let input_path = input_path.as_ref();
    let output_path = output_video_path(
        input_path,
        output_dir.as_ref(),
        &session.config().output_suffix,
    )?;

    VideoColorizer::new(session)
        .with_cancel_flag(cancel)
        .with_progress(progress)
        .run(
            input_path,
            &output_path,
            || VideoReader::new(input_path).map_err(IoError::from),
            |fps, size| VideoWriter::new(&output_path, fps, size).map_err(IoError::from),
        )
}
