#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chromia_colorize::{ColorizationSession, ColorizeConfig, ColorizeError, ModelPaths};
use chromia_dnn::{prior::NUM_CLUSTERS, Blob, ClusterPrior, DnnError, ModelBackend};
use chromia_image::{Image, ImageSize};
use chromia_io::{
    stream::{VideoSink, VideoSource},
    IoError,
};
use chromia_tensor::{Tensor2, Tensor4};

/// A network answering every forward pass with constant chrominance.
pub struct ConstantChroma {
    pub a: f32,
    pub b: f32,
    /// forward call index that fails, if any
    pub fail_at: Option<usize>,
    pub calls: usize,
    pub inputs: Vec<Tensor4<f32>>,
}

impl ConstantChroma {
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            a,
            b,
            fail_at: None,
            calls: 0,
            inputs: Vec::new(),
        }
    }

    pub fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }
}

impl ModelBackend for ConstantChroma {
    fn set_fixed_tensor(&mut self, _layer: &str, _blob: Blob) -> Result<(), DnnError> {
        Ok(())
    }

    fn forward(&mut self, input: &Tensor4<f32>) -> Result<Tensor4<f32>, DnnError> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_at == Some(call) {
            return Err(DnnError::Inference(format!("forced failure at call {call}")));
        }
        self.inputs.push(input.clone());

        let [_, _, h, w] = input.shape;
        let (a, b) = (self.a, self.b);
        Ok(Tensor4::from_shape_fn([1, 2, h, w], |[_, c, _, _]| {
            if c == 0 {
                a
            } else {
                b
            }
        }))
    }
}

pub fn prior() -> Result<ClusterPrior, DnnError> {
    let points = Tensor2::from_shape_vec([NUM_CLUSTERS, 2], vec![0.0; NUM_CLUSTERS * 2])?;
    ClusterPrior::from_points(points)
}

pub fn config(output_dir: impl Into<PathBuf>) -> ColorizeConfig {
    let mut config = ColorizeConfig::new(
        ModelPaths {
            topology: "colorization.prototxt".into(),
            weights: "colorization.onnx".into(),
            cluster_prior: "pts_in_hull.npy".into(),
        },
        output_dir,
    );
    config.input_size = [8, 8];
    config
}

pub fn session(
    model: ConstantChroma,
    output_dir: impl Into<PathBuf>,
) -> Result<ColorizationSession<ConstantChroma>, ColorizeError> {
    let prior = prior().map_err(ColorizeError::ModelConfiguration)?;
    ColorizationSession::from_model(model, &prior, config(output_dir))
}

pub fn gray(size: ImageSize, value: u8) -> Result<Image<u8, 3>, chromia_image::ImageError> {
    Image::from_size_val(size, value)
}

/// A horizontal luminance ramp from black to white.
pub fn gray_ramp(size: ImageSize) -> Result<Image<u8, 3>, chromia_image::ImageError> {
    let data = (0..size.height)
        .flat_map(|_| {
            (0..size.width).flat_map(move |x| {
                let v = (x * 255 / (size.width - 1)) as u8;
                [v, v, v]
            })
        })
        .collect();
    Image::new(size, data)
}

/// A source whose read number `fail_at` fails like a corrupt packet would.
pub struct FailingSource<S> {
    pub inner: S,
    pub fail_at: usize,
    pub reads: usize,
}

impl<S: VideoSource> FailingSource<S> {
    pub fn new(inner: S, fail_at: usize) -> Self {
        Self {
            inner,
            fail_at,
            reads: 0,
        }
    }
}

impl<S: VideoSource> VideoSource for FailingSource<S> {
    fn fps(&self) -> f64 {
        self.inner.fps()
    }

    fn size(&self) -> ImageSize {
        self.inner.size()
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.inner.frame_count_hint()
    }

    fn read(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        let read = self.reads;
        self.reads += 1;
        if read == self.fail_at {
            return Err(IoError::FileError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "corrupt packet",
            )));
        }
        self.inner.read()
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.inner.close()
    }
}

/// A sink that raises `cancel` once it has accepted `after` frames.
pub struct CancelAfter<K> {
    pub inner: K,
    pub cancel: Arc<AtomicBool>,
    pub after: usize,
    pub written: usize,
}

impl<K: VideoSink> CancelAfter<K> {
    pub fn new(inner: K, cancel: Arc<AtomicBool>, after: usize) -> Self {
        Self {
            inner,
            cancel,
            after,
            written: 0,
        }
    }
}

impl<K: VideoSink> VideoSink for CancelAfter<K> {
    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), IoError> {
        self.inner.write(frame)?;
        self.written += 1;
        if self.written == self.after {
            self.cancel.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.inner.close()
    }
}
