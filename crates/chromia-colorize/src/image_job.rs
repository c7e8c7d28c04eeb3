use std::path::{Path, PathBuf};

use chromia_dnn::ModelBackend;
use chromia_image::{Image, ImageSize};
use chromia_io::functional::{is_supported_image, read_image_rgb8, write_image_rgb8};
use chromia_io::IoError;
use walkdir::WalkDir;

use crate::compare::comparison_image;
use crate::error::{ColorizeError, FrameColorizationError};
use crate::session::ColorizationSession;

/// Bounds of the side by side comparison image.
pub const COMPARISON_MAX_SIZE: ImageSize = ImageSize {
    width: 1920,
    height: 1080,
};

/// Result of a completed still image job.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageJobReport {
    /// the source image
    pub input_path: PathBuf,
    /// where the result was written
    pub output_path: PathBuf,
    /// the dimensions shared by input and output
    pub size: ImageSize,
    /// where the comparison image was written, if requested
    pub comparison_path: Option<PathBuf>,
}

/// Derive the output path `<output_dir>/<stem><suffix>.<ext>` of an image.
///
/// # Errors
///
/// Returns [`ColorizeError::InvalidPath`] if the input has no file stem.
pub fn output_image_path(
    input_path: &Path,
    output_dir: &Path,
    suffix: &str,
) -> Result<PathBuf, ColorizeError> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ColorizeError::InvalidPath(input_path.to_path_buf()))?;

    let file_name = match input_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}{suffix}.{ext}"),
        None => format!("{stem}{suffix}"),
    };

    Ok(output_dir.join(file_name))
}

/// Hidden sibling of `target` that an output is encoded to before being moved in place.
///
/// The extension is kept last so the encoder can still be picked from it.
fn staging_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let name = match target.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!(".{stem}.partial.{ext}"),
        None => format!(".{stem}.partial"),
    };
    target.with_file_name(name)
}

fn discard<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for path in paths {
        if path.is_file() {
            if let Err(err) = std::fs::remove_file(path) {
                log::warn!("failed to remove {}: {}", path.display(), err);
            }
        }
    }
}

/// Write every output or none of them.
///
/// All images are encoded to staging files first and only then renamed to
/// their targets. On failure the staging files and the targets renamed so far
/// are removed.
fn write_outputs(outputs: &[(&PathBuf, &Image<u8, 3>)]) -> Result<(), ColorizeError> {
    let mut staged: Vec<(PathBuf, &PathBuf)> = Vec::with_capacity(outputs.len());
    for &(target, image) in outputs {
        let staging = staging_path(target);
        if let Err(source) = write_image_rgb8(&staging, image) {
            discard(staged.iter().map(|(s, _)| s).chain([&staging]));
            return Err(ColorizeError::SinkWrite {
                path: target.clone(),
                source,
            });
        }
        staged.push((staging, target));
    }

    for (i, (staging, target)) in staged.iter().enumerate() {
        if let Err(err) = std::fs::rename(staging, target) {
            discard(
                staged[..i]
                    .iter()
                    .map(|(_, t)| *t)
                    .chain(staged[i..].iter().map(|(s, _)| s)),
            );
            return Err(ColorizeError::SinkWrite {
                path: (*target).clone(),
                source: IoError::FileError(err),
            });
        }
    }
    Ok(())
}

/// Colorize a single image file into `output_dir`.
///
/// Nothing is left in `output_dir` unless every stage succeeds, including the
/// comparison image when one is requested.
///
/// # Errors
///
/// - [`ColorizeError::SourceUnavailable`] if the input cannot be read or decoded.
/// - [`ColorizeError::Frame`] if the colorization fails.
/// - [`ColorizeError::SinkWrite`] if the result cannot be encoded or written.
pub fn colorize_image<M: ModelBackend>(
    session: &mut ColorizationSession<M>,
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
) -> Result<ImageJobReport, ColorizeError> {
    let input_path = input_path.as_ref();
    let output_dir = output_dir.as_ref();

    let output_path = output_image_path(input_path, output_dir, &session.config().output_suffix)?;

    let image = read_image_rgb8(input_path).map_err(|source| ColorizeError::SourceUnavailable {
        path: input_path.to_path_buf(),
        source,
    })?;
    log::info!("colorizing {} ({})", input_path.display(), image.size());

    let colorized = session
        .colorize_frame(&image)
        .map_err(|source| FrameColorizationError { index: 0, source })?;

    let comparison = if session.config().save_comparison {
        let path = output_image_path(input_path, output_dir, "_comparison")?;
        let pair = comparison_image(&image, &colorized, COMPARISON_MAX_SIZE)
            .map_err(|err| FrameColorizationError {
                index: 0,
                source: err.into(),
            })?;
        Some((path, pair))
    } else {
        None
    };

    let mut outputs = vec![(&output_path, &colorized)];
    if let Some((path, pair)) = &comparison {
        outputs.push((path, pair));
    }
    write_outputs(&outputs)?;
    let comparison_path = comparison.map(|(path, _)| path);

    log::info!("wrote {}", output_path.display());

    Ok(ImageJobReport {
        input_path: input_path.to_path_buf(),
        output_path,
        size: image.size(),
        comparison_path,
    })
}

/// Colorize every supported image found under `input_dir`, in path order.
///
/// Subdirectories of `input_dir` are mirrored under `output_dir`, so images
/// sharing a file name in different folders do not overwrite each other.
/// Stops at the first failing image; images processed before it keep their output.
pub fn colorize_directory<M: ModelBackend>(
    session: &mut ColorizationSession<M>,
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
) -> Result<Vec<ImageJobReport>, ColorizeError> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    if !input_dir.is_dir() {
        return Err(ColorizeError::InvalidPath(input_dir.to_path_buf()));
    }

    let mut image_paths = Vec::new();
    for entry in WalkDir::new(input_dir) {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported_image(entry.path()) {
            image_paths.push(entry.into_path());
        }
    }
    image_paths.sort();

    log::info!(
        "found {} images under {}",
        image_paths.len(),
        input_dir.display()
    );

    let mut reports = Vec::with_capacity(image_paths.len());
    for path in &image_paths {
        let target_dir = match path.parent().and_then(|p| p.strip_prefix(input_dir).ok()) {
            Some(relative) => output_dir.join(relative),
            None => output_dir.to_path_buf(),
        };
        std::fs::create_dir_all(&target_dir).map_err(|err| ColorizeError::SinkWrite {
            path: target_dir.clone(),
            source: IoError::FileError(err),
        })?;
        reports.push(colorize_image(session, path, &target_dir)?);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_keep_the_extension() -> Result<(), ColorizeError> {
        let path = output_image_path(Path::new("in/photo.JPG"), Path::new("out"), "_colorized")?;
        assert_eq!(path, Path::new("out/photo_colorized.JPG"));

        let path = output_image_path(Path::new("a.b.png"), Path::new("out"), "_x")?;
        assert_eq!(path, Path::new("out/a.b_x.png"));
        Ok(())
    }

    #[test]
    fn staging_files_are_hidden_siblings() {
        assert_eq!(
            staging_path(Path::new("out/photo_colorized.jpg")),
            Path::new("out/.photo_colorized.partial.jpg")
        );
        assert_eq!(
            staging_path(Path::new("out/raw")),
            Path::new("out/.raw.partial")
        );
    }

    #[test]
    fn output_names_need_a_stem() {
        assert!(matches!(
            output_image_path(Path::new("/"), Path::new("out"), "_colorized"),
            Err(ColorizeError::InvalidPath(_))
        ));
    }
}
