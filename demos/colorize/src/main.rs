use std::path::PathBuf;

use argh::FromArgs;

use chromia::colorize::{colorize_directory, colorize_image, ColorizationSession, ColorizeConfig};
use chromia::dnn::ort::OrtBackend;

#[derive(FromArgs)]
/// Colorize grayscale images and videos with a pretrained LAB network
struct Args {
    /// path to the JSON configuration
    #[argh(option, short = 'c')]
    config: PathBuf,

    /// write results here instead of the configured output directory
    #[argh(option, short = 'o')]
    output_dir: Option<PathBuf>,

    /// path to the ORT dylib
    #[argh(option)]
    ort_dylib_path: Option<PathBuf>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Image(ImageArgs),
    Dir(DirArgs),
    Video(VideoArgs),
}

#[derive(FromArgs)]
/// Colorize a single image
#[argh(subcommand, name = "image")]
struct ImageArgs {
    /// path to an input image
    #[argh(positional)]
    input: PathBuf,

    /// also write a side by side comparison
    #[argh(switch)]
    compare: bool,
}

#[derive(FromArgs)]
/// Colorize every image of a directory
#[argh(subcommand, name = "dir")]
struct DirArgs {
    /// path to the input directory
    #[argh(positional)]
    input: PathBuf,
}

#[derive(FromArgs)]
/// Colorize a video into an mp4 file
#[argh(subcommand, name = "video")]
struct VideoArgs {
    /// path to an input video
    #[argh(positional)]
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    // set the ort dylib path
    if let Some(ort_dylib_path) = &args.ort_dylib_path {
        std::env::set_var("ORT_DYLIB_PATH", ort_dylib_path);
    }

    let mut config = ColorizeConfig::from_json_file(&args.config)?;
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Command::Image(ImageArgs { compare: true, .. }) = &args.command {
        config.save_comparison = true;
    }
    std::fs::create_dir_all(&config.output_dir)?;

    let output_dir = config.output_dir.clone();
    let mut session = ColorizationSession::<OrtBackend>::open(config)?;

    match args.command {
        Command::Image(image_args) => {
            let report = colorize_image(&mut session, &image_args.input, &output_dir)?;
            println!("🎨 Colorized image saved to {}", report.output_path.display());
            if let Some(comparison_path) = report.comparison_path {
                println!("🖼️ Comparison saved to {}", comparison_path.display());
            }
        }
        Command::Dir(dir_args) => {
            let reports = colorize_directory(&mut session, &dir_args.input, &output_dir)?;
            println!(
                "🎨 Colorized {} images into {}",
                reports.len(),
                output_dir.display()
            );
        }
        Command::Video(video_args) => run_video(&mut session, &video_args.input, &output_dir)?,
    }

    Ok(())
}

#[cfg(feature = "gstreamer")]
fn run_video(
    session: &mut ColorizationSession<OrtBackend>,
    input: &std::path::Path,
    output_dir: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use indicatif::{ProgressBar, ProgressStyle};

    // create a cancel token to stop between frames
    let cancel_token = Arc::new(AtomicBool::new(false));

    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            println!("Received Ctrl-C signal. Sending cancel signal !!");
            cancel_token.store(true, Ordering::SeqCst);
        }
    })?;

    // the length is set from the source once it is open
    let pb = ProgressBar::new(0);
    pb.set_style(ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} ({eta}) {msg} {per_sec}",
    )?.progress_chars("##>-"));

    match chromia::colorize::colorize_video(session, input, output_dir, cancel_token, pb) {
        Ok(report) => {
            println!(
                "🎬 Colorized {} frames into {}",
                report.frames_processed,
                report.output_path.display()
            );
            Ok(())
        }
        Err(err) => {
            if let Some(processed) = err.frames_processed() {
                log::error!("partial output holds {processed} frames");
            }
            Err(err.into())
        }
    }
}

#[cfg(not(feature = "gstreamer"))]
fn run_video(
    _session: &mut ColorizationSession<OrtBackend>,
    _input: &std::path::Path,
    _output_dir: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    Err("video support requires the `gstreamer` feature".into())
}
