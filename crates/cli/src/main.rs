mod output;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use lectern_core::detection::infrastructure::http_face_detector::HttpFaceDetector;
use lectern_core::pipeline::analyze_video_use_case::AnalyzeVideoUseCase;
use lectern_core::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
use lectern_core::pipeline::pipeline_logger::{
    NullPipelineLogger, PipelineLogger, StdoutPipelineLogger,
};
use lectern_core::shared::config::AnalysisConfig;
use lectern_core::video::infrastructure::ffmpeg_frame_source::FfmpegFrameSource;

/// Speaker/audience engagement analysis for recorded talks.
#[derive(Parser)]
#[command(name = "lectern")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Directory the result artifacts are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Face detection service endpoint.
    #[arg(long)]
    detector_url: String,

    /// Frames sampled per second of video.
    #[arg(long, default_value = "1.0")]
    fps: f64,

    /// Width frames are scaled to before detection.
    #[arg(long, default_value = "640")]
    scale_width: u32,

    /// Max detector calls in flight at once.
    #[arg(long, default_value = "6")]
    concurrency: usize,

    /// Identity-match centroid distance threshold (normalized units).
    #[arg(long, default_value = "0.15")]
    distance_threshold: f64,

    /// Frames an identity stays matchable after its last sighting.
    #[arg(long, default_value = "300")]
    staleness_frames: usize,

    /// Head yaw (degrees) beyond which a face counts as turned away.
    #[arg(long, default_value = "25.0")]
    yaw_threshold: f64,

    /// Suppress progress output.
    #[arg(long)]
    quiet: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = AnalysisConfig {
        sample_fps: cli.fps,
        output_width: cli.scale_width,
        detector_concurrency: cli.concurrency,
        center_distance_threshold: cli.distance_threshold,
        staleness_window_frames: cli.staleness_frames,
        turn_yaw_threshold: cli.yaw_threshold,
        ..AnalysisConfig::default()
    };

    let detector = Arc::new(HttpFaceDetector::new(cli.detector_url)?);
    let mut use_case = AnalyzeVideoUseCase::new(
        Box::new(FfmpegFrameSource::new()),
        detector,
        Box::new(ThreadedPipelineExecutor::new()),
        config,
        None,
        None,
    );

    let mut logger: Box<dyn PipelineLogger> = if cli.quiet {
        Box::new(NullPipelineLogger)
    } else {
        Box::new(StdoutPipelineLogger::default())
    };

    let summary = use_case.execute(&cli.input, logger.as_mut())?;

    if !summary.errors.is_empty() {
        log::warn!(
            "{} frame(s) failed detection and contributed no faces",
            summary.errors.len()
        );
        for error in &summary.errors {
            log::warn!("  frame {}: {}", error.frame_index, error.message);
        }
    }

    output::write_artifacts(&summary, &cli.out_dir)?;
    log::info!(
        "wrote artifacts for {} observation(s) across {} person(s) to {}",
        summary.observations.len(),
        summary.emotion_counts.len(),
        cli.out_dir.display()
    );

    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("input file not found: {}", cli.input.display()).into());
    }
    if cli.fps <= 0.0 {
        return Err("--fps must be positive".into());
    }
    if cli.scale_width == 0 {
        return Err("--scale-width must be positive".into());
    }
    if cli.concurrency == 0 {
        return Err("--concurrency must be at least 1".into());
    }
    Ok(())
}
