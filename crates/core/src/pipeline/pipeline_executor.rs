use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::analysis::frame_analyzer::FrameAnalyzer;
use crate::analysis::summary::Summary;
use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::video::domain::frame_source::FrameSource;

/// Runtime knobs for a pipeline execution run.
///
/// `on_progress` receives `(frames_processed, total)` where total is 0
/// when unknown; returning `false` cancels the run, as does setting
/// `cancelled`.
pub struct PipelineConfig {
    pub detector_concurrency: usize,
    pub estimated_frames: usize,
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detector_concurrency: crate::shared::constants::DEFAULT_DETECTOR_CONCURRENCY,
            estimated_frames: 0,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Abstracts how the sample → detect → analyze pipeline is executed.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (e.g. threaded). Implementations must feed
/// the analyzer in strict ascending frame order regardless of detector
/// completion order.
pub trait PipelineExecutor: Send {
    fn execute(
        &self,
        source: Box<dyn FrameSource>,
        detector: Arc<dyn FaceDetector>,
        analyzer: FrameAnalyzer,
        config: PipelineConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Summary, Box<dyn std::error::Error>>;
}
