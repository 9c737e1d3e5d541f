use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::analysis::frame_analyzer::FrameAnalyzer;
use crate::analysis::summary::Summary;
use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::pipeline_executor::{PipelineConfig, PipelineExecutor};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::config::AnalysisConfig;
use crate::video::domain::frame_source::FrameSource;

/// Orchestrates one end-to-end video analysis run.
///
/// Wires the frame source, detector, and analyzer together and delegates
/// execution to a `PipelineExecutor`. This is a single-use struct:
/// `execute` consumes the owned components, so calling it twice will
/// fail. All tracking state lives in the run's `FrameAnalyzer`, so
/// independent analyses never share identities.
pub struct AnalyzeVideoUseCase {
    source: Option<Box<dyn FrameSource>>,
    detector: Option<Arc<dyn FaceDetector>>,
    executor: Box<dyn PipelineExecutor>,
    config: AnalysisConfig,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl AnalyzeVideoUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Arc<dyn FaceDetector>,
        executor: Box<dyn PipelineExecutor>,
        config: AnalysisConfig,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source: Some(source),
            detector: Some(detector),
            executor,
            config,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        input: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Summary, Box<dyn std::error::Error>> {
        let mut source = self.source.take().ok_or("Pipeline already executed")?;
        let detector = self.detector.take().ok_or("Pipeline already executed")?;

        // Decoder failure is fatal for the whole run.
        let metadata = source.open(input, self.config.sample_fps, self.config.output_width)?;
        let estimated = metadata
            .estimated_samples(self.config.sample_fps)
            .unwrap_or(0);

        logger.info(&format!(
            "analyzing {} ({}x{} sampled at {} fps, ~{} frames)",
            input.display(),
            metadata.width,
            metadata.height,
            self.config.sample_fps,
            if estimated > 0 {
                estimated.to_string()
            } else {
                "?".to_string()
            },
        ));

        let analyzer = FrameAnalyzer::new(&self.config);
        let pipeline_config = PipelineConfig {
            detector_concurrency: self.config.detector_concurrency,
            estimated_frames: estimated,
            on_progress: self.on_progress.take(),
            cancelled: self.cancelled.clone(),
        };

        self.executor
            .execute(source, detector, analyzer, pipeline_config, logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::raw_face::RawFace;
    use crate::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::frame::Frame;
    use crate::shared::video_metadata::VideoMetadata;

    struct StubSource {
        frames: Vec<Frame>,
        fail_open: bool,
    }

    impl FrameSource for StubSource {
        fn open(
            &mut self,
            _path: &Path,
            _sample_fps: f64,
            _output_width: u32,
        ) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            if self.fail_open {
                return Err("unsupported codec".into());
            }
            Ok(VideoMetadata {
                width: 640,
                height: 360,
                fps: 30.0,
                total_frames: self.frames.len() * 30,
                codec: "h264".to_string(),
                source_path: None,
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new(self.frames.drain(..).map(Ok))
        }

        fn close(&mut self) {}
    }

    struct OneFaceDetector;

    impl FaceDetector for OneFaceDetector {
        fn detect(
            &self,
            _frame: &Frame,
        ) -> Result<Vec<RawFace>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(vec![RawFace {
                bounding_box: Some(BoundingBox::new(0.4, 0.4, 0.2, 0.2)),
                ..RawFace::default()
            }])
        }
    }

    fn use_case(source: StubSource) -> AnalyzeVideoUseCase {
        AnalyzeVideoUseCase::new(
            Box::new(source),
            Arc::new(OneFaceDetector),
            Box::new(ThreadedPipelineExecutor::new()),
            AnalysisConfig::default(),
            None,
            None,
        )
    }

    fn frames(count: usize) -> Vec<Frame> {
        (0..count)
            .map(|i| Frame::new(vec![0u8; 12], 2, 2, i))
            .collect()
    }

    #[test]
    fn test_end_to_end_with_stubs() {
        let mut uc = use_case(StubSource {
            frames: frames(3),
            fail_open: false,
        });
        let summary = uc
            .execute(Path::new("talk.mp4"), &mut NullPipelineLogger)
            .unwrap();
        assert_eq!(summary.observations.len(), 3);
        // Same position every frame: one stable identity.
        assert_eq!(summary.emotion_counts.len(), 1);
    }

    #[test]
    fn test_open_failure_is_fatal() {
        let mut uc = use_case(StubSource {
            frames: frames(1),
            fail_open: true,
        });
        let result = uc.execute(Path::new("talk.mp4"), &mut NullPipelineLogger);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unsupported codec"));
    }

    #[test]
    fn test_second_execute_fails() {
        let mut uc = use_case(StubSource {
            frames: frames(1),
            fail_open: false,
        });
        uc.execute(Path::new("talk.mp4"), &mut NullPipelineLogger)
            .unwrap();
        let second = uc.execute(Path::new("talk.mp4"), &mut NullPipelineLogger);
        assert!(second.is_err());
    }
}
