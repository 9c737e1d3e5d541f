use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::analysis::frame_analyzer::FrameAnalyzer;
use crate::analysis::summary::Summary;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::raw_face::RawFace;
use crate::pipeline::pipeline_executor::{PipelineConfig, PipelineExecutor};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Per-frame detector outcome, tagged with the originating frame index.
/// The outer `Err` is a fatal source error that aborts the run.
type WorkItem = Result<(usize, Result<Vec<RawFace>, String>), SendError>;

/// Executes the pipeline with a reader thread and a pool of detector
/// workers.
///
/// Layout: `reader → [worker × C] → main [re-sequence + analyze]`
///
/// Detector calls run concurrently (at most `C` in flight, bounded by
/// the worker count and channel capacity) and may complete out of
/// order; the main loop buffers completions and applies them to the
/// order-sensitive analyzer in strict ascending frame-index order.
pub struct ThreadedPipelineExecutor;

impl ThreadedPipelineExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThreadedPipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineExecutor for ThreadedPipelineExecutor {
    fn execute(
        &self,
        source: Box<dyn FrameSource>,
        detector: Arc<dyn FaceDetector>,
        analyzer: FrameAnalyzer,
        config: PipelineConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Summary, Box<dyn std::error::Error>> {
        let workers = config.detector_concurrency.max(1);

        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Result<Frame, SendError>>(workers);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<WorkItem>(workers);

        let reader_handle = spawn_reader(source, frame_tx, config.cancelled.clone());
        let worker_handles: Vec<_> = (0..workers)
            .map(|_| {
                spawn_detect_worker(
                    detector.clone(),
                    frame_rx.clone(),
                    result_tx.clone(),
                    config.cancelled.clone(),
                )
            })
            .collect();
        drop(frame_rx);
        drop(result_tx);

        let (summary, main_error) = run_main_loop(result_rx, analyzer, &config, logger);

        join_threads(reader_handle, worker_handles, main_error)?;

        logger.summary();
        Ok(summary)
    }
}

fn spawn_reader(
    mut source: Box<dyn FrameSource>,
    frame_tx: crossbeam_channel::Sender<Result<Frame, SendError>>,
    cancelled: Arc<std::sync::atomic::AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for frame_result in source.frames() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let fatal = frame_result.is_err();
            let mapped = frame_result.map_err(|e| -> SendError { e.to_string().into() });
            if frame_tx.send(mapped).is_err() || fatal {
                break;
            }
        }
        source.close();
    })
}

fn spawn_detect_worker(
    detector: Arc<dyn FaceDetector>,
    frame_rx: crossbeam_channel::Receiver<Result<Frame, SendError>>,
    result_tx: crossbeam_channel::Sender<WorkItem>,
    cancelled: Arc<std::sync::atomic::AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for frame_result in frame_rx {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }

            let item: WorkItem = match frame_result {
                Ok(frame) => {
                    let index = frame.index();
                    // Detector failure is local to this frame; stringify
                    // it so the run can continue and still report it.
                    let faces = detector.detect(&frame).map_err(|e| e.to_string());
                    Ok((index, faces))
                }
                Err(e) => Err(e),
            };

            if result_tx.send(item).is_err() {
                break;
            }
        }
    })
}

/// Receives detector results in completion order, re-sequences them by
/// frame index, and applies them to the analyzer in ascending order.
fn run_main_loop(
    result_rx: crossbeam_channel::Receiver<WorkItem>,
    mut analyzer: FrameAnalyzer,
    config: &PipelineConfig,
    logger: &mut dyn PipelineLogger,
) -> (Summary, Option<Box<dyn std::error::Error>>) {
    let mut pending: BTreeMap<usize, Result<Vec<RawFace>, String>> = BTreeMap::new();
    let mut next_index: usize = 0;
    let mut error: Option<Box<dyn std::error::Error>> = None;

    for item in result_rx {
        if config.cancelled.load(Ordering::Relaxed) {
            error = Some("Cancelled".into());
            break;
        }

        let (index, outcome) = match item {
            Ok(pair) => pair,
            Err(e) => {
                error = Some(e.to_string().into());
                break;
            }
        };
        pending.insert(index, outcome);

        while let Some(outcome) = pending.remove(&next_index) {
            match outcome {
                Ok(faces) => analyzer.ingest(next_index, faces),
                Err(message) => analyzer.ingest_failure(next_index, message),
            }
            next_index += 1;

            logger.progress(next_index, config.estimated_frames);
            if let Some(ref callback) = config.on_progress {
                if !callback(next_index, config.estimated_frames) {
                    config.cancelled.store(true, Ordering::Relaxed);
                    error = Some("Cancelled".into());
                    break;
                }
            }
        }

        if error.is_some() {
            break;
        }
    }

    if error.is_none() && config.cancelled.load(Ordering::Relaxed) {
        error = Some("Cancelled".into());
    }

    (analyzer.finish(), error)
}

/// Joins all pipeline threads and coalesces the first error encountered.
fn join_threads(
    reader_handle: std::thread::JoinHandle<()>,
    worker_handles: Vec<std::thread::JoinHandle<()>>,
    mut first_error: Option<Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    if reader_handle.join().is_err() && first_error.is_none() {
        first_error = Some("Reader thread panicked".into());
    }
    for handle in worker_handles {
        if handle.join().is_err() && first_error.is_none() {
            first_error = Some("Detector worker panicked".into());
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
