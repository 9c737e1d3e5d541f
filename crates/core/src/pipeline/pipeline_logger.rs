use std::time::Instant;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Decouples the use case and executor from specific output mechanisms
/// so callers can observe pipeline behavior without changing the
/// orchestration code.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 when the sampled frame
    /// count is unknown up front.
    fn progress(&mut self, current: usize, total: usize);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&mut self) {}
}

/// Silent logger that discards all events. Used by tests and by callers
/// with their own progress reporting.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger emitting through the `log` facade.
///
/// Progress output is throttled to every `throttle_frames` frames to
/// avoid excessive output on long videos.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    start_time: Instant,
    frames_seen: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            start_time: Instant::now(),
            frames_seen: 0,
        }
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = self.frames_seen.max(current);
        if current % self.throttle_frames != 0 {
            return;
        }
        if total > 0 {
            log::info!("processed frame {current}/{total}");
        } else {
            log::info!("processed frame {current}");
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&mut self) {
        let elapsed = self.start_time.elapsed();
        log::info!(
            "analysis finished in {:.1}s ({} frames)",
            elapsed.as_secs_f64(),
            self.frames_seen
        );
    }
}
