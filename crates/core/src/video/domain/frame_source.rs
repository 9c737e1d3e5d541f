use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Produces the sampled frame stream for one analysis run.
///
/// Implementations handle decoding, scaling, and time-based sampling;
/// the pipeline consumes the result as a finite, ordered,
/// non-restartable sequence. Frame indices start at 0 and increase by 1
/// per sampled instant.
pub trait FrameSource: Send {
    /// Opens a video file, configures sampling, and returns the source
    /// metadata. Failure here is fatal for the run.
    fn open(
        &mut self,
        path: &Path,
        sample_fps: f64,
        output_width: u32,
    ) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over sampled frames in presentation order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
