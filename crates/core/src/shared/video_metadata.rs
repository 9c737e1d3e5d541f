use std::path::PathBuf;

/// Properties of the source video, reported when a frame source opens.
///
/// `width`/`height` describe the sampled (post-scale) frames, not the
/// source resolution. `total_frames` counts source frames and may be 0
/// when the container does not declare a frame count.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Estimated number of sampled frames at `sample_fps`, if the source
    /// declared its frame count.
    pub fn estimated_samples(&self, sample_fps: f64) -> Option<usize> {
        if self.total_frames == 0 || self.fps <= 0.0 || sample_fps <= 0.0 {
            return None;
        }
        let duration = self.total_frames as f64 / self.fps;
        Some((duration * sample_fps).ceil() as usize)
    }
}
