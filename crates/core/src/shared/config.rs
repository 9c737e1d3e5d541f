use crate::shared::constants::{
    DEFAULT_CENTER_DISTANCE_THRESHOLD, DEFAULT_DETECTOR_CONCURRENCY, DEFAULT_GAZE_CONFIDENCE_FLOOR,
    DEFAULT_MOUTH_OPEN_CONFIDENCE_FLOOR, DEFAULT_OUTPUT_WIDTH, DEFAULT_SAMPLE_FPS,
    DEFAULT_STALENESS_WINDOW_FRAMES, DEFAULT_TURN_YAW_THRESHOLD,
};

/// Tunable parameters for one analysis run.
///
/// The defaults are the compatibility-critical values: changing them
/// changes identity assignment and classification results, so callers
/// should only override deliberately.
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    pub sample_fps: f64,
    pub output_width: u32,
    pub detector_concurrency: usize,
    pub center_distance_threshold: f64,
    pub staleness_window_frames: usize,
    pub turn_yaw_threshold: f64,
    pub gaze_confidence_floor: f64,
    pub mouth_open_confidence_floor: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_fps: DEFAULT_SAMPLE_FPS,
            output_width: DEFAULT_OUTPUT_WIDTH,
            detector_concurrency: DEFAULT_DETECTOR_CONCURRENCY,
            center_distance_threshold: DEFAULT_CENTER_DISTANCE_THRESHOLD,
            staleness_window_frames: DEFAULT_STALENESS_WINDOW_FRAMES,
            turn_yaw_threshold: DEFAULT_TURN_YAW_THRESHOLD,
            gaze_confidence_floor: DEFAULT_GAZE_CONFIDENCE_FLOOR,
            mouth_open_confidence_floor: DEFAULT_MOUTH_OPEN_CONFIDENCE_FLOOR,
        }
    }
}
