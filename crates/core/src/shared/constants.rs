/// Frames sampled per second of video.
pub const DEFAULT_SAMPLE_FPS: f64 = 1.0;

/// Width sampled frames are scaled to before detection (height keeps aspect).
pub const DEFAULT_OUTPUT_WIDTH: u32 = 640;

/// Max detector calls in flight at once.
pub const DEFAULT_DETECTOR_CONCURRENCY: usize = 6;

/// Max centroid distance (normalized units) for a face to match an
/// existing identity.
pub const DEFAULT_CENTER_DISTANCE_THRESHOLD: f64 = 0.15;

/// Frames an identity stays eligible for matching after its last sighting
/// (~5 minutes at 1 fps).
pub const DEFAULT_STALENESS_WINDOW_FRAMES: usize = 300;

/// Head yaw (degrees, absolute) beyond which a face counts as turned away.
pub const DEFAULT_TURN_YAW_THRESHOLD: f64 = 25.0;

/// Gaze confidence at or below which eye direction is reported Unknown.
pub const DEFAULT_GAZE_CONFIDENCE_FLOOR: f64 = 50.0;

/// Gaze yaw (degrees) beyond which eyes are classified Left/Right
/// rather than Center.
pub const GAZE_YAW_SIDE_THRESHOLD: f64 = 15.0;

/// Mouth-open confidence above which a face counts as speaking.
pub const DEFAULT_MOUTH_OPEN_CONFIDENCE_FLOOR: f64 = 70.0;
