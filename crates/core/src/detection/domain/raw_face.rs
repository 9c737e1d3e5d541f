use crate::shared::bounding_box::BoundingBox;

/// One scored emotion label from the detector, e.g. `("HAPPY", 93.2)`.
#[derive(Clone, Debug, PartialEq)]
pub struct EmotionScore {
    pub label: String,
    pub confidence: f64,
}

/// Gaze estimate: yaw in degrees (negative = viewer's left) plus the
/// detector's confidence in the estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GazeDirection {
    pub yaw: f64,
    pub confidence: f64,
}

/// A detector boolean (eyes open, mouth open, ...) with its confidence.
/// `value` is `None` when the detector could not decide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoolAttribute {
    pub value: Option<bool>,
    pub confidence: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub yaw: f64,
}

/// One face as reported by the external detector for a single frame.
///
/// Every attribute is optional on the wire; the normalizer maps absent
/// fields to documented defaults. Consumed immediately after detection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawFace {
    pub emotions: Vec<EmotionScore>,
    pub eye_direction: Option<GazeDirection>,
    pub eyes_open: Option<BoolAttribute>,
    pub mouth_open: Option<BoolAttribute>,
    pub face_occluded: Option<BoolAttribute>,
    pub smile: Option<BoolAttribute>,
    pub pose: Option<Pose>,
    pub bounding_box: Option<BoundingBox>,
}
