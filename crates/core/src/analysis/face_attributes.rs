use std::fmt;

use serde::Serialize;

use crate::detection::domain::raw_face::{BoolAttribute, GazeDirection, RawFace};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::GAZE_YAW_SIDE_THRESHOLD;

pub const UNKNOWN_EMOTION: &str = "Unknown";

/// Coarse gaze classification derived from gaze yaw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EyeDirection {
    Left,
    Right,
    Center,
    Unknown,
}

impl fmt::Display for EyeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EyeDirection::Left => "Left",
            EyeDirection::Right => "Right",
            EyeDirection::Center => "Center",
            EyeDirection::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Canonical per-face attribute record, normalized from one [`RawFace`].
///
/// Tri-state booleans are `None` when the detector could not decide or
/// omitted the attribute entirely.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceAttributes {
    pub emotion: String,
    pub emotion_confidence: f64,
    pub eye_direction: EyeDirection,
    pub eye_direction_confidence: f64,
    pub eyes_open: Option<bool>,
    pub eyes_open_confidence: f64,
    pub mouth_open: Option<bool>,
    pub mouth_open_confidence: f64,
    pub face_occluded: Option<bool>,
    pub face_occluded_confidence: f64,
    pub smile: Option<bool>,
    pub smile_confidence: f64,
    pub pose_yaw: f64,
    pub bounding_box: Option<BoundingBox>,
    pub bounding_box_area: f64,
}

impl FaceAttributes {
    /// Normalizes one detector face. Pure; absent attributes default to
    /// unknown / 0.
    ///
    /// Emotion selection keeps the highest-confidence entry; ties keep
    /// the first entry in detector order.
    pub fn from_raw(raw: &RawFace, gaze_confidence_floor: f64) -> Self {
        let (emotion, emotion_confidence) = top_emotion(raw);
        let (eye_direction, eye_direction_confidence) =
            classify_gaze(raw.eye_direction.as_ref(), gaze_confidence_floor);

        let (eyes_open, eyes_open_confidence) = split_bool(raw.eyes_open);
        let (mouth_open, mouth_open_confidence) = split_bool(raw.mouth_open);
        let (face_occluded, face_occluded_confidence) = split_bool(raw.face_occluded);
        let (smile, smile_confidence) = split_bool(raw.smile);

        Self {
            emotion,
            emotion_confidence,
            eye_direction,
            eye_direction_confidence,
            eyes_open,
            eyes_open_confidence,
            mouth_open,
            mouth_open_confidence,
            face_occluded,
            face_occluded_confidence,
            smile,
            smile_confidence,
            pose_yaw: raw.pose.map_or(0.0, |p| p.yaw),
            bounding_box: raw.bounding_box,
            bounding_box_area: raw.bounding_box.map_or(0.0, |b| b.area()),
        }
    }
}

fn top_emotion(raw: &RawFace) -> (String, f64) {
    let mut best: Option<&crate::detection::domain::raw_face::EmotionScore> = None;
    for candidate in &raw.emotions {
        match best {
            // Strict > keeps the first entry on equal confidence.
            Some(current) if candidate.confidence <= current.confidence => {}
            _ => best = Some(candidate),
        }
    }
    match best {
        Some(e) => (e.label.clone(), e.confidence),
        None => (UNKNOWN_EMOTION.to_string(), 0.0),
    }
}

fn classify_gaze(gaze: Option<&GazeDirection>, confidence_floor: f64) -> (EyeDirection, f64) {
    let Some(gaze) = gaze else {
        return (EyeDirection::Unknown, 0.0);
    };
    if gaze.confidence <= confidence_floor {
        return (EyeDirection::Unknown, gaze.confidence);
    }
    let direction = if gaze.yaw < -GAZE_YAW_SIDE_THRESHOLD {
        EyeDirection::Left
    } else if gaze.yaw > GAZE_YAW_SIDE_THRESHOLD {
        EyeDirection::Right
    } else {
        EyeDirection::Center
    };
    (direction, gaze.confidence)
}

fn split_bool(attr: Option<BoolAttribute>) -> (Option<bool>, f64) {
    match attr {
        Some(a) => (a.value, a.confidence),
        None => (None, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::raw_face::{EmotionScore, Pose};
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn face_with_emotions(emotions: Vec<(&str, f64)>) -> RawFace {
        RawFace {
            emotions: emotions
                .into_iter()
                .map(|(label, confidence)| EmotionScore {
                    label: label.to_string(),
                    confidence,
                })
                .collect(),
            ..RawFace::default()
        }
    }

    #[test]
    fn test_top_emotion_picks_max_confidence() {
        let raw = face_with_emotions(vec![("CALM", 20.0), ("HAPPY", 75.0), ("SAD", 5.0)]);
        let attrs = FaceAttributes::from_raw(&raw, 50.0);
        assert_eq!(attrs.emotion, "HAPPY");
        assert_relative_eq!(attrs.emotion_confidence, 75.0);
    }

    #[test]
    fn test_top_emotion_tie_keeps_first_entry() {
        let raw = face_with_emotions(vec![("CALM", 40.0), ("HAPPY", 40.0)]);
        let attrs = FaceAttributes::from_raw(&raw, 50.0);
        assert_eq!(attrs.emotion, "CALM");
    }

    #[test]
    fn test_empty_emotion_list_is_unknown() {
        let attrs = FaceAttributes::from_raw(&RawFace::default(), 50.0);
        assert_eq!(attrs.emotion, UNKNOWN_EMOTION);
        assert_eq!(attrs.emotion_confidence, 0.0);
    }

    #[rstest]
    #[case(-20.0, 80.0, EyeDirection::Left)]
    #[case(20.0, 80.0, EyeDirection::Right)]
    #[case(0.0, 80.0, EyeDirection::Center)]
    #[case(-15.0, 80.0, EyeDirection::Center)] // boundary: not strictly < -15
    #[case(15.0, 80.0, EyeDirection::Center)] // boundary: not strictly > 15
    #[case(-20.0, 50.0, EyeDirection::Unknown)] // confidence at floor
    #[case(-20.0, 10.0, EyeDirection::Unknown)]
    fn test_gaze_classification(
        #[case] yaw: f64,
        #[case] confidence: f64,
        #[case] expected: EyeDirection,
    ) {
        let raw = RawFace {
            eye_direction: Some(GazeDirection { yaw, confidence }),
            ..RawFace::default()
        };
        let attrs = FaceAttributes::from_raw(&raw, 50.0);
        assert_eq!(attrs.eye_direction, expected);
    }

    #[test]
    fn test_missing_gaze_is_unknown_with_zero_confidence() {
        let attrs = FaceAttributes::from_raw(&RawFace::default(), 50.0);
        assert_eq!(attrs.eye_direction, EyeDirection::Unknown);
        assert_eq!(attrs.eye_direction_confidence, 0.0);
    }

    #[test]
    fn test_missing_attributes_default_to_unknown() {
        let attrs = FaceAttributes::from_raw(&RawFace::default(), 50.0);
        assert_eq!(attrs.eyes_open, None);
        assert_eq!(attrs.mouth_open, None);
        assert_eq!(attrs.face_occluded, None);
        assert_eq!(attrs.smile, None);
        assert_eq!(attrs.pose_yaw, 0.0);
        assert_eq!(attrs.bounding_box, None);
        assert_eq!(attrs.bounding_box_area, 0.0);
    }

    #[test]
    fn test_bounding_box_area_is_derived() {
        let raw = RawFace {
            bounding_box: Some(BoundingBox::new(0.1, 0.1, 0.5, 0.2)),
            pose: Some(Pose { yaw: -30.0 }),
            ..RawFace::default()
        };
        let attrs = FaceAttributes::from_raw(&raw, 50.0);
        assert_relative_eq!(attrs.bounding_box_area, 0.1);
        assert_relative_eq!(attrs.pose_yaw, -30.0);
    }
}
