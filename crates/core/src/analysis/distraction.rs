use std::fmt;

use serde::Serialize;

use crate::analysis::face_attributes::{EyeDirection, FaceAttributes};

/// Why a face was judged distracted. `Multiple` collapses any combination
/// of two or more triggers; the specific combination is not retained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DistractionReason {
    Turned,
    EyesAway,
    Occluded,
    Multiple,
}

impl fmt::Display for DistractionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DistractionReason::Turned => "turned",
            DistractionReason::EyesAway => "eyesAway",
            DistractionReason::Occluded => "occluded",
            DistractionReason::Multiple => "multiple",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistractionVerdict {
    pub distracted: bool,
    pub reason: Option<DistractionReason>,
}

/// Classifies one face as distracted or attentive.
///
/// Three independent triggers: head turned beyond the yaw threshold,
/// eyes looking away (direction is Left or Right), or face occluded.
/// Unknown eye direction does not count as looking away. Pure function.
pub fn classify_distraction(face: &FaceAttributes, turn_yaw_threshold: f64) -> DistractionVerdict {
    let turned = face.pose_yaw.abs() > turn_yaw_threshold;
    let eyes_away =
        face.eye_direction != EyeDirection::Center && face.eye_direction != EyeDirection::Unknown;
    let occluded = face.face_occluded == Some(true);

    let mut triggers = Vec::new();
    if turned {
        triggers.push(DistractionReason::Turned);
    }
    if eyes_away {
        triggers.push(DistractionReason::EyesAway);
    }
    if occluded {
        triggers.push(DistractionReason::Occluded);
    }

    match triggers.len() {
        0 => DistractionVerdict {
            distracted: false,
            reason: None,
        },
        1 => DistractionVerdict {
            distracted: true,
            reason: Some(triggers[0]),
        },
        _ => DistractionVerdict {
            distracted: true,
            reason: Some(DistractionReason::Multiple),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::raw_face::RawFace;
    use rstest::rstest;

    fn face(pose_yaw: f64, eye_direction: EyeDirection, occluded: Option<bool>) -> FaceAttributes {
        let mut attrs = FaceAttributes::from_raw(&RawFace::default(), 50.0);
        attrs.pose_yaw = pose_yaw;
        attrs.eye_direction = eye_direction;
        attrs.face_occluded = occluded;
        attrs
    }

    #[test]
    fn test_attentive_face() {
        let verdict = classify_distraction(&face(0.0, EyeDirection::Center, Some(false)), 25.0);
        assert!(!verdict.distracted);
        assert_eq!(verdict.reason, None);
    }

    #[rstest]
    #[case(30.0, EyeDirection::Center, Some(false), DistractionReason::Turned)]
    #[case(-30.0, EyeDirection::Center, Some(false), DistractionReason::Turned)]
    #[case(0.0, EyeDirection::Left, Some(false), DistractionReason::EyesAway)]
    #[case(0.0, EyeDirection::Right, Some(false), DistractionReason::EyesAway)]
    #[case(0.0, EyeDirection::Center, Some(true), DistractionReason::Occluded)]
    fn test_single_trigger(
        #[case] yaw: f64,
        #[case] eye: EyeDirection,
        #[case] occluded: Option<bool>,
        #[case] expected: DistractionReason,
    ) {
        let verdict = classify_distraction(&face(yaw, eye, occluded), 25.0);
        assert!(verdict.distracted);
        assert_eq!(verdict.reason, Some(expected));
    }

    #[test]
    fn test_multiple_triggers_collapse() {
        let verdict = classify_distraction(&face(30.0, EyeDirection::Left, Some(true)), 25.0);
        assert!(verdict.distracted);
        assert_eq!(verdict.reason, Some(DistractionReason::Multiple));
    }

    #[test]
    fn test_two_triggers_also_collapse() {
        let verdict = classify_distraction(&face(30.0, EyeDirection::Left, Some(false)), 25.0);
        assert_eq!(verdict.reason, Some(DistractionReason::Multiple));
    }

    #[test]
    fn test_yaw_at_threshold_is_not_turned() {
        let verdict = classify_distraction(&face(25.0, EyeDirection::Center, Some(false)), 25.0);
        assert!(!verdict.distracted);
    }

    #[test]
    fn test_unknown_eye_direction_is_not_away() {
        let verdict = classify_distraction(&face(0.0, EyeDirection::Unknown, Some(false)), 25.0);
        assert!(!verdict.distracted);
    }

    #[test]
    fn test_unknown_occlusion_is_not_occluded() {
        let verdict = classify_distraction(&face(0.0, EyeDirection::Center, None), 25.0);
        assert!(!verdict.distracted);
    }

    #[test]
    fn test_custom_threshold() {
        let verdict = classify_distraction(&face(20.0, EyeDirection::Center, Some(false)), 15.0);
        assert_eq!(verdict.reason, Some(DistractionReason::Turned));
    }
}
