use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::distraction::DistractionReason;
use crate::analysis::face_attributes::EyeDirection;
use crate::analysis::identity_tracker::PersonId;
use crate::analysis::role_separator::Role;

/// One per-frame-per-face record, in frame order. Mirrors the CSV schema
/// of the output artifact.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceObservation {
    pub frame_index: usize,
    pub person_id: PersonId,
    pub role: Role,
    pub emotion: String,
    pub emotion_confidence: f64,
    pub eye_direction: EyeDirection,
    pub eyes_open: Option<bool>,
    pub mouth_open: Option<bool>,
    pub smile: Option<bool>,
    pub pose_yaw: f64,
    pub distracted: bool,
    pub distraction_reason: Option<DistractionReason>,
}

/// Distraction reason tally for one person.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonBreakdown {
    pub turned: u64,
    pub eyes_away: u64,
    pub occluded: u64,
    pub multiple: u64,
}

impl ReasonBreakdown {
    pub fn record(&mut self, reason: DistractionReason) {
        match reason {
            DistractionReason::Turned => self.turned += 1,
            DistractionReason::EyesAway => self.eyes_away += 1,
            DistractionReason::Occluded => self.occluded += 1,
            DistractionReason::Multiple => self.multiple += 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistractionSummary {
    pub total_frames: u64,
    pub distracted_frames: u64,
    pub reason_breakdown: ReasonBreakdown,
    /// `distracted_frames / total_frames`; 0 when no frames were seen.
    pub distraction_rate: f64,
}

/// Ratio that stays well-defined when the denominator is zero.
///
/// Serializes as a JSON number when finite and as the string
/// `"Infinity"` otherwise, which the output format requires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RatioValue {
    Finite(f64),
    Infinite,
}

impl RatioValue {
    pub fn of(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            RatioValue::Infinite
        } else {
            RatioValue::Finite(numerator as f64 / denominator as f64)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            RatioValue::Finite(v) => *v,
            RatioValue::Infinite => f64::INFINITY,
        }
    }
}

impl Serialize for RatioValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RatioValue::Finite(v) => serializer.serialize_f64(*v),
            RatioValue::Infinite => serializer.serialize_str("Infinity"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakingRatio {
    pub speaker_speaking_frames: u64,
    pub audience_speaking_frames: u64,
    pub speaker_vs_audience_ratio: RatioValue,
}

/// Positive/negative emotion balance across audience faces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionBalance {
    pub positive: u64,
    pub negative: u64,
    pub positive_rate: f64,
    pub negative_rate: f64,
}

/// How many faces looked each way, across all frames and roles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EyeDirectionCounts {
    pub left: u64,
    pub right: u64,
    pub center: u64,
    pub unknown: u64,
}

impl EyeDirectionCounts {
    pub fn record(&mut self, direction: EyeDirection) {
        match direction {
            EyeDirection::Left => self.left += 1,
            EyeDirection::Right => self.right += 1,
            EyeDirection::Center => self.center += 1,
            EyeDirection::Unknown => self.unknown += 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EyesMouthCounts {
    pub eyes_open: u64,
    pub mouth_open: u64,
}

/// A detector call that failed for one frame. The frame contributed no
/// face records; the run continued.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameError {
    pub frame_index: usize,
    pub message: String,
}

/// Finalized result of one analysis run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub observations: Vec<FaceObservation>,
    pub emotion_counts: BTreeMap<PersonId, BTreeMap<String, u64>>,
    pub distraction: BTreeMap<PersonId, DistractionSummary>,
    pub speaking: SpeakingRatio,
    pub audience_balance: EmotionBalance,
    pub eye_direction_counts: EyeDirectionCounts,
    pub eyes_mouth_counts: EyesMouthCounts,
    pub errors: Vec<FrameError>,
}
