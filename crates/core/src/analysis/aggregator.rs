use std::collections::BTreeMap;

use crate::analysis::distraction::DistractionVerdict;
use crate::analysis::identity_tracker::PersonId;
use crate::analysis::role_separator::{Role, RoledFace};
use crate::analysis::summary::{
    DistractionSummary, EmotionBalance, EyeDirectionCounts, EyesMouthCounts, FaceObservation,
    FrameError, RatioValue, ReasonBreakdown, SpeakingRatio, Summary,
};

const POSITIVE_EMOTIONS: &[&str] = &["HAPPY", "SURPRISED"];
const NEGATIVE_EMOTIONS: &[&str] = &["SAD", "ANGRY", "DISGUSTED", "CONFUSED", "FEAR"];

#[derive(Default)]
struct DistractionRecord {
    total_frames: u64,
    distracted_frames: u64,
    reason_breakdown: ReasonBreakdown,
}

/// Streaming fold over classified faces.
///
/// `observe` must be called in frame order; `finalize` computes the
/// closed-form rates exactly once, after the last frame.
pub struct Aggregator {
    mouth_open_confidence_floor: f64,
    observations: Vec<FaceObservation>,
    emotion_counts: BTreeMap<PersonId, BTreeMap<String, u64>>,
    distraction: BTreeMap<PersonId, DistractionRecord>,
    speaker_speaking: u64,
    audience_speaking: u64,
    audience_positive: u64,
    audience_negative: u64,
    eye_direction_counts: EyeDirectionCounts,
    eyes_open_count: u64,
    mouth_open_count: u64,
    errors: Vec<FrameError>,
}

impl Aggregator {
    pub fn new(mouth_open_confidence_floor: f64) -> Self {
        Self {
            mouth_open_confidence_floor,
            observations: Vec::new(),
            emotion_counts: BTreeMap::new(),
            distraction: BTreeMap::new(),
            speaker_speaking: 0,
            audience_speaking: 0,
            audience_positive: 0,
            audience_negative: 0,
            eye_direction_counts: EyeDirectionCounts::default(),
            eyes_open_count: 0,
            mouth_open_count: 0,
            errors: Vec::new(),
        }
    }

    /// Folds one classified face into the running counters.
    pub fn observe(
        &mut self,
        frame_index: usize,
        face: &RoledFace,
        person: PersonId,
        verdict: DistractionVerdict,
    ) {
        let attrs = &face.attributes;

        if attrs.mouth_open == Some(true)
            && attrs.mouth_open_confidence > self.mouth_open_confidence_floor
        {
            match face.role {
                Role::Speaker => self.speaker_speaking += 1,
                Role::Audience => self.audience_speaking += 1,
            }
        }

        if face.role == Role::Audience {
            if POSITIVE_EMOTIONS.contains(&attrs.emotion.as_str()) {
                self.audience_positive += 1;
            }
            if NEGATIVE_EMOTIONS.contains(&attrs.emotion.as_str()) {
                self.audience_negative += 1;
            }
        }

        *self
            .emotion_counts
            .entry(person)
            .or_default()
            .entry(attrs.emotion.clone())
            .or_insert(0) += 1;

        let record = self.distraction.entry(person).or_default();
        record.total_frames += 1;
        if verdict.distracted {
            record.distracted_frames += 1;
            if let Some(reason) = verdict.reason {
                record.reason_breakdown.record(reason);
            }
        }

        self.eye_direction_counts.record(attrs.eye_direction);
        if attrs.eyes_open == Some(true) {
            self.eyes_open_count += 1;
        }
        if attrs.mouth_open == Some(true) {
            self.mouth_open_count += 1;
        }

        self.observations.push(FaceObservation {
            frame_index,
            person_id: person,
            role: face.role,
            emotion: attrs.emotion.clone(),
            emotion_confidence: attrs.emotion_confidence,
            eye_direction: attrs.eye_direction,
            eyes_open: attrs.eyes_open,
            mouth_open: attrs.mouth_open,
            smile: attrs.smile,
            pose_yaw: attrs.pose_yaw,
            distracted: verdict.distracted,
            distraction_reason: verdict.reason,
        });
    }

    /// Records a per-frame detector failure. The frame contributes no
    /// faces; the run keeps going.
    pub fn record_frame_error(&mut self, frame_index: usize, message: String) {
        self.errors.push(FrameError {
            frame_index,
            message,
        });
    }

    pub fn finalize(self) -> Summary {
        let distraction = self
            .distraction
            .into_iter()
            .map(|(person, record)| {
                let rate = if record.total_frames == 0 {
                    0.0
                } else {
                    record.distracted_frames as f64 / record.total_frames as f64
                };
                (
                    person,
                    DistractionSummary {
                        total_frames: record.total_frames,
                        distracted_frames: record.distracted_frames,
                        reason_breakdown: record.reason_breakdown,
                        distraction_rate: rate,
                    },
                )
            })
            .collect();

        let balance_total = self.audience_positive + self.audience_negative;
        let audience_balance = EmotionBalance {
            positive: self.audience_positive,
            negative: self.audience_negative,
            positive_rate: rate_or_zero(self.audience_positive, balance_total),
            negative_rate: rate_or_zero(self.audience_negative, balance_total),
        };

        Summary {
            observations: self.observations,
            emotion_counts: self.emotion_counts,
            distraction,
            speaking: SpeakingRatio {
                speaker_speaking_frames: self.speaker_speaking,
                audience_speaking_frames: self.audience_speaking,
                speaker_vs_audience_ratio: RatioValue::of(
                    self.speaker_speaking,
                    self.audience_speaking,
                ),
            },
            audience_balance,
            eye_direction_counts: self.eye_direction_counts,
            eyes_mouth_counts: EyesMouthCounts {
                eyes_open: self.eyes_open_count,
                mouth_open: self.mouth_open_count,
            },
            errors: self.errors,
        }
    }
}

fn rate_or_zero(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::distraction::DistractionReason;
    use crate::analysis::face_attributes::{EyeDirection, FaceAttributes};
    use crate::analysis::identity_tracker::IdentityTracker;
    use crate::detection::domain::raw_face::RawFace;
    use approx::assert_relative_eq;

    fn attrs() -> FaceAttributes {
        FaceAttributes::from_raw(&RawFace::default(), 50.0)
    }

    fn roled(role: Role, mutate: impl FnOnce(&mut FaceAttributes)) -> RoledFace {
        let mut attributes = attrs();
        mutate(&mut attributes);
        RoledFace { attributes, role }
    }

    fn person(n: usize) -> PersonId {
        // Allocate ids the only way the public API allows.
        let mut t = IdentityTracker::new(0.0, 0);
        let mut id = t.assign(None, 0);
        for _ in 1..n {
            id = t.assign(None, 0);
        }
        id
    }

    fn not_distracted() -> DistractionVerdict {
        DistractionVerdict {
            distracted: false,
            reason: None,
        }
    }

    #[test]
    fn test_speaking_counters_respect_confidence_floor() {
        let mut agg = Aggregator::new(70.0);
        let speaking = roled(Role::Speaker, |a| {
            a.mouth_open = Some(true);
            a.mouth_open_confidence = 90.0;
        });
        let low_confidence = roled(Role::Audience, |a| {
            a.mouth_open = Some(true);
            a.mouth_open_confidence = 70.0; // at the floor, not above
        });
        agg.observe(0, &speaking, person(1), not_distracted());
        agg.observe(0, &low_confidence, person(2), not_distracted());

        let summary = agg.finalize();
        assert_eq!(summary.speaking.speaker_speaking_frames, 1);
        assert_eq!(summary.speaking.audience_speaking_frames, 0);
    }

    #[test]
    fn test_speaking_ratio_infinite_when_audience_silent() {
        let mut agg = Aggregator::new(70.0);
        let speaking = roled(Role::Speaker, |a| {
            a.mouth_open = Some(true);
            a.mouth_open_confidence = 90.0;
        });
        agg.observe(0, &speaking, person(1), not_distracted());

        let summary = agg.finalize();
        assert_eq!(
            summary.speaking.speaker_vs_audience_ratio,
            RatioValue::Infinite
        );
    }

    #[test]
    fn test_audience_emotion_balance() {
        let mut agg = Aggregator::new(70.0);
        let p = person(1);
        agg.observe(0, &roled(Role::Audience, |a| a.emotion = "HAPPY".into()), p, not_distracted());
        agg.observe(1, &roled(Role::Audience, |a| a.emotion = "SAD".into()), p, not_distracted());
        agg.observe(2, &roled(Role::Audience, |a| a.emotion = "CALM".into()), p, not_distracted());
        // Speaker emotions never count toward the balance.
        agg.observe(3, &roled(Role::Speaker, |a| a.emotion = "ANGRY".into()), p, not_distracted());

        let balance = agg.finalize().audience_balance;
        assert_eq!(balance.positive, 1);
        assert_eq!(balance.negative, 1);
        assert_relative_eq!(balance.positive_rate, 0.5);
        assert_relative_eq!(balance.negative_rate, 0.5);
    }

    #[test]
    fn test_balance_rates_zero_when_all_neutral() {
        let mut agg = Aggregator::new(70.0);
        agg.observe(
            0,
            &roled(Role::Audience, |a| a.emotion = "CALM".into()),
            person(1),
            not_distracted(),
        );
        let balance = agg.finalize().audience_balance;
        assert_eq!(balance.positive_rate, 0.0);
        assert_eq!(balance.negative_rate, 0.0);
    }

    #[test]
    fn test_emotion_counts_accumulate_per_person() {
        let mut agg = Aggregator::new(70.0);
        let p = person(1);
        agg.observe(0, &roled(Role::Speaker, |a| a.emotion = "HAPPY".into()), p, not_distracted());
        agg.observe(1, &roled(Role::Speaker, |a| a.emotion = "HAPPY".into()), p, not_distracted());
        agg.observe(2, &roled(Role::Speaker, |a| a.emotion = "CALM".into()), p, not_distracted());

        let summary = agg.finalize();
        let counts = &summary.emotion_counts[&p];
        assert_eq!(counts["HAPPY"], 2);
        assert_eq!(counts["CALM"], 1);
    }

    #[test]
    fn test_distraction_rate() {
        let mut agg = Aggregator::new(70.0);
        let p = person(1);
        agg.observe(
            0,
            &roled(Role::Speaker, |_| {}),
            p,
            DistractionVerdict {
                distracted: true,
                reason: Some(DistractionReason::Turned),
            },
        );
        agg.observe(1, &roled(Role::Speaker, |_| {}), p, not_distracted());

        let summary = agg.finalize();
        let rec = &summary.distraction[&p];
        assert_eq!(rec.total_frames, 2);
        assert_eq!(rec.distracted_frames, 1);
        assert_eq!(rec.reason_breakdown.turned, 1);
        assert_relative_eq!(rec.distraction_rate, 0.5);
    }

    #[test]
    fn test_eye_direction_histogram_and_open_counts() {
        let mut agg = Aggregator::new(70.0);
        let p = person(1);
        agg.observe(
            0,
            &roled(Role::Speaker, |a| {
                a.eye_direction = EyeDirection::Left;
                a.eyes_open = Some(true);
                a.mouth_open = Some(true);
            }),
            p,
            not_distracted(),
        );
        agg.observe(
            1,
            &roled(Role::Audience, |a| {
                a.eye_direction = EyeDirection::Center;
                a.eyes_open = Some(false);
            }),
            p,
            not_distracted(),
        );

        let summary = agg.finalize();
        assert_eq!(summary.eye_direction_counts.left, 1);
        assert_eq!(summary.eye_direction_counts.center, 1);
        assert_eq!(summary.eyes_mouth_counts.eyes_open, 1);
        assert_eq!(summary.eyes_mouth_counts.mouth_open, 1);
    }

    #[test]
    fn test_frame_errors_are_collected() {
        let mut agg = Aggregator::new(70.0);
        agg.record_frame_error(3, "detector timed out".to_string());
        let summary = agg.finalize();
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].frame_index, 3);
        assert!(summary.observations.is_empty());
    }

    #[test]
    fn test_empty_run_finalizes_cleanly() {
        let summary = Aggregator::new(70.0).finalize();
        assert!(summary.observations.is_empty());
        assert!(summary.emotion_counts.is_empty());
        assert_eq!(
            summary.speaking.speaker_vs_audience_ratio,
            RatioValue::Infinite
        );
        assert_eq!(summary.audience_balance.positive_rate, 0.0);
    }
}
