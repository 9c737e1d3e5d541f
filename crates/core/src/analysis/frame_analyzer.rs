use log::{debug, warn};

use crate::analysis::aggregator::Aggregator;
use crate::analysis::distraction::classify_distraction;
use crate::analysis::face_attributes::FaceAttributes;
use crate::analysis::identity_tracker::IdentityTracker;
use crate::analysis::role_separator::separate_speaker;
use crate::analysis::summary::Summary;
use crate::detection::domain::raw_face::RawFace;
use crate::shared::config::AnalysisConfig;

/// The sequential stage of the pipeline: normalize, split roles, assign
/// identities, classify distraction, and aggregate.
///
/// Identity tracking and aggregation are order-sensitive, so frames must
/// be ingested in strictly ascending index order. The dispatcher
/// re-sequences out-of-order detector results before calling in here.
pub struct FrameAnalyzer {
    tracker: IdentityTracker,
    aggregator: Aggregator,
    gaze_confidence_floor: f64,
    turn_yaw_threshold: f64,
}

impl FrameAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            tracker: IdentityTracker::new(
                config.center_distance_threshold,
                config.staleness_window_frames,
            ),
            aggregator: Aggregator::new(config.mouth_open_confidence_floor),
            gaze_confidence_floor: config.gaze_confidence_floor,
            turn_yaw_threshold: config.turn_yaw_threshold,
        }
    }

    /// Folds one frame's detector output into the running state.
    /// Faces are processed speaker first, then audience by size.
    pub fn ingest(&mut self, frame_index: usize, raw_faces: Vec<RawFace>) {
        let faces: Vec<FaceAttributes> = raw_faces
            .iter()
            .map(|raw| FaceAttributes::from_raw(raw, self.gaze_confidence_floor))
            .collect();

        let roled = separate_speaker(faces);
        debug!("frame {frame_index}: {} face(s)", roled.len());

        for face in &roled {
            let person = self
                .tracker
                .assign(face.attributes.bounding_box.as_ref(), frame_index);
            let verdict = classify_distraction(&face.attributes, self.turn_yaw_threshold);
            self.aggregator.observe(frame_index, face, person, verdict);
        }
    }

    /// Records a failed detector call; the frame contributes no faces.
    pub fn ingest_failure(&mut self, frame_index: usize, message: String) {
        warn!("frame {frame_index}: detector call failed: {message}");
        self.aggregator.record_frame_error(frame_index, message);
    }

    pub fn finish(self) -> Summary {
        self.aggregator.finalize()
    }
}
