use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::analysis::face_attributes::FaceAttributes;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Speaker,
    Audience,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Speaker => f.write_str("speaker"),
            Role::Audience => f.write_str("audience"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RoledFace {
    pub attributes: FaceAttributes,
    pub role: Role,
}

/// Splits one frame's faces into the speaker (largest bounding-box area)
/// and the audience (everyone else).
///
/// The sort is stable and descending by area, so equal-area faces keep
/// their detector order and exactly one speaker exists per non-empty
/// frame. Returns faces in processing order: speaker first, then
/// audience, which downstream identity assignment depends on.
pub fn separate_speaker(mut faces: Vec<FaceAttributes>) -> Vec<RoledFace> {
    faces.sort_by(|a, b| {
        b.bounding_box_area
            .partial_cmp(&a.bounding_box_area)
            .unwrap_or(Ordering::Equal)
    });

    faces
        .into_iter()
        .enumerate()
        .map(|(i, attributes)| RoledFace {
            attributes,
            role: if i == 0 { Role::Speaker } else { Role::Audience },
        })
        .collect()
}
