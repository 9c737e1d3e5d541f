use std::fmt;

use serde::Serialize;

use crate::shared::bounding_box::BoundingBox;

/// Stable label for one physical face across a video's frames.
///
/// Ids are allocated from a per-run counter starting at 1 and never
/// reused, even after the identity goes stale. Renders as `person_<n>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(u32);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "person_{}", self.0)
    }
}

impl Serialize for PersonId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug)]
struct TrackedIdentity {
    id: PersonId,
    cx: f64,
    cy: f64,
    last_seen: usize,
}

/// Nearest-centroid identity tracker, scoped to one analysis run.
///
/// Entries are never deleted; matching simply skips identities not seen
/// within the staleness window, which retires them once nothing nearby
/// reappears in time. Updates are order-sensitive, so `assign` must be
/// called in ascending frame order.
pub struct IdentityTracker {
    entries: Vec<TrackedIdentity>,
    next_id: u32,
    distance_threshold: f64,
    staleness_window: usize,
}

impl IdentityTracker {
    pub fn new(distance_threshold: f64, staleness_window: usize) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            distance_threshold,
            staleness_window,
        }
    }

    /// Assigns the face to the nearest known identity within the distance
    /// threshold, or allocates a new one.
    ///
    /// A face with no bounding box is placed at the image center. Exact
    /// distance ties go to the lowest-numbered id: entries are scanned in
    /// allocation order and only a strictly smaller distance replaces the
    /// current best.
    pub fn assign(&mut self, bounding_box: Option<&BoundingBox>, frame_index: usize) -> PersonId {
        let (cx, cy) = bounding_box.map_or((0.5, 0.5), BoundingBox::centroid);

        let mut best: Option<(usize, f64)> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if frame_index.saturating_sub(entry.last_seen) > self.staleness_window {
                continue;
            }
            let dist = (entry.cx - cx).hypot(entry.cy - cy);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }

        if let Some((i, dist)) = best {
            if dist < self.distance_threshold {
                let entry = &mut self.entries[i];
                entry.cx = cx;
                entry.cy = cy;
                entry.last_seen = frame_index;
                return entry.id;
            }
        }

        let id = PersonId(self.next_id);
        self.next_id += 1;
        self.entries.push(TrackedIdentity {
            id,
            cx,
            cy,
            last_seen: frame_index,
        });
        id
    }
}
