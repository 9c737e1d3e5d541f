/// A face bounding box in normalized image coordinates.
///
/// All fields are fractions of the frame dimensions, in `[0, 1]`, so
/// geometry is comparable across frames regardless of pixel resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Box center, used as the face's position for identity tracking.
    pub fn centroid(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Fractional area of the frame covered by the box.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}
