use crate::detection::domain::raw_face::RawFace;
use crate::shared::frame::Frame;

/// Domain interface for the external per-image face/attribute detector.
///
/// Implementations are shared across dispatcher workers, hence
/// `&self` + `Sync`; any per-call state belongs in the implementation.
/// Returning an empty vec means no face was found, which is not an error.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Result<Vec<RawFace>, Box<dyn std::error::Error + Send + Sync>>;
}
