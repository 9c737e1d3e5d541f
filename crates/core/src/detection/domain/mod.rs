pub mod face_detector;
pub mod raw_face;
