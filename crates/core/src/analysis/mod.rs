pub mod aggregator;
pub mod distraction;
pub mod face_attributes;
pub mod frame_analyzer;
pub mod identity_tracker;
pub mod role_separator;
pub mod summary;
