pub mod http_face_detector;
