use std::io::Cursor;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::raw_face::{
    BoolAttribute, EmotionScore, GazeDirection, Pose, RawFace,
};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum HttpDetectError {
    #[error("failed to encode frame {index} as JPEG: {source}")]
    Encode {
        index: usize,
        #[source]
        source: image::ImageError,
    },
    #[error("frame {index} has invalid dimensions")]
    InvalidFrame { index: usize },
    #[error("detector request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("detector returned HTTP {0}")]
    Status(u16),
}

/// Detector adapter speaking a DetectFaces-style JSON contract over HTTP.
///
/// Each call posts one JPEG-encoded frame and parses the `FaceDetails`
/// array of the response. The service is asked for all attributes via
/// the `attributes=ALL` query parameter.
pub struct HttpFaceDetector {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpFaceDetector {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, HttpDetectError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>, HttpDetectError> {
        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or(HttpDetectError::InvalidFrame {
                index: frame.index(),
            })?;
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .map_err(|source| HttpDetectError::Encode {
                index: frame.index(),
                source,
            })?;
        Ok(buf)
    }
}

impl FaceDetector for HttpFaceDetector {
    fn detect(
        &self,
        frame: &Frame,
    ) -> Result<Vec<RawFace>, Box<dyn std::error::Error + Send + Sync>> {
        let body = Self::encode_jpeg(frame)?;

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("attributes", "ALL")])
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(body)
            .send()
            .map_err(HttpDetectError::Request)?;

        if !response.status().is_success() {
            return Err(Box::new(HttpDetectError::Status(response.status().as_u16())));
        }

        let parsed: DetectFacesResponse = response.json().map_err(HttpDetectError::Request)?;
        Ok(parsed.face_details.into_iter().map(RawFace::from).collect())
    }
}

// Wire types. Field names follow the detector's PascalCase JSON; missing
// fields deserialize to None / empty rather than failing the frame.

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectFacesResponse {
    #[serde(default)]
    face_details: Vec<WireFace>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct WireFace {
    #[serde(default)]
    emotions: Vec<WireEmotion>,
    eye_direction: Option<WireGaze>,
    eyes_open: Option<WireBool>,
    mouth_open: Option<WireBool>,
    face_occluded: Option<WireBool>,
    smile: Option<WireBool>,
    pose: Option<WirePose>,
    bounding_box: Option<WireBoundingBox>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireEmotion {
    #[serde(default)]
    r#type: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireGaze {
    #[serde(default)]
    yaw: f64,
    #[serde(default)]
    confidence: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireBool {
    value: Option<bool>,
    #[serde(default)]
    confidence: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WirePose {
    #[serde(default)]
    yaw: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireBoundingBox {
    #[serde(default)]
    left: f64,
    #[serde(default)]
    top: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

impl From<WireFace> for RawFace {
    fn from(wire: WireFace) -> Self {
        RawFace {
            emotions: wire
                .emotions
                .into_iter()
                .map(|e| EmotionScore {
                    label: e.r#type,
                    confidence: e.confidence,
                })
                .collect(),
            eye_direction: wire.eye_direction.map(|g| GazeDirection {
                yaw: g.yaw,
                confidence: g.confidence,
            }),
            eyes_open: wire.eyes_open.map(WireBool::into),
            mouth_open: wire.mouth_open.map(WireBool::into),
            face_occluded: wire.face_occluded.map(WireBool::into),
            smile: wire.smile.map(WireBool::into),
            pose: wire.pose.map(|p| Pose { yaw: p.yaw }),
            bounding_box: wire
                .bounding_box
                .map(|b| BoundingBox::new(b.left, b.top, b.width, b.height)),
        }
    }
}

impl From<WireBool> for BoolAttribute {
    fn from(wire: WireBool) -> Self {
        BoolAttribute {
            value: wire.value,
            confidence: wire.confidence,
        }
    }
}
