use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use lectern_core::analysis::summary::Summary;

pub const CSV_HEADER: &str = "timestamp,personId,role,emotion,emotionConfidence,eyeDirection,eyesOpen,mouthOpen,smile,poseYaw,distracted,distractionReason";

/// Writes the five result artifacts into `out_dir` (created if missing):
/// per-observation CSV, per-person emotion frequencies, per-person
/// distraction summary, speaking ratio, and audience emotion balance.
pub fn write_artifacts(summary: &Summary, out_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(out_dir)?;

    fs::write(out_dir.join("emotion_data.csv"), observations_csv(summary))?;
    fs::write(
        out_dir.join("emotion_frequencies.json"),
        serde_json::to_string_pretty(&summary.emotion_counts)?,
    )?;
    fs::write(
        out_dir.join("audience_distraction.json"),
        serde_json::to_string_pretty(&summary.distraction)?,
    )?;
    fs::write(
        out_dir.join("speaking_ratio.json"),
        serde_json::to_string_pretty(&summary.speaking)?,
    )?;
    fs::write(
        out_dir.join("audience_emotion_balance.json"),
        serde_json::to_string_pretty(&summary.audience_balance)?,
    )?;

    Ok(())
}

fn observations_csv(summary: &Summary) -> String {
    let mut csv = String::from(CSV_HEADER);
    for obs in &summary.observations {
        let _ = write!(
            csv,
            "\n{},{},{},{},{},{},{},{},{},{},{},{}",
            obs.frame_index,
            obs.person_id,
            obs.role,
            csv_field(&obs.emotion),
            obs.emotion_confidence,
            obs.eye_direction,
            tri_state(obs.eyes_open),
            tri_state(obs.mouth_open),
            tri_state(obs.smile),
            obs.pose_yaw,
            obs.distracted,
            obs.distraction_reason
                .map(|r| r.to_string())
                .unwrap_or_default(),
        );
    }
    csv.push('\n');
    csv
}

/// Quotes a field if it contains a delimiter, quote, or newline. The
/// emotion label comes verbatim from the detection service, so it is the
/// one field this crate does not control.
fn csv_field(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        std::borrow::Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        std::borrow::Cow::Borrowed(value)
    }
}

/// Unknown booleans render as an empty field, not as a third literal.
fn tri_state(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "true",
        Some(false) => "false",
        None => "",
    }
}
