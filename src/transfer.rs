//! Drag-transfer payloads.
//!
//! A catalog card hands a course to a plan cell as a serialized copy keyed by
//! a media type. The receiving side never fails: an absent, mistyped or
//! malformed payload simply decodes to nothing.

use serde::{Deserialize, Serialize};

use crate::models::Course;

/// Media type under which a course is carried.
pub const COURSE_MEDIA_TYPE: &str = "application/json";

/// A serialized record travelling between two UI regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPayload {
    pub media_type: String,
    pub body: String,
}

impl TransferPayload {
    pub fn new(media_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            body: body.into(),
        }
    }
}

/// Serialize a course for a drag start.
pub fn encode(course: &Course) -> serde_json::Result<TransferPayload> {
    Ok(TransferPayload::new(
        COURSE_MEDIA_TYPE,
        serde_json::to_string(course)?,
    ))
}

/// Recover the course carried by a drop, if any.
pub fn decode(payload: Option<&TransferPayload>) -> Option<Course> {
    let payload = payload?;

    // Browsers may append parameters such as `; charset=utf-8`.
    let essence = payload.media_type.split(';').next().unwrap_or("").trim();
    if !essence.eq_ignore_ascii_case(COURSE_MEDIA_TYPE) {
        tracing::debug!(media_type = %payload.media_type, "Ignoring drop with foreign media type");
        return None;
    }
    if payload.body.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<Course>(&payload.body) {
        Ok(mut course) => {
            course.course_id = course.course_id.trim().to_string();
            Some(course)
        }
        Err(e) => {
            tracing::debug!("Ignoring malformed drop payload: {}", e);
            None
        }
    }
}
