// src/types/resume.rs
//! Resume records as returned by `/api/resumes`

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resume stored by the backend. List and upload responses carry only the
/// metadata; the detail endpoint adds `parsed_text` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: String,
    pub filename: String,
    pub file_size: u64,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ResumeRecord {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }
}

/// Acknowledgement of a delete call. The backend currently answers
/// `{"success": true, "message": "..."}` but the shape is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAck {
    pub success: bool,
    pub message: Option<String>,
}

impl From<serde_json::Value> for DeleteAck {
    fn from(value: serde_json::Value) -> Self {
        Self {
            success: value
                .get("success")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(true),
            message: value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Backend timestamps are ISO-8601, with or without an offset.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
