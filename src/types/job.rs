// src/types/job.rs
//! Job search wire types for `/api/jobs/search`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;

pub const ANY_LOCATION: &str = "Any Location";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSearchRequest {
    pub title: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
}

impl JobSearchRequest {
    /// Trims both fields, rejects an empty title and substitutes
    /// `"Any Location"` for a blank location.
    pub fn new(
        title: &str,
        location: &str,
        resume_id: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let location = match location.trim() {
            "" => ANY_LOCATION,
            trimmed => trimmed,
        };

        Ok(Self {
            title: title.to_string(),
            location: location.to_string(),
            resume_id: resume_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        })
    }
}

/// Remediation advice for one missing qualification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub steps: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub match_score: f64,
    #[serde(default)]
    pub qualifies: bool,
    #[serde(default)]
    pub met_qualifications: Vec<String>,
    #[serde(default)]
    pub missing_qualifications: Vec<String>,
    #[serde(default)]
    pub guidance: BTreeMap<String, Guidance>,
    #[serde(default)]
    pub apply_link: String,
}

impl JobResult {
    /// Match score rounded and clamped to 0..=100.
    pub fn score(&self) -> u8 {
        if self.match_score.is_nan() {
            return 0;
        }
        self.match_score.round().clamp(0.0, 100.0) as u8
    }

    /// Stable key for saving and applying. Search results carry no id, so
    /// the apply link is used when present, otherwise title, company and
    /// location.
    pub fn key(&self) -> String {
        let link = self.apply_link.trim();
        if !link.is_empty() {
            return link.to_string();
        }
        format!(
            "{}|{}|{}",
            self.title.trim(),
            self.company.trim(),
            self.location.trim()
        )
        .to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSearchData {
    #[serde(default)]
    pub jobs: Vec<JobResult>,
    #[serde(default)]
    pub total_searched: u32,
    #[serde(default)]
    pub analyzed: u32,
}

impl JobSearchData {
    pub fn is_consistent(&self) -> bool {
        self.analyzed <= self.total_searched
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSearchResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: JobSearchData,
}
