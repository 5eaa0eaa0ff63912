// src/view_model.rs
//! Display derivations over resumes, job results and errors. Pure functions,
//! no I/O.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ClientError;
use crate::types::{Guidance, JobResult, ResumeRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Excellent,
    Good,
    Partial,
}

impl MatchTier {
    /// Tier for a raw backend score. Bounds are inclusive and compared
    /// before any rounding, so 79.6 is still good. NaN is partial.
    pub fn from_match_score(score: f64) -> Self {
        if score >= 80.0 {
            MatchTier::Excellent
        } else if score >= 60.0 {
            MatchTier::Good
        } else {
            MatchTier::Partial
        }
    }

    /// Lower bounds are inclusive: 80 is excellent, 60 is good.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => MatchTier::Excellent,
            60..=79 => MatchTier::Good,
            _ => MatchTier::Partial,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MatchTier::Excellent => "excellent",
            MatchTier::Good => "good",
            MatchTier::Partial => "partial",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchTier::Excellent => "Excellent Match",
            MatchTier::Good => "Good Match",
            MatchTier::Partial => "Partial Match",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            MatchTier::Excellent => "#10B981",
            MatchTier::Good => "#F59E0B",
            MatchTier::Partial => "#EF4444",
        }
    }

    pub fn background_color(self) -> &'static str {
        match self {
            MatchTier::Excellent => "#D1FAE5",
            MatchTier::Good => "#FEF3C7",
            MatchTier::Partial => "#FEE2E2",
        }
    }
}

/// First letter of each word, uppercased, at most two characters.
pub fn initials(name: &str) -> String {
    let joined: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect();
    joined.to_uppercase().chars().take(2).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillChip {
    pub name: String,
    pub met: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImprovementTip {
    pub qualification: String,
    pub description: String,
    pub link: String,
    pub steps: String,
}

impl ImprovementTip {
    fn new(qualification: &str, guidance: &Guidance) -> Self {
        Self {
            qualification: qualification.to_string(),
            description: guidance.description.clone(),
            link: guidance.link.clone(),
            steps: guidance.steps.clone(),
        }
    }
}

/// Everything a job card or detail view shows, derived from one result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub key: String,
    pub title: String,
    pub company: String,
    pub company_initials: String,
    pub location: String,
    pub description: String,
    pub score: u8,
    pub tier: MatchTier,
    pub qualifies: bool,
    pub skills: Vec<SkillChip>,
    pub tips: Vec<ImprovementTip>,
    pub apply_link: String,
}

impl JobView {
    /// View of a job stored under `key`, which may differ from
    /// `JobResult::key` when a search returned several postings with the
    /// same link.
    pub fn keyed(job: &JobResult, key: &str) -> Self {
        Self {
            key: key.to_string(),
            title: job.title.clone(),
            company: job.company.clone(),
            company_initials: initials(&job.company),
            location: job.location.clone(),
            description: job.description.clone(),
            score: job.score(),
            tier: MatchTier::from_match_score(job.match_score),
            qualifies: job.qualifies,
            skills: skill_chips(job),
            tips: improvement_tips(job),
            apply_link: job.apply_link.clone(),
        }
    }
}

impl From<&JobResult> for JobView {
    fn from(job: &JobResult) -> Self {
        JobView::keyed(job, &job.key())
    }
}

/// Met skills first, then missing ones, each in backend order.
pub fn skill_chips(job: &JobResult) -> Vec<SkillChip> {
    let met = job.met_qualifications.iter().map(|name| SkillChip {
        name: name.clone(),
        met: true,
    });
    let missing = job.missing_qualifications.iter().map(|name| SkillChip {
        name: name.clone(),
        met: false,
    });
    met.chain(missing).collect()
}

/// Guidance for missing qualifications in the order they are listed, then
/// any other guidance entries by name.
pub fn improvement_tips(job: &JobResult) -> Vec<ImprovementTip> {
    let mut tips: Vec<ImprovementTip> = job
        .missing_qualifications
        .iter()
        .filter_map(|name| job.guidance.get(name).map(|g| ImprovementTip::new(name, g)))
        .collect();

    for (name, guidance) in &job.guidance {
        if !job.missing_qualifications.contains(name) {
            tips.push(ImprovementTip::new(name, guidance));
        }
    }
    tips
}

pub fn format_file_size(bytes: u64) -> String {
    format!("{} KB", (bytes as f64 / 1024.0).round() as u64)
}

pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// "Jan 5, 2024 • 51 KB"; the raw timestamp is shown if it cannot be parsed.
pub fn resume_subtitle(record: &ResumeRecord) -> String {
    let date = record
        .created_at_utc()
        .map(format_date)
        .unwrap_or_else(|| record.created_at.clone());
    format!("{} • {}", date, format_file_size(record.file_size))
}

pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let (count, unit) = match seconds {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 604_800 => (s / 86_400, "day"),
        s if s < 2_592_000 => (s / 604_800, "week"),
        s if s < 31_536_000 => (s / 2_592_000, "month"),
        s => (s / 31_536_000, "year"),
    };

    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Title and message for showing an error to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl From<&ClientError> for Alert {
    fn from(err: &ClientError) -> Self {
        let title = match err {
            ClientError::Validation(v) => v.title(),
            ClientError::Auth(_) => "Authentication Required",
            ClientError::LoginFailed(_) => "Login Failed",
            ClientError::Upload(_) => "Upload Failed",
            ClientError::Fetch(_) | ClientError::Delete(_) => "Error",
            ClientError::Search(_) => "Search Failed",
            ClientError::Network(_) => "Network Error",
            ClientError::InvalidResponse(_) | ClientError::Storage(_) => "Error",
            ClientError::AccountExists => "Account Exists",
            ClientError::Registration(_) => "Registration Failed",
        };
        Self {
            title: title.to_string(),
            message: err.to_string(),
        }
    }
}
