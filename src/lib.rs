//! Client for the job-matching backend: resume storage, AI-scored job
//! search, the signed-in session, and the locally kept saved/applied jobs
//! and search history.

pub mod auth;
pub mod cli;
pub mod collections;
pub mod core;
pub mod error;
pub mod jobs;
pub mod resumes;
pub mod session;
pub mod types;
pub mod view_model;

pub use crate::auth::{AuthClient, RegisterOutcome};
pub use crate::collections::{LocalCollections, LocalStore, SearchHistoryEntry};
pub use crate::core::{ConfigManager, ServiceClient};
pub use crate::error::{ClientError, ClientResult, ValidationError};
pub use crate::jobs::JobSearchClient;
pub use crate::resumes::{FileSource, PickedFile, ResumeRepository, MAX_UPLOAD_BYTES};
pub use crate::session::{Session, SessionContext, SessionUser};
pub use crate::view_model::{initials, Alert, JobView, MatchTier};
