// src/collections.rs
//! Client-owned state: saved and applied jobs, search history and the
//! selected resume, persisted as one JSON document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use crate::core::FsOps;
use crate::error::{ClientError, ClientResult, ValidationError};
use crate::types::{JobResult, JobSearchRequest};

pub const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub id: Uuid,
    pub job_title: String,
    pub location: String,
    pub searched_at: DateTime<Utc>,
}

impl SearchHistoryEntry {
    /// Replay the stored parameters as a new request.
    pub fn to_request(&self, resume_id: Option<&str>) -> Result<JobSearchRequest, ValidationError> {
        JobSearchRequest::new(&self.job_title, &self.location, resume_id)
    }
}

/// A search result together with the key it is saved and applied under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RememberedJob {
    pub key: String,
    pub job: JobResult,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalCollections {
    #[serde(default)]
    saved: Vec<String>,
    #[serde(default)]
    applied: Vec<String>,
    /// Last-seen results, keyed by job key, so saved and applied jobs can
    /// be shown without repeating the search.
    #[serde(default)]
    jobs: BTreeMap<String, JobResult>,
    /// The most recent search results, in backend order.
    #[serde(default)]
    last_results: Vec<RememberedJob>,
    /// Newest first.
    #[serde(default)]
    history: Vec<SearchHistoryEntry>,
    #[serde(default)]
    selected_resume: Option<String>,
}

impl LocalCollections {
    /// Returns `true` when the key was not saved before.
    pub fn add_saved(&mut self, key: &str) -> bool {
        insert_unique(&mut self.saved, key)
    }

    /// Returns `true` when the key was not marked applied before.
    pub fn add_applied(&mut self, key: &str) -> bool {
        insert_unique(&mut self.applied, key)
    }

    /// Flip the saved flag; returns whether the job is now saved.
    pub fn toggle_saved(&mut self, key: &str) -> bool {
        if let Some(pos) = self.saved.iter().position(|k| k == key) {
            self.saved.remove(pos);
            false
        } else {
            self.saved.push(key.to_string());
            true
        }
    }

    pub fn is_saved(&self, key: &str) -> bool {
        self.saved.iter().any(|k| k == key)
    }

    pub fn is_applied(&self, key: &str) -> bool {
        self.applied.iter().any(|k| k == key)
    }

    pub fn saved(&self) -> &[String] {
        &self.saved
    }

    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    /// Replace the result catalog with `jobs`, keeping entries that are
    /// still saved or applied. Results sharing a key within one search get
    /// a `#n` suffix so each posting stays addressable.
    pub fn remember_jobs(&mut self, jobs: &[JobResult]) {
        let saved = &self.saved;
        let applied = &self.applied;
        self.jobs
            .retain(|key, _| saved.contains(key) || applied.contains(key));

        self.last_results.clear();
        let mut used = BTreeSet::new();
        for job in jobs {
            let key = unique_key(&job.key(), &used);
            used.insert(key.clone());
            self.jobs.insert(key.clone(), job.clone());
            self.last_results.push(RememberedJob {
                key,
                job: job.clone(),
            });
        }
    }

    /// Results of the most recent search, in backend order.
    pub fn last_results(&self) -> &[RememberedJob] {
        &self.last_results
    }

    pub fn job(&self, key: &str) -> Option<&JobResult> {
        self.jobs.get(key)
    }

    /// Look a job up by its 1-based position in the last results, or by key.
    /// Returns the key the job is stored under.
    pub fn resolve_job(&self, reference: &str) -> Option<(&str, &JobResult)> {
        if let Ok(index) = reference.parse::<usize>() {
            if let Some(entry) = index.checked_sub(1).and_then(|i| self.last_results.get(i)) {
                return Some((entry.key.as_str(), &entry.job));
            }
        }
        self.jobs
            .get_key_value(reference)
            .map(|(key, job)| (key.as_str(), job))
    }

    pub fn record_search(&mut self, request: &JobSearchRequest) -> &SearchHistoryEntry {
        self.record_search_at(request, Utc::now())
    }

    pub fn record_search_at(
        &mut self,
        request: &JobSearchRequest,
        now: DateTime<Utc>,
    ) -> &SearchHistoryEntry {
        let entry = SearchHistoryEntry {
            id: Uuid::new_v4(),
            job_title: request.title.clone(),
            location: request.location.clone(),
            searched_at: now,
        };
        debug!("Recording search {:?} in {:?}", entry.job_title, entry.location);
        self.history.insert(0, entry);
        self.history.truncate(HISTORY_LIMIT);
        &self.history[0]
    }

    pub fn history(&self) -> &[SearchHistoryEntry] {
        &self.history
    }

    pub fn recent_searches(&self, limit: usize) -> &[SearchHistoryEntry] {
        &self.history[..limit.min(self.history.len())]
    }

    /// Find a history entry by full id or unambiguous id prefix.
    pub fn history_entry(&self, id: &str) -> Option<&SearchHistoryEntry> {
        let mut matches = self
            .history
            .iter()
            .filter(|entry| entry.id.to_string().starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Some(entry),
            _ => None,
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn selected_resume(&self) -> Option<&str> {
        self.selected_resume.as_deref()
    }

    pub fn select_resume(&mut self, id: Option<String>) {
        self.selected_resume = id;
    }

    /// Drop the selection if it points at `id`. Returns whether it did.
    pub fn forget_resume(&mut self, id: &str) -> bool {
        if self.selected_resume.as_deref() == Some(id) {
            self.selected_resume = None;
            true
        } else {
            false
        }
    }
}

fn unique_key(base: &str, used: &BTreeSet<String>) -> String {
    if !used.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}#{}", base, n))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn insert_unique(list: &mut Vec<String>, key: &str) -> bool {
    if list.iter().any(|k| k == key) {
        false
    } else {
        list.push(key.to_string());
        true
    }
}

/// `state.json` under the data directory.
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn load(&self) -> ClientResult<LocalCollections> {
        let state = FsOps::read_json(&self.path)
            .await
            .map_err(|e| ClientError::Storage(format!("{:#}", e)))?;
        Ok(state.unwrap_or_default())
    }

    pub async fn save(&self, state: &LocalCollections) -> ClientResult<()> {
        FsOps::write_json(&self.path, state)
            .await
            .map_err(|e| ClientError::Storage(format!("{:#}", e)))
    }
}
