// src/session.rs
//! Session context: the signed-in identity and its bearer credential.
//!
//! A `SessionContext` is created once at startup (`load`), replaced on
//! sign-in (`establish`) and cleared on sign-out (`teardown`). Every backend
//! call takes it by reference and asks it for the bearer token.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::core::FsOps;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: SessionUser,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Claims read from the access token for display and expiry checks only.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub exp: Option<i64>,
}

/// Decode the token payload without verifying the signature; the backend is
/// the verifier.
pub fn peek_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            debug!("Access token is not a readable JWT: {}", e);
            None
        }
    }
}

impl Session {
    /// Earliest of the stored expiry and the token's `exp` claim.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        let claim = peek_claims(&self.access_token)
            .and_then(|claims| claims.exp)
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single());

        match (self.expires_at, claim) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry().map(|expiry| expiry <= now).unwrap_or(false)
    }
}

#[derive(Debug, Default)]
pub struct SessionContext {
    session: Option<Session>,
    path: Option<PathBuf>,
}

impl SessionContext {
    /// A context with no session and no backing file.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An in-memory context holding `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
            path: None,
        }
    }

    /// Restore the session persisted at `path`, if any.
    pub async fn load(path: PathBuf) -> ClientResult<Self> {
        let session: Option<Session> = FsOps::read_json(&path)
            .await
            .map_err(|e| ClientError::Storage(format!("{:#}", e)))?;

        match &session {
            Some(s) => info!("Restored session for user {}", s.user.id),
            None => debug!("No stored session at {}", path.display()),
        }

        Ok(Self {
            session,
            path: Some(path),
        })
    }

    /// Install a freshly issued session, persisting it when file-backed.
    pub async fn establish(&mut self, session: Session) -> ClientResult<()> {
        if let Some(path) = &self.path {
            FsOps::write_json(path, &session)
                .await
                .map_err(|e| ClientError::Storage(format!("{:#}", e)))?;
        }
        info!("Session established for user {}", session.user.id);
        self.session = Some(session);
        Ok(())
    }

    /// Clear the session and its file. Returns the session that was active.
    pub async fn teardown(&mut self) -> ClientResult<Option<Session>> {
        if let Some(path) = &self.path {
            FsOps::remove_file_if_exists(path)
                .await
                .map_err(|e| ClientError::Storage(format!("{:#}", e)))?;
        }
        let previous = self.session.take();
        if let Some(s) = &previous {
            info!("Session cleared for user {}", s.user.id);
        }
        Ok(previous)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_ok()
    }

    /// The bearer token for the next request.
    pub fn bearer(&self) -> ClientResult<&str> {
        self.bearer_at(Utc::now())
    }

    pub fn bearer_at(&self, now: DateTime<Utc>) -> ClientResult<&str> {
        let session = self.session.as_ref().ok_or_else(ClientError::not_signed_in)?;

        if session.access_token.trim().is_empty() {
            return Err(ClientError::not_signed_in());
        }
        if session.is_expired_at(now) {
            warn!("Access token for user {} has expired", session.user.id);
            return Err(ClientError::Auth(
                "Token has expired. Please login again.".to_string(),
            ));
        }

        Ok(&session.access_token)
    }
}
