// src/auth.rs
//! Identity provider client (Supabase GoTrue REST) and credential validation

use anyhow::Context;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::core::config_manager::IdentityConfig;
use crate::error::{ClientError, ClientResult, ValidationError};
use crate::session::{Session, SessionUser};

const MIN_PASSWORD_LEN: usize = 6;
const ACCOUNT_EXISTS_PHRASE: &str = "already registered";

pub fn validate_sign_in(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_registration(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if email.is_empty() || password.is_empty() || confirm_password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::WeakPassword);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Maps a provider sign-up failure. Only the exact, case-sensitive phrase
/// "already registered" is treated as an existing account.
pub fn classify_sign_up_error(message: &str) -> ClientError {
    if message.contains(ACCOUNT_EXISTS_PHRASE) {
        ClientError::AccountExists
    } else {
        ClientError::Registration(message.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The provider issued a session straight away.
    SignedIn(Session),
    /// The account exists but the email must be confirmed before sign-in.
    ConfirmationRequired { email: String },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: ProviderUser,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: SessionUser {
                id: token.user.id,
                email: token.user.email,
            },
            expires_at: token
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// Provider error bodies use several field names depending on the endpoint.
fn provider_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|field| value.get(*field).and_then(Value::as_str))
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

pub struct AuthClient {
    client: reqwest::Client,
    auth_url: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(config: &IdentityConfig) -> anyhow::Result<Self> {
        let auth_url = config
            .auth_url
            .clone()
            .context("Identity provider URL not configured (set SUPABASE_URL or JOBMATCH_AUTH_URL)")?;
        let anon_key = config
            .anon_key
            .clone()
            .context("Identity provider key not configured (set SUPABASE_KEY or JOBMATCH_AUTH_KEY)")?;

        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
        validate_sign_in(email, password)?;

        let url = format!("{}/auth/v1/token?grant_type=password", self.auth_url);
        info!("Signing in {}", email);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message =
                provider_message(&body).unwrap_or_else(|| "Invalid email or password".to_string());
            warn!("Sign-in rejected ({}): {}", status, message);
            return Err(ClientError::LoginFailed(message));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(token.into())
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> ClientResult<RegisterOutcome> {
        validate_registration(email, password, confirm_password)?;

        let url = format!("{}/auth/v1/signup", self.auth_url);
        info!("Registering {}", email);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message =
                provider_message(&body).unwrap_or_else(|| "Something went wrong".to_string());
            error!("Registration failed ({}): {}", status, message);
            return Err(classify_sign_up_error(&message));
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if value.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(value)
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
            Ok(RegisterOutcome::SignedIn(token.into()))
        } else {
            Ok(RegisterOutcome::ConfirmationRequired {
                email: email.to_string(),
            })
        }
    }

    /// Revoke the session at the provider. Local teardown happens regardless
    /// of the outcome, so failures are only logged.
    pub async fn sign_out(&self, session: &Session) {
        let url = format!("{}/auth/v1/logout", self.auth_url);
        let result = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!("Signed out user {}", session.user.id)
            }
            Ok(response) => warn!("Provider sign-out returned {}", response.status()),
            Err(e) => warn!("Provider sign-out failed: {}", e),
        }
    }
}
