// src/core/service_client.rs
//! Bearer-authenticated HTTP client for the job-matching backend

use anyhow::Context;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, trace};

use crate::core::config_manager::ServiceConfig;
use crate::error::{ClientError, ClientResult};

pub const RESUMES_ENDPOINT: &str = "/api/resumes";
pub const JOB_SEARCH_ENDPOINT: &str = "/api/jobs/search";

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// How a non-success response is reported: the error variant and the
/// message used when the body carries no `detail`.
#[derive(Clone, Copy)]
pub struct Failure {
    wrap: fn(String) -> ClientError,
    fallback: &'static str,
}

impl Failure {
    pub const UPLOAD: Failure = Failure {
        wrap: ClientError::Upload,
        fallback: "Upload failed",
    };
    pub const LIST: Failure = Failure {
        wrap: ClientError::Fetch,
        fallback: "Failed to load resumes",
    };
    pub const DETAIL: Failure = Failure {
        wrap: ClientError::Fetch,
        fallback: "Failed to load resume",
    };
    pub const DELETE: Failure = Failure {
        wrap: ClientError::Delete,
        fallback: "Failed to delete resume",
    };
    pub const SEARCH: Failure = Failure {
        wrap: ClientError::Search,
        fallback: "Search failed",
    };

    fn into_error(self, detail: Option<String>) -> ClientError {
        (self.wrap)(detail.unwrap_or_else(|| self.fallback.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(config: &ServiceConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> ClientResult<Url> {
        let raw = format!("{}{}", self.base_url, endpoint);
        Url::parse(&raw).map_err(|e| ClientError::Network(format!("Invalid URL {}: {}", raw, e)))
    }

    /// `endpoint/{id}` with `id` percent-encoded as one path segment, so a
    /// `/` or `?` in an id cannot reach another route.
    pub fn item_url(&self, endpoint: &str, id: &str) -> ClientResult<Url> {
        let mut url = self.url(endpoint)?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Network(format!("Base URL cannot have a path: {}", self.base_url))
            })?
            .push(id);
        Ok(url)
    }

    pub async fn get_json<R>(&self, url: Url, token: &str, failure: Failure) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        info!("GET {}", url);
        self.dispatch(self.client.get(url).bearer_auth(token), failure)
            .await
    }

    pub async fn post_json<T, R>(
        &self,
        url: Url,
        token: &str,
        payload: &T,
        failure: Failure,
    ) -> ClientResult<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        info!("POST {}", url);
        self.dispatch(
            self.client.post(url).bearer_auth(token).json(payload),
            failure,
        )
        .await
    }

    /// Sends a PDF as the `file` part of a multipart form.
    pub async fn post_pdf<R>(
        &self,
        url: Url,
        token: &str,
        file_name: &str,
        content: Vec<u8>,
        failure: Failure,
    ) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(PDF_CONTENT_TYPE)
            .map_err(|e| ClientError::Upload(format!("Failed to create multipart: {}", e)))?;
        let form = Form::new().part("file", part);

        info!("POST {} (multipart, file={})", url, file_name);
        self.dispatch(
            self.client.post(url).bearer_auth(token).multipart(form),
            failure,
        )
        .await
    }

    /// DELETE returns whatever acknowledgement the backend chooses, so the
    /// body is handed back untyped. An empty body reads as `null`.
    pub async fn delete(&self, url: Url, token: &str, failure: Failure) -> ClientResult<Value> {
        info!("DELETE {}", url);
        self.dispatch(self.client.delete(url).bearer_auth(token), failure)
            .await
    }

    async fn dispatch<R>(&self, request: RequestBuilder, failure: Failure) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        trace!("Response status: {}", status);

        let body = response.text().await?;

        if status.is_success() {
            let body = if body.trim().is_empty() { "null" } else { body.as_str() };
            serde_json::from_str(body).map_err(|e| {
                error!("Failed to parse response body: {}", e);
                ClientError::InvalidResponse(e.to_string())
            })
        } else {
            let detail = extract_detail(&body);
            error!(
                "Backend returned {}: {}",
                status,
                detail.as_deref().unwrap_or(&body)
            );
            if status == StatusCode::UNAUTHORIZED {
                return Err(ClientError::Auth(
                    detail.unwrap_or_else(|| "Authentication failed".to_string()),
                ));
            }
            Err(failure.into_error(detail))
        }
    }
}

/// Pulls the user-facing message out of an error body. FastAPI sends either
/// `{"detail": "..."}` or, for request validation, a list of `{"msg": ...}`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
