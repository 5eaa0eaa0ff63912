// src/jobs.rs
//! Job search client for `/api/jobs/search`

use tracing::{info, warn};

use crate::core::service_client::{Failure, JOB_SEARCH_ENDPOINT};
use crate::core::ServiceClient;
use crate::error::ClientResult;
use crate::session::SessionContext;
use crate::types::{JobSearchRequest, JobSearchResponse};

pub struct JobSearchClient {
    api: ServiceClient,
}

impl JobSearchClient {
    pub fn new(api: ServiceClient) -> Self {
        Self { api }
    }

    /// Validate the parameters locally, then issue a single search. The
    /// title check runs before the session is consulted.
    pub async fn search(
        &self,
        session: &SessionContext,
        title: &str,
        location: &str,
        resume_id: Option<&str>,
    ) -> ClientResult<JobSearchResponse> {
        let request = JobSearchRequest::new(title, location, resume_id)?;
        self.submit(session, &request).await
    }

    /// Issue an already-validated request.
    pub async fn submit(
        &self,
        session: &SessionContext,
        request: &JobSearchRequest,
    ) -> ClientResult<JobSearchResponse> {
        let token = session.bearer()?;
        info!(
            "Searching jobs: title={:?} location={:?} resume={:?}",
            request.title, request.location, request.resume_id
        );

        let response: JobSearchResponse = self
            .api
            .post_json(
                self.api.url(JOB_SEARCH_ENDPOINT)?,
                token,
                request,
                Failure::SEARCH,
            )
            .await?;

        if !response.data.is_consistent() {
            warn!(
                "Search response reports {} analyzed out of {} searched",
                response.data.analyzed, response.data.total_searched
            );
        }
        info!(
            "Search returned {} jobs ({} searched, {} analyzed)",
            response.data.jobs.len(),
            response.data.total_searched,
            response.data.analyzed
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config_manager::ServiceConfig;
    use crate::error::{ClientError, ValidationError};

    fn unreachable_client() -> JobSearchClient {
        let api = ServiceClient::new(&ServiceConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: Some(5),
        })
        .unwrap();
        JobSearchClient::new(api)
    }

    #[tokio::test]
    async fn test_empty_title_fails_locally() {
        let client = unreachable_client();
        let result = client
            .search(&SessionContext::anonymous(), "", "NYC", None)
            .await;
        assert!(matches!(
            result,
            Err(ClientError::Validation(ValidationError::EmptyTitle))
        ));
    }

    #[tokio::test]
    async fn test_valid_title_without_session_fails_with_auth() {
        let client = unreachable_client();
        let result = client
            .search(&SessionContext::anonymous(), "Engineer", "", None)
            .await;
        assert!(matches!(result, Err(ClientError::Auth(_))));
    }
}
