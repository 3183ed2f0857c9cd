//! Talent Match backend HTTP client.
//!
//! The credential is bound to a client value rather than looked up per
//! request. [`ApiClient::with_credential`] returns a client that attaches
//! `Authorization: Bearer <token>` to every call; [`ApiClient::anonymous`]
//! returns one that sends no credential and leaves rejection to the backend.
//!
//! No retries and no request timeout: a failed call surfaces as one
//! [`ClientError`] and the caller decides what to show.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info_span, Instrument};
use url::Url;

use talent_models::{
    CandidateMatch, Credential, Job, JobId, JobUpdate, LoginRequest, NewJob, Profile,
    RegisterRequest, ResumeFile, TokenResponse,
};

use crate::error::{ClientError, ClientResult};
use crate::metrics::record_request;
use crate::types::UploadAck;

/// Backend location used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend
    pub base_url: String,
    /// TCP connect timeout (there is no overall request timeout)
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Config pointing at a specific backend.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("TALENT_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("TALENT_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for the Talent Match backend API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    credential: Option<Credential>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.credential.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a new anonymous client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let base_url = normalize_base_url(&config.base_url)?;

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("talent-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            http,
            base_url,
            credential: None,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Same backend and connection pool, bearing `credential` on every request.
    pub fn with_credential(&self, credential: Credential) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            credential: Some(credential),
        }
    }

    /// Same backend and connection pool, without a credential.
    pub fn anonymous(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            credential: None,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Create an account. The backend's response carries no session data and
    /// is not inspected beyond its status.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        let path = "/register";
        self.execute("register", path, async {
            let response = self.request(Method::POST, path)?.json(request).send().await?;
            Self::expect_success(response).await
        })
        .await
    }

    /// Exchange username/password for a bearer token (form-urlencoded body).
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<TokenResponse> {
        let path = "/token";
        self.execute("login", path, async {
            let response = self
                .request(Method::POST, path)?
                .form(&[
                    ("username", request.username.as_str()),
                    ("password", request.password.as_str()),
                ])
                .send()
                .await?;
            let reply: Reply<TokenResponse> = Self::read_json(response).await?;
            if reply.value.access_token.trim().is_empty() {
                return Err(ClientError::invalid_response("empty access_token"));
            }
            Ok(reply)
        })
        .await
    }

    // =========================================================================
    // User
    // =========================================================================

    /// Fetch the profile of the credential's owner.
    pub async fn get_profile(&self) -> ClientResult<Profile> {
        let path = "/user/profile";
        self.execute("get_profile", path, async {
            let response = self.request(Method::GET, path)?.send().await?;
            Self::read_json(response).await
        })
        .await
    }

    /// Upload a resume from disk.
    pub async fn upload_resume(&self, resume: &ResumeFile) -> ClientResult<UploadAck> {
        let bytes = tokio::fs::read(resume.path()).await?;
        self.upload_resume_bytes(resume.file_name(), bytes).await
    }

    /// Upload resume bytes as multipart field `file`.
    pub async fn upload_resume_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<UploadAck> {
        let path = "/user/upload";
        debug!(file_name, size = bytes.len(), "Uploading resume");

        self.execute("upload_resume", path, async {
            let part = Part::bytes(bytes)
                .file_name(file_name.to_string())
                .mime_str("application/pdf")?;
            let form = Form::new().part("file", part);

            let response = self.request(Method::POST, path)?.multipart(form).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Self::error_from_response(response).await);
            }

            let body = response.text().await?;
            let ack = UploadAck::from_body(&body)
                .map_err(|e| ClientError::invalid_response(format!("upload ack: {}", e)))?;
            match ack.error {
                Some(reason) => Err(ClientError::rejected(reason)),
                None => Ok(Reply { status, value: ack }),
            }
        })
        .await
    }

    // =========================================================================
    // Business: jobs
    // =========================================================================

    /// Create a job posting. The backend derives the rating schema.
    pub async fn create_job(&self, job: &NewJob) -> ClientResult<Job> {
        let path = "/business/create_job";
        self.execute("create_job", path, async {
            let response = self.request(Method::POST, path)?.json(job).send().await?;
            Self::read_json(response).await
        })
        .await
    }

    /// List the caller's job postings.
    pub async fn list_jobs(&self) -> ClientResult<Vec<Job>> {
        let path = "/business/get_jobs";
        self.execute("list_jobs", path, async {
            let response = self.request(Method::GET, path)?.send().await?;
            let reply: Reply<Option<Vec<Job>>> = Self::read_json(response).await?;
            Ok(reply.map(Option::unwrap_or_default))
        })
        .await
    }

    /// Apply a partial update. Fields left unset are not sent.
    pub async fn edit_job(&self, update: &JobUpdate) -> ClientResult<Job> {
        let path = "/business/edit_job";
        self.execute("edit_job", path, async {
            let response = self.request(Method::POST, path)?.json(update).send().await?;
            Self::read_json(response).await
        })
        .await
    }

    // =========================================================================
    // Business: matches
    // =========================================================================

    /// Precomputed resume matches for a job.
    pub async fn list_resume_matches(&self, job_id: &JobId) -> ClientResult<Vec<CandidateMatch>> {
        self.match_listing("list_resume_matches", "/business/get_resume_matches", job_id)
            .await
    }

    /// Ask the backend to (re)compute matches for a job.
    pub async fn calculate_matches(&self, job_id: &JobId) -> ClientResult<Vec<CandidateMatch>> {
        self.match_listing("calculate_matches", "/business/calculate_matches", job_id)
            .await
    }

    /// Matches stored for a job.
    pub async fn list_matches(&self, job_id: &JobId) -> ClientResult<Vec<CandidateMatch>> {
        self.match_listing("list_matches", "/business/get_matches", job_id)
            .await
    }

    /// A job with nothing computed yet yields an empty list (200 with an
    /// empty/`null` body, or 404).
    async fn match_listing(
        &self,
        operation: &str,
        path: &str,
        job_id: &JobId,
    ) -> ClientResult<Vec<CandidateMatch>> {
        self.execute(operation, path, self.fetch_match_listing(path, job_id))
            .await
    }

    async fn fetch_match_listing(
        &self,
        path: &str,
        job_id: &JobId,
    ) -> ClientResult<Reply<Vec<CandidateMatch>>> {
        let response = self
            .request(Method::GET, path)?
            .query(&[("job_id", job_id.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(job_id = %job_id, "No matches for job");
            return Ok(Reply {
                status: StatusCode::NOT_FOUND,
                value: Vec::new(),
            });
        }

        let reply: Reply<Option<Vec<CandidateMatch>>> = Self::read_json(response).await?;
        Ok(reply.map(Option::unwrap_or_default))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))?;

        let builder = self.http.request(method, url);
        Ok(match &self.credential {
            Some(credential) => builder.bearer_auth(credential.as_str()),
            None => builder,
        })
    }

    /// Execute a request with tracing and metrics.
    async fn execute<T, F>(&self, operation: &str, path: &str, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<Reply<T>>>,
    {
        let span = info_span!(
            "api_request",
            operation = %operation,
            path = %path,
            authenticated = self.credential.is_some()
        );

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        record_request(operation, recorded_status(&result), latency_ms);

        if let Err(e) = &result {
            debug!(operation, error = %e, "Backend request failed");
        }

        result.map(|reply| reply.value)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<Reply<T>> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body = response.text().await?;
        let value = serde_json::from_str(&body).map_err(|e| {
            ClientError::invalid_response(format!("{} (body: {})", e, truncate(&body, 200)))
        })?;
        Ok(Reply { status, value })
    }

    async fn expect_success(response: Response) -> ClientResult<Reply<()>> {
        let status = response.status();
        if status.is_success() {
            Ok(Reply { status, value: () })
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn error_from_response(response: Response) -> ClientError {
        let status = response.status();
        let path = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        ClientError::from_http_status(
            status.as_u16(),
            format!("{} failed: {}", path, error_detail(&body)),
        )
    }
}

/// A decoded body and the status it arrived with.
struct Reply<T> {
    status: StatusCode,
    value: T,
}

impl<T> Reply<T> {
    fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        Reply {
            status: self.status,
            value: f(self.value),
        }
    }
}

/// Status label for the request counter: the HTTP status the backend sent,
/// including statuses mapped to a successful result, or 0 without one.
fn recorded_status<T>(result: &ClientResult<Reply<T>>) -> u16 {
    match result {
        Ok(reply) => reply.status.as_u16(),
        Err(e) => e.http_status().unwrap_or(0),
    }
}

/// Parse the base URL and make sure relative joins keep any path prefix.
fn normalize_base_url(raw: &str) -> ClientResult<Url> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;

    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(format!("{}: not a base URL", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Pull FastAPI's `detail` out of an error body when present.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => truncate(body, 200),
        },
        _ => truncate(body, 200),
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("TALENT_API_URL", "https://api.example.com/v1");
        std::env::set_var("TALENT_CONNECT_TIMEOUT_SECS", "3");
        let config = ClientConfig::from_env();
        std::env::remove_var("TALENT_API_URL");
        std::env::remove_var("TALENT_CONNECT_TIMEOUT_SECS");

        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    #[serial]
    fn test_config_from_env_blank_url_falls_back() {
        std::env::set_var("TALENT_API_URL", "  ");
        let config = ClientConfig::from_env();
        std::env::remove_var("TALENT_API_URL");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_base_url_keeps_prefix() {
        let url = normalize_base_url("https://api.example.com/v1").unwrap();
        assert_eq!(
            url.join("business/get_jobs").unwrap().as_str(),
            "https://api.example.com/v1/business/get_jobs"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_with_credential_and_anonymous() {
        let client = ApiClient::new(ClientConfig::default()).unwrap();
        assert!(client.credential().is_none());

        let bound = client.with_credential(Credential::new("tok"));
        assert_eq!(bound.credential().map(|c| c.as_str()), Some("tok"));
        assert!(bound.anonymous().credential().is_none());
        assert!(!format!("{:?}", bound).contains("tok"));
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"detail": "Incorrect username or password"}"#),
            "Incorrect username or password"
        );
        assert_eq!(error_detail("plain text"), "plain text");
    }

    #[tokio::test]
    async fn test_empty_listing_keeps_not_found_status() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/business/get_matches"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::with_base_url(server.uri())).unwrap();
        let result = client
            .fetch_match_listing("/business/get_matches", &JobId::from_string("job-1"))
            .await;

        assert_eq!(recorded_status(&result), 404);
        assert!(result.unwrap().value.is_empty());
    }

    #[tokio::test]
    async fn test_recorded_status_follows_backend() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/business/get_matches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(null)))
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::with_base_url(server.uri())).unwrap();
        let ok = client
            .fetch_match_listing("/business/get_matches", &JobId::from_string("job-1"))
            .await;
        assert_eq!(recorded_status(&ok), 200);

        let failed: ClientResult<Reply<()>> = Err(ClientError::Server(503, "down".into()));
        assert_eq!(recorded_status(&failed), 503);
        let offline: ClientResult<Reply<()>> = Err(ClientError::invalid_response("garbage"));
        assert_eq!(recorded_status(&offline), 0);
    }
}
