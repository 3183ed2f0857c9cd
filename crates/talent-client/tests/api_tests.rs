//! Client behaviour against a fake backend.

use serde_json::json;
use talent_client::{ApiClient, ClientConfig, ClientError};
use talent_models::{Credential, JobId, JobUpdate, LoginRequest, NewJob, RegisterRequest, UserType};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientConfig::with_base_url(server.uri())).unwrap()
}

fn job_json(title: &str) -> serde_json::Value {
    json!({
        "job_id": "job-1",
        "user_id": "biz-1",
        "job_title": title,
        "job_desc": "Write Rust services",
        "rating_schema": {"properties": {"rust": {"type": "integer"}, "sql": {"type": "integer"}}},
        "rating_schema_weights": {"rust": 2.0, "sql": 1.0}
    })
}

#[tokio::test]
async fn test_login_sends_form_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=a%40x.com"))
        .and(body_string_contains("password=secret1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok-1", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let token = client_for(&server)
        .login(&LoginRequest::new("a@x.com", "secret1"))
        .await
        .unwrap();

    assert_eq!(token.credential(), Credential::new("tok-1"));
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect username or password"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .login(&LoginRequest::new("a@x.com", "wrong"))
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert!(err.to_string().contains("Incorrect username or password"));
}

#[tokio::test]
async fn test_register_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(json!({
            "name": "A",
            "email": "a@x.com",
            "password": "secret1",
            "user_type": "business",
            "city": "Oslo",
            "country": "NO"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;

    let request = RegisterRequest {
        name: "A".into(),
        email: "a@x.com".into(),
        password: "secret1".into(),
        user_type: UserType::Business,
        city: "Oslo".into(),
        country: "NO".into(),
    };
    client_for(&server).register(&request).await.unwrap();
}

#[tokio::test]
async fn test_bearer_attached_only_when_bound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "a@x.com",
            "name": "A",
            "user_type": "user",
            "city": "Lisbon",
            "country": "PT"
        })))
        .mount(&server)
        .await;

    let anonymous = client_for(&server);
    let bound = anonymous.with_credential(Credential::new("tok-1"));

    anonymous.get_profile().await.unwrap();
    let profile = bound.get_profile().await.unwrap();
    assert_eq!(profile.email, "a@x.com");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[1].headers.get("authorization").unwrap().to_str().unwrap(),
        "Bearer tok-1"
    );
}

#[tokio::test]
async fn test_expired_profile_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .with_credential(Credential::new("stale"))
        .get_profile()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized(_)));
}

#[tokio::test]
async fn test_upload_is_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let ack = client_for(&server)
        .with_credential(Credential::new("tok-1"))
        .upload_resume_bytes("cv.pdf", b"%PDF-1.4 test".to_vec())
        .await
        .unwrap();
    assert!(ack.error.is_none());

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"cv.pdf\""));
    assert!(body.contains("%PDF-1.4 test"));
}

#[tokio::test]
async fn test_upload_from_disk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("resume.pdf");
    std::fs::write(&file, b"%PDF-1.4 disk").unwrap();
    let resume = talent_models::ResumeFile::new(&file).unwrap();

    client_for(&server)
        .with_credential(Credential::new("tok-1"))
        .upload_resume(&resume)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upload_error_ack_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/upload"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "Only PDF files are supported"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .upload_resume_bytes("cv.pdf", b"not really".to_vec())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref msg) if msg.contains("Only PDF")));
}

#[tokio::test]
async fn test_create_and_list_jobs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/business/create_job"))
        .and(body_json(json!({"job_title": "Rust Engineer", "job_desc": "Write Rust services"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_json("Rust Engineer")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/business/get_jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([job_json("Rust Engineer")])))
        .mount(&server)
        .await;

    let client = client_for(&server).with_credential(Credential::new("tok-1"));
    let created = client
        .create_job(&NewJob {
            job_title: "Rust Engineer".into(),
            job_desc: "Write Rust services".into(),
        })
        .await
        .unwrap();
    let jobs = client.list_jobs().await.unwrap();

    assert_eq!(created.job_id, JobId::from_string("job-1"));
    assert_eq!(jobs, vec![created]);
}

#[tokio::test]
async fn test_edit_job_title_only_keeps_other_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/business/edit_job"))
        .and(body_json(json!({"job_id": "job-1", "job_title": "New Title"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_json("New Title")))
        .expect(1)
        .mount(&server)
        .await;

    let before: talent_models::Job = serde_json::from_value(job_json("Old Title")).unwrap();
    let update = JobUpdate::new(before.job_id.clone()).title("New Title");

    let after = client_for(&server)
        .with_credential(Credential::new("tok-1"))
        .edit_job(&update)
        .await
        .unwrap();

    assert_eq!(after.job_title, "New Title");
    assert_eq!(after.job_desc, before.job_desc);
    assert_eq!(after.rating_schema, before.rating_schema);
    assert_eq!(after.rating_schema_weights, before.rating_schema_weights);
}

#[tokio::test]
async fn test_matches_for_job_without_results_are_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/business/get_matches"))
        .and(query_param("job_id", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/business/get_resume_matches"))
        .and(query_param("job_id", "fresh"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/business/calculate_matches"))
        .and(query_param("job_id", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let client = client_for(&server).with_credential(Credential::new("tok-1"));
    let job = JobId::from_string("fresh");

    assert!(client.list_matches(&job).await.unwrap().is_empty());
    assert!(client.list_resume_matches(&job).await.unwrap().is_empty());
    assert!(client.calculate_matches(&job).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_calculate_matches_returns_scores() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/business/calculate_matches"))
        .and(query_param("job_id", "job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Ada", "resume": "r-1", "score": 8.5, "ratings": {"rust": 9, "sql": 7}},
            {"name": "Bob", "resume": "r-2", "score": 6.0, "ratings": {"rust": 5, "sql": 8}}
        ])))
        .mount(&server)
        .await;

    let matches = client_for(&server)
        .with_credential(Credential::new("tok-1"))
        .calculate_matches(&JobId::from_string("job-1"))
        .await
        .unwrap();

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].name, "Ada");
    assert_eq!(matches[0].rating("rust"), Some(9.0));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/business/get_jobs"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Error getting jobs"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .with_credential(Credential::new("tok-1"))
        .list_jobs()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Server(500, _)));
}

#[tokio::test]
async fn test_undecodable_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_profile().await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
}
