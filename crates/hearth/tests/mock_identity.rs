//! Session tests against a mock identity API.
//!
//! These tests use wiremock to stand in for the family-task backend and
//! drive the real HTTP client and credential store end to end.

use std::sync::Arc;
use std::time::Duration;

use hearth::{CredentialStore, Error, Session, SessionManager, SessionStatus};
use hearth_core::{AccessToken, ApiUrl, MemoryTokenStorage, SignupRequest, TokenStorage, UserProfile};
use hearth_file::FileTokenStorage;
use hearth_http::HttpIdentityApi;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}/api/v1", server.address().port())).unwrap()
}

fn manager_with(
    server: &MockServer,
    storage: Arc<dyn TokenStorage>,
) -> SessionManager<HttpIdentityApi> {
    let store = Arc::new(CredentialStore::new(storage));
    let api = HttpIdentityApi::new(mock_api_url(server), store.clone()).unwrap();
    SessionManager::new(api, store)
}

fn manager(server: &MockServer) -> SessionManager<HttpIdentityApi> {
    manager_with(server, Arc::new(MemoryTokenStorage::new()))
}

fn user_json() -> serde_json::Value {
    json!({
        "id": 1,
        "first_name": "A",
        "last_name": "B",
        "email": "good@x.com",
        "avatar_url": null
    })
}

async fn mount_login_ok(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
}

async fn mount_me(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(server)
        .await;
}

async fn mount_me_unauthorized(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Could not validate credentials"
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "good@x.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_me(&server, "T").await;

    let manager = manager(&server);
    let session = manager.login("good@x.com", "pw").await.unwrap();

    assert_eq!(
        session,
        Session {
            is_authenticated: true,
            user: Some(UserProfile {
                id: 1,
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                email: "good@x.com".to_string(),
                avatar_url: None,
            }),
            token: Some(AccessToken::new("T")),
            loading: false,
            error: None,
        }
    );
    assert_eq!(manager.credentials().get_token(), Some(AccessToken::new("T")));
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect email or password"
        })))
        .mount(&server)
        .await;

    let manager = manager(&server);
    let session = manager.login("bad@x.com", "pw").await.unwrap();

    assert_eq!(session.status(), SessionStatus::Error);
    assert!(!session.is_authenticated);
    assert!(session.user.is_none());
    assert!(session.token.is_none());
    assert!(!session.loading);
    assert_eq!(session.error.as_deref(), Some("Incorrect email or password"));
    assert!(manager.credentials().get_token().is_none());
}

#[tokio::test]
async fn test_login_server_error_uses_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let session = manager(&server).login("good@x.com", "pw").await.unwrap();

    assert_eq!(session.error.as_deref(), Some("Login failed"));
}

#[tokio::test]
async fn test_login_retry_after_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "good@x.com", "password": "wrong"})))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect email or password"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "good@x.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T",
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;
    mount_me(&server, "T").await;

    let manager = manager(&server);
    let failed = manager.login("good@x.com", "wrong").await.unwrap();
    assert_eq!(failed.status(), SessionStatus::Error);

    let session = manager.login("good@x.com", "pw").await.unwrap();
    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert!(session.error.is_none());
}

#[tokio::test]
async fn test_concurrent_login_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "T", "token_type": "bearer"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_me(&server, "T").await;

    let manager = manager(&server);
    let mut rx = manager.subscribe();

    let (first, second) = tokio::join!(manager.login("good@x.com", "pw"), async {
        drop(rx.wait_for(|s| s.loading).await.unwrap());
        let rejected = manager.login("good@x.com", "pw").await;
        // The session is still mid-attempt and unchanged by the rejection.
        assert_eq!(manager.status(), SessionStatus::Authenticating);
        rejected
    });

    assert!(matches!(second, Err(Error::AttemptInFlight)));
    assert_eq!(first.unwrap().status(), SessionStatus::Authenticated);
}

// ============================================================================
// Signup
// ============================================================================

#[tokio::test]
async fn test_signup_success_logs_in() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signup"))
        .and(body_json(json!({
            "first_name": "A",
            "last_name": "B",
            "email": "good@x.com",
            "password": "pw"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;
    mount_login_ok(&server, "T").await;
    mount_me(&server, "T").await;

    let manager = manager(&server);
    let session = manager
        .signup(SignupRequest::new("A", "B", "good@x.com", "pw"))
        .await
        .unwrap();

    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(session.user.map(|u| u.id), Some(1));
    assert_eq!(manager.credentials().get_token(), Some(AccessToken::new("T")));
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signup"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "The user with this email already exists in the system."
        })))
        .mount(&server)
        .await;

    let session = manager(&server)
        .signup(SignupRequest::new("A", "B", "good@x.com", "pw"))
        .await
        .unwrap();

    assert_eq!(session.status(), SessionStatus::Error);
    assert!(session.error.unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_signup_created_but_login_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signup"))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect email or password"
        })))
        .mount(&server)
        .await;

    let manager = manager(&server);
    let session = manager
        .signup(SignupRequest::new("A", "B", "good@x.com", "pw"))
        .await
        .unwrap();

    assert_eq!(session.status(), SessionStatus::Error);
    assert!(!session.is_authenticated);
    assert_eq!(session.error.as_deref(), Some("Incorrect email or password"));
    assert!(manager.credentials().get_token().is_none());
}

#[tokio::test]
async fn test_signup_validation_error_uses_first_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"}
            ]
        })))
        .mount(&server)
        .await;

    let session = manager(&server)
        .signup(SignupRequest::new("A", "B", "not-an-email", "pw"))
        .await
        .unwrap();

    assert_eq!(
        session.error.as_deref(),
        Some("value is not a valid email address")
    );
}

// ============================================================================
// Revalidation
// ============================================================================

#[tokio::test]
async fn test_start_revalidates_persisted_token() {
    let server = MockServer::start().await;
    mount_me(&server, "persisted").await;

    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileTokenStorage::new(dir.path().join("storage.json")));
    storage.store("persisted").unwrap();

    let store = Arc::new(CredentialStore::new(storage));
    let api = HttpIdentityApi::new(mock_api_url(&server), store.clone()).unwrap();
    let manager = SessionManager::start(api, store).await;

    let session = manager.snapshot();
    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(session.token, Some(AccessToken::new("persisted")));
    assert_eq!(session.user.map(|u| u.email), Some("good@x.com".to_string()));
}

#[tokio::test]
async fn test_start_drops_rejected_token() {
    let server = MockServer::start().await;
    mount_me_unauthorized(&server).await;

    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileTokenStorage::new(dir.path().join("storage.json")));
    storage.store("stale").unwrap();

    let store = Arc::new(CredentialStore::new(storage.clone()));
    let api = HttpIdentityApi::new(mock_api_url(&server), store.clone()).unwrap();
    let manager = SessionManager::start(api, store).await;

    let session = manager.snapshot();
    assert!(session.is_initial());
    assert!(session.error.is_none());
    assert_eq!(storage.load().unwrap(), None);
    assert!(!manager.credentials().has_credential());
}

#[tokio::test]
async fn test_start_without_token_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(CredentialStore::new(Arc::new(MemoryTokenStorage::new())));
    let api = HttpIdentityApi::new(mock_api_url(&server), store.clone()).unwrap();
    let manager = SessionManager::start(api, store).await;

    assert!(manager.snapshot().is_initial());
}

// ============================================================================
// Logout and error handling
// ============================================================================

#[tokio::test]
async fn test_logout_after_login() {
    let server = MockServer::start().await;
    mount_login_ok(&server, "T").await;
    mount_me(&server, "T").await;

    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileTokenStorage::new(dir.path().join("storage.json")));
    let manager = manager_with(&server, storage.clone());

    manager.login("good@x.com", "pw").await.unwrap();
    assert_eq!(storage.load().unwrap().as_deref(), Some("T"));

    let session = manager.logout();
    assert!(session.is_initial());
    assert_eq!(storage.load().unwrap(), None);
    assert!(!manager.credentials().has_credential());
}

#[tokio::test]
async fn test_logout_supersedes_login_in_flight() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "good@x.com", "password": "slow"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "STALE", "token_type": "bearer"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "good@x.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T",
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;
    mount_me(&server, "T").await;

    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileTokenStorage::new(dir.path().join("storage.json")));
    let manager = manager_with(&server, storage.clone());
    let mut rx = manager.subscribe();

    let (stale, fresh) = tokio::join!(manager.login("good@x.com", "slow"), async {
        drop(rx.wait_for(|s| s.loading).await.unwrap());

        let session = manager.logout();
        assert!(session.is_initial());
        assert!(!manager.is_loading());

        // Signed out, so a new login is accepted straight away.
        manager.login("good@x.com", "pw").await
    });

    let fresh = fresh.unwrap();
    assert_eq!(fresh.token, Some(AccessToken::new("T")));

    // The superseded login settles without touching the session or storage.
    stale.unwrap();
    let session = manager.snapshot();
    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(session.token, Some(AccessToken::new("T")));
    assert_eq!(storage.load().unwrap().as_deref(), Some("T"));
}

#[tokio::test]
async fn test_logout_mid_flight_leaves_store_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "T", "token_type": "bearer"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_me(&server, "T").await;

    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileTokenStorage::new(dir.path().join("storage.json")));
    let manager = manager_with(&server, storage.clone());
    let mut rx = manager.subscribe();

    let (settled, _) = tokio::join!(manager.login("good@x.com", "pw"), async {
        drop(rx.wait_for(|s| s.loading).await.unwrap());
        manager.logout();
    });

    assert!(settled.unwrap().is_initial());
    assert!(manager.snapshot().is_initial());
    assert_eq!(storage.load().unwrap(), None);
    assert!(!manager.credentials().has_credential());
}

#[tokio::test]
async fn test_logout_from_error_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect email or password"
        })))
        .mount(&server)
        .await;

    let manager = manager(&server);
    manager.login("bad@x.com", "pw").await.unwrap();

    assert!(manager.logout().is_initial());
    assert!(manager.logout().is_initial());
}

#[tokio::test]
async fn test_clear_error_keeps_auth_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect email or password"
        })))
        .mount(&server)
        .await;

    let manager = manager(&server);
    manager.login("bad@x.com", "pw").await.unwrap();
    assert_eq!(manager.status(), SessionStatus::Error);

    manager.clear_error();

    let session = manager.snapshot();
    assert_eq!(session.status(), SessionStatus::Unauthenticated);
    assert!(session.is_initial());
}
