//! End-to-end tests of the HTTP surface, with the database and GitHub mocked.

use api_lib::config::Config;
use api_lib::web::{router, AppState};
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::Utc;
use mockall::predicate::eq;
use repo_bulletin_core::ports::{MockDatabaseService, MockIdentityProvider};
use repo_bulletin_core::{Bulletin, PortError, ProviderProfile, SessionCodec, StoredBulletin, User};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "route-test-secret";
const HAPPY: &str = r#"{"sections":[{"id":"s1","name":"Faves","repos":[{"id":"r1","repoID":7}]}]}"#;

fn config() -> Arc<Config> {
    let vars = [
        ("DATABASE_URL", "postgres://localhost/test"),
        ("GITHUB_CLIENT_ID", "client-id"),
        ("GITHUB_CLIENT_SECRET", "client-secret"),
        ("GITHUB_CALLBACK", "https://repobullet.in/api/callback"),
        ("JWT_SECRET", SECRET),
        ("APP_URL", "https://repobullet.in"),
    ];
    let config = Config::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .unwrap();
    Arc::new(config)
}

fn app(db: MockDatabaseService, identity: MockIdentityProvider) -> Router {
    router(Arc::new(AppState::new(config(), Arc::new(db), Arc::new(identity))))
}

fn session_for(user_id: i64) -> String {
    format!("jwt={}", SessionCodec::new(SECRET.as_bytes()).issue(user_id).unwrap())
}

fn percent_encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                char::from(b).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

fn set_cookies<B>(response: &Response<B>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn alice_profile() -> ProviderProfile {
    ProviderProfile {
        id: 42,
        handle: "alice".into(),
    }
}

fn db_with_alice() -> MockDatabaseService {
    let mut db = MockDatabaseService::new();
    db.expect_get_user().with(eq(42)).returning(|id| {
        Ok(User {
            id,
            access_token: "gho_token".into(),
        })
    });
    db
}

fn github_owning(repos: Vec<i64>) -> MockIdentityProvider {
    let mut identity = MockIdentityProvider::new();
    identity
        .expect_fetch_profile()
        .returning(|_| Ok(alice_profile()));
    identity
        .expect_list_repos()
        .returning(move |_, _| Ok(repos.clone()));
    identity
}

//=========================================================================================
// Handshake
//=========================================================================================

#[tokio::test]
async fn redirect_sets_state_cookie() {
    let mut identity = MockIdentityProvider::new();
    identity
        .expect_authorize_url()
        .returning(|state| format!("https://github.com/login/oauth/authorize?state={state}"));

    let response = app(MockDatabaseService::new(), identity)
        .oneshot(get("/api/redirect", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    let state = location.rsplit_once("state=").unwrap().1.to_string();
    assert_eq!(state.len(), 24);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with(&format!("state={state}")));
    assert!(cookies[0].contains("Max-Age=600"));
    assert!(cookies[0].contains("SameSite=Strict"));
}

#[tokio::test]
async fn callback_logs_user_in() {
    let mut identity = MockIdentityProvider::new();
    identity
        .expect_exchange_code()
        .withf(|code: &str| code == "good-code")
        .returning(|_| Ok("gho_token".into()));
    identity
        .expect_fetch_profile()
        .returning(|_| Ok(alice_profile()));

    let mut db = MockDatabaseService::new();
    db.expect_get_user()
        .with(eq(42))
        .returning(|_| Err(PortError::NotFound("user 42".into())));
    db.expect_insert_user()
        .withf(|user: &User| user.id == 42 && user.access_token == "gho_token")
        .times(1)
        .returning(|_| Ok(()));

    let response = app(db, identity)
        .oneshot(get(
            "/api/callback?code=good-code&state=AbC-123_xyz",
            Some("theme=dark; state=AbC-123_xyz"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://repobullet.in/alice"
    );

    let cookies = set_cookies(&response);
    let session = cookies
        .iter()
        .find(|c| c.starts_with("jwt="))
        .expect("session cookie");
    assert!(session.contains("Max-Age=86400"));
    assert!(session.contains("HttpOnly"));
    let token = session
        .trim_start_matches("jwt=")
        .split(';')
        .next()
        .unwrap();
    assert_eq!(
        SessionCodec::new(SECRET.as_bytes()).verify(token).unwrap(),
        42
    );

    let state = cookies
        .iter()
        .find(|c| c.starts_with("state="))
        .expect("state cookie cleared");
    assert!(state.contains("Max-Age=0"));
}

#[tokio::test]
async fn callback_with_wrong_state_is_forbidden() {
    let mut identity = MockIdentityProvider::new();
    identity.expect_exchange_code().never();

    let response = app(MockDatabaseService::new(), identity)
        .oneshot(get(
            "/api/callback?code=good-code&state=forged",
            Some("state=original"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await, json!({ "status": "Invalid state." }));
}

#[tokio::test]
async fn callback_with_bad_code_is_bad_request() {
    let mut identity = MockIdentityProvider::new();
    identity
        .expect_exchange_code()
        .returning(|_| Err(PortError::Unexpected("bad_verification_code".into())));

    let response = app(MockDatabaseService::new(), identity)
        .oneshot(get("/api/callback?code=stale&state=s1", Some("state=s1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "status": "Could not get token." }));
}

//=========================================================================================
// Logout and Account
//=========================================================================================

#[tokio::test]
async fn logout_requires_post() {
    let response = app(MockDatabaseService::new(), MockIdentityProvider::new())
        .oneshot(get("/api/logout", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json_body(response).await, json!({ "status": "Method not allowed." }));
}

#[tokio::test]
async fn logout_clears_session_without_authentication() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/logout")
        .body(Body::empty())
        .unwrap();
    let response = app(MockDatabaseService::new(), MockIdentityProvider::new())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("jwt=;"));
    assert!(cookies[0].contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
}

#[tokio::test]
async fn account_returns_id_and_handle() {
    let mut identity = MockIdentityProvider::new();
    identity
        .expect_fetch_profile()
        .withf(|token: &str| token == "gho_token")
        .returning(|_| Ok(alice_profile()));

    let response = app(db_with_alice(), identity)
        .oneshot(get("/api/account", Some(&session_for(42))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "id": "42", "name": "alice" }));
}

#[tokio::test]
async fn account_requires_session() {
    let response = app(MockDatabaseService::new(), MockIdentityProvider::new())
        .oneshot(get("/api/account", Some("jwt=not-a-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await, json!({ "status": "Unauthenticated" }));
}

#[tokio::test]
async fn delete_account_clears_session() {
    let mut db = MockDatabaseService::new();
    db.expect_delete_user()
        .with(eq(42))
        .times(1)
        .returning(|_| Ok(()));

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/delete-account")
        .header(header::COOKIE, session_for(42))
        .body(Body::empty())
        .unwrap();
    let response = app(db, MockIdentityProvider::new())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(set_cookies(&response)[0].starts_with("jwt=;"));
}

//=========================================================================================
// Saving
//=========================================================================================

#[tokio::test]
async fn save_happy_path() {
    let mut db = db_with_alice();
    db.expect_get_bulletin()
        .returning(|_| Err(PortError::NotFound("bulletin".into())));
    db.expect_insert_bulletin()
        .withf(|id: &i64, b: &Bulletin| *id == 42 && b.sections.len() == 1)
        .times(1)
        .returning(|_, _| Ok(()));

    let uri = format!("/api/save?x={}", percent_encode(HAPPY));
    let response = app(db, github_owning(vec![7, 8]))
        .oneshot(get(&uri, Some(&session_for(42))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn save_rejects_duplicate_repo_before_lookup() {
    let mut identity = MockIdentityProvider::new();
    identity.expect_fetch_profile().never();
    identity.expect_list_repos().never();
    let mut db = MockDatabaseService::new();
    db.expect_get_user().never();

    let payload = r#"{"sections":[{"id":"s1","name":"Faves","repos":[{"id":"r1","repoID":7},{"id":"r2","repoID":7}]}]}"#;
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/save?x={}", percent_encode(payload)))
        .header(header::COOKIE, session_for(42))
        .body(Body::empty())
        .unwrap();
    let response = app(db, identity).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "status": "Bad payload: A section can not have duplicate Repo IDs" })
    );
}

#[tokio::test]
async fn save_rejects_unowned_repo() {
    let mut db = db_with_alice();
    db.expect_insert_bulletin().never();
    db.expect_update_bulletin().never();

    let uri = format!("/api/save?x={}", percent_encode(HAPPY));
    let response = app(db, github_owning(vec![1, 2]))
        .oneshot(get(&uri, Some(&session_for(42))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json_body(response).await,
        json!({ "status": "Unauthorized repos in payload." })
    );
}

#[tokio::test]
async fn save_requires_session() {
    let uri = format!("/api/save?x={}", percent_encode(HAPPY));
    let response = app(MockDatabaseService::new(), MockIdentityProvider::new())
        .oneshot(get(&uri, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn save_requires_payload() {
    let response = app(MockDatabaseService::new(), MockIdentityProvider::new())
        .oneshot(get("/api/save", Some(&session_for(42))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "status": "No data provided." }));
}

//=========================================================================================
// Public Bulletins
//=========================================================================================

#[tokio::test]
async fn public_bulletin() {
    let mut identity = MockIdentityProvider::new();
    identity
        .expect_lookup_user()
        .withf(|handle: &str| handle == "alice")
        .returning(|_| Ok(42));
    let mut db = db_with_alice();
    db.expect_get_bulletin().returning(|user_id| {
        Ok(StoredBulletin {
            user_id,
            bulletin: serde_json::from_str(HAPPY).unwrap(),
            updated_at: Utc::now(),
        })
    });

    let response = app(db, identity)
        .oneshot(get("/api/bulletin?user=alice", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"], serde_json::from_str::<Value>(HAPPY).unwrap());
    assert!(body["updated_at"].is_string());
}

#[tokio::test]
async fn public_bulletin_not_saved_yet() {
    let mut identity = MockIdentityProvider::new();
    identity.expect_lookup_user().returning(|_| Ok(42));
    let mut db = db_with_alice();
    db.expect_get_bulletin()
        .returning(|_| Err(PortError::NotFound("bulletin".into())));

    let response = app(db, identity)
        .oneshot(get("/api/bulletin?user=alice", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"], Value::Null);
}

#[tokio::test]
async fn public_bulletin_unknown_user() {
    let mut identity = MockIdentityProvider::new();
    identity.expect_lookup_user().returning(|_| Ok(99));
    let mut db = MockDatabaseService::new();
    db.expect_get_user()
        .returning(|_| Err(PortError::NotFound("user 99".into())));

    let response = app(db, identity)
        .oneshot(get("/api/bulletin?user=bob", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({ "status": "User does not have a bulletin." })
    );
}

#[tokio::test]
async fn public_bulletin_requires_user() {
    let response = app(MockDatabaseService::new(), MockIdentityProvider::new())
        .oneshot(get("/api/bulletin", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn hello() {
    let response = app(MockDatabaseService::new(), MockIdentityProvider::new())
        .oneshot(get("/api/hello", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}
