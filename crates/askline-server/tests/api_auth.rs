use askline_db::{create_pool, run_migrations, DbRuntimeSettings};
use askline_server::{app, config::Config, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup(config: Config) -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("askline.db");
    let pool = create_pool(db_path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
    run_migrations(&pool.get().unwrap()).unwrap();
    (app(AppState::new(pool, &config)), dir)
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn signup(email: &str, username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": email, "username": username, "password": password }).to_string(),
        ))
        .unwrap()
}

fn login(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={email}&password={password}")))
        .unwrap()
}

#[tokio::test]
async fn signup_then_login_then_use_token() {
    let (app, _dir) = setup(Config::default());

    let (status, user) = call(&app, signup("ada@example.com", "ada", "pw1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "ada");
    assert_eq!(user["is_admin"], true, "signup grants admin by default");
    assert!(user.get("password_hash").is_none());

    let (status, token) = call(&app, login("ada@example.com", "pw1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(token["token_type"], "bearer");
    let access_token = token["access_token"].as_str().unwrap().to_string();

    let (status, question) = call(
        &app,
        Request::builder()
            .method("POST")
            .uri("/questions")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .body(Body::from(json!({ "content": "Mine" }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(question["user_id"], user["id"]);

    let (status, updated) = call(
        &app,
        Request::builder()
            .method("PUT")
            .uri(format!("/questions/{}/status", question["id"]))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .body(Body::from(json!({ "status": "Answered" }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Answered");
}

#[tokio::test]
async fn signup_can_be_configured_to_create_regular_users() {
    let mut config = Config::default();
    config.auth.signup_grants_admin = false;
    let (app, _dir) = setup(config);

    let (status, user) = call(&app, signup("bob@example.com", "bob", "pw")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["is_admin"], false);
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let (app, _dir) = setup(Config::default());
    call(&app, signup("ada@example.com", "ada", "pw")).await;

    let (status, body) = call(&app, signup("ada@example.com", "ada2", "pw")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("email"));

    let (status, _) = call(&app, signup("new@example.com", "ada", "pw")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn blank_signup_fields_are_rejected() {
    let (app, _dir) = setup(Config::default());
    let (status, _) = call(&app, signup("a@example.com", "", "pw")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let (app, _dir) = setup(Config::default());
    call(&app, signup("ada@example.com", "ada", "right")).await;

    let (status, body) = call(&app, login("ada@example.com", "wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "incorrect email or password");

    let (status, _) = call(&app, login("ghost@example.com", "right")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let mut config = Config::default();
    config.auth.token_secret = "server-a".to_string();
    let (app_a, _dir_a) = setup(config.clone());
    config.auth.token_secret = "server-b".to_string();
    let (app_b, _dir_b) = setup(config);

    call(&app_a, signup("ada@example.com", "ada", "pw")).await;
    let (_, token) = call(&app_a, login("ada@example.com", "pw")).await;
    let access_token = token["access_token"].as_str().unwrap();

    let (status, _) = call(
        &app_b,
        Request::builder()
            .uri("/questions")
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_authorization_is_rejected() {
    let (app, _dir) = setup(Config::default());
    let (status, _) = call(
        &app,
        Request::builder()
            .uri("/questions")
            .header(header::AUTHORIZATION, "Basic YWRhOnB3")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
