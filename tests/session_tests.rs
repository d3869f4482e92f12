//! Session lifecycle: page guard, logout idempotence, and the full
//! register / login / reset-password round trip.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use doorman::config::Config;
use http_body_util::BodyExt;
use std::sync::atomic::{AtomicU32, Ordering};
use tower::ServiceExt;

static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

async fn spawn_app() -> Router {
    let db_path = std::env::temp_dir().join(format!(
        "doorman-session-test-{}-{}.db",
        std::process::id(),
        DB_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;

    let state = doorman::api::create_app_state_from_config(config)
        .await
        .expect("failed to create app state");

    doorman::api::router(state)
}

fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).to_string())
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Registers and logs in a user, returning the session cookie.
async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(form_post(
            "/register",
            &format!("username={username}&password={password}&confirm_password={password}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .clone()
        .oneshot(form_post(
            "/login",
            &format!("username={username}&password={password}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    session_cookie(&response).expect("login should set a session cookie")
}

#[tokio::test]
async fn protected_pages_redirect_anonymous_requests_to_login() {
    let app = spawn_app().await;

    for uri in ["/welcome", "/reset-password"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    }

    let response = app
        .oneshot(form_post("/reset-password", "new_password=x&confirm_password=x", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn root_redirects_to_welcome() {
    let app = spawn_app().await;

    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/welcome");
}

#[tokio::test]
async fn welcome_greets_the_logged_in_user() {
    let app = spawn_app().await;
    let cookie = register_and_login(&app, "alice_1", "secret1").await;

    let response = app.oneshot(get("/welcome", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("alice_1"));
}

#[tokio::test]
async fn login_page_bounces_authenticated_users_to_welcome() {
    let app = spawn_app().await;
    let cookie = register_and_login(&app, "alice_1", "secret1").await;

    let response = app.oneshot(get("/login", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/welcome");
}

#[tokio::test]
async fn session_cookie_is_http_only_and_same_site_lax() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/register",
            "username=alice_1&password=secret1&confirm_password=secret1",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .oneshot(form_post("/login", "username=alice_1&password=secret1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap();
    assert!(raw.contains("HttpOnly"), "{raw}");
    assert!(raw.contains("SameSite=Lax"), "{raw}");
}

#[tokio::test]
async fn logout_destroys_the_session_and_is_idempotent() {
    let app = spawn_app().await;
    let cookie = register_and_login(&app, "alice_1", "secret1").await;

    let response = app.clone().oneshot(get("/logout", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    // Second logout with the same dead cookie still succeeds.
    let response = app.clone().oneshot(get("/logout", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // And the session no longer grants access.
    let response = app.oneshot(get("/welcome", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn reset_password_validates_input_and_keeps_session() {
    let app = spawn_app().await;
    let cookie = register_and_login(&app, "alice_1", "secret1").await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/reset-password",
            "new_password=short&confirm_password=short",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Password must be at least 6 characters."));

    // Validation failure must not have destroyed the session.
    let response = app.oneshot(get("/welcome", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn full_password_reset_round_trip() {
    let app = spawn_app().await;

    // Register("alice_1", "secret1") and log in.
    let cookie = register_and_login(&app, "alice_1", "secret1").await;

    // ResetPassword(session, "newpass1", "newpass1") succeeds and
    // redirects to login.
    let response = app
        .clone()
        .oneshot(form_post(
            "/reset-password",
            "new_password=newpass1&confirm_password=newpass1",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    // The acting session is destroyed.
    let response = app
        .clone()
        .oneshot(get("/welcome", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // The old password no longer works.
    let response = app
        .clone()
        .oneshot(form_post("/login", "username=alice_1&password=secret1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Invalid username or password."));

    // The new password does.
    let response = app
        .oneshot(form_post("/login", "username=alice_1&password=newpass1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/welcome");
}
