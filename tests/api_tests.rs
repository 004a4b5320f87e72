use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use jotter::config::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // In-memory SQLite is per-connection; a single pooled connection keeps
    // every request on the same database.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;

    let state = jotter::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    jotter::api::router(state).await
}

fn post_json(uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
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

fn session_cookie(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("expected a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Register a user and return the session cookie plus the assigned user id.
async fn register_user(app: &Router, name: &str, email: &str, password: &str) -> (String, i64) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({ "name": name, "email": email, "password": password }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let body = body_json(response).await;
    let user_id = body["data"]["id"].as_i64().unwrap();
    (cookie, user_id)
}

#[tokio::test]
async fn test_register_login_and_whoami() {
    let app = spawn_app().await;

    let (cookie, user_id) = register_user(&app, "Ana", "ana@x.com", "secret1").await;

    // The registration session is immediately usable.
    let response = app
        .clone()
        .oneshot(get("/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"].as_i64().unwrap(), user_id);
    assert_eq!(body["data"]["name"], "Ana");
    assert_eq!(body["data"]["email"], "ana@x.com");
    assert!(body["data"]["password_hash"].is_null());

    // Login with the same credentials resolves to the same user.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "ana@x.com", "password": "secret1" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"].as_i64().unwrap(), user_id);
}

#[tokio::test]
async fn test_register_validation_is_itemized() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({ "name": "", "email": "not-an-email", "password": "abc" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password"]);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = spawn_app().await;

    register_user(&app, "Ana", "ana@x.com", "secret1").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({ "name": "Other", "email": "ana@x.com", "password": "secret2" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Email matching is case-sensitive: a different casing is a new account.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({ "name": "Other", "email": "Ana@x.com", "password": "secret2" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_undifferentiated() {
    let app = spawn_app().await;

    register_user(&app, "Ana", "ana@x.com", "secret1").await;

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "ana@x.com", "password": "wrong" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown_email = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "nobody@x.com", "password": "secret1" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    // Identical error bodies: no hint whether the email exists.
    let body_wrong = body_json(wrong_password).await;
    let body_unknown = body_json(unknown_email).await;
    assert_eq!(body_wrong, body_unknown);
}

#[tokio::test]
async fn test_note_create_list_roundtrip() {
    let app = spawn_app().await;

    let (cookie, user_id) = register_user(&app, "Ana", "ana@x.com", "secret1").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/notes",
            serde_json::json!({
                "title": "Pay bills",
                "created_date": "2024-01-01",
                "completed_date": "2024-01-01",
                "status": "todo"
            }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let note_id = body["data"]["id"].as_i64().unwrap();
    assert!(note_id > 0);
    assert_eq!(body["data"]["user_id"].as_i64().unwrap(), user_id);

    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let notes = body["data"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["id"].as_i64().unwrap(), note_id);
    assert_eq!(notes[0]["title"], "Pay bills");
    assert_eq!(notes[0]["created_date"], "2024-01-01");
    assert_eq!(notes[0]["completed_date"], "2024-01-01");
    assert_eq!(notes[0]["status"], "todo");
}

#[tokio::test]
async fn test_note_partial_update_and_delete() {
    let app = spawn_app().await;

    let (cookie, _) = register_user(&app, "Ana", "ana@x.com", "secret1").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/notes",
            serde_json::json!({
                "title": "Pay bills",
                "created_date": "2024-01-01",
                "status": "todo"
            }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let note_id = body["data"]["id"].as_i64().unwrap();

    // Only the supplied field changes.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/notes/{note_id}"))
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .header(header::COOKIE, &cookie)
                .body(Body::from(
                    serde_json::json!({ "title": "Pay January bills" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["title"], "Pay January bills");
    assert_eq!(body["data"]["status"], "todo");
    assert_eq!(body["data"]["created_date"], "2024-01-01");

    // Delete is permanent.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/notes/{note_id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // Deleting again reveals nothing new.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/notes/{note_id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mark_completed_restamps_date() {
    let app = spawn_app().await;

    let (cookie, _) = register_user(&app, "Ana", "ana@x.com", "secret1").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/notes",
            serde_json::json!({
                "title": "Water plants",
                "created_date": "2024-01-01",
                "status": "todo"
            }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let note_id = body["data"]["id"].as_i64().unwrap();

    let today = chrono::Utc::now().date_naive().to_string();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/notes/{note_id}/complete"),
                serde_json::json!({}),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "done");
        assert_eq!(body["data"]["completed_date"], today.as_str());
    }
}

#[tokio::test]
async fn test_note_validation_errors() {
    let app = spawn_app().await;

    let (cookie, _) = register_user(&app, "Ana", "ana@x.com", "secret1").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/notes",
            serde_json::json!({
                "title": "   ",
                "created_date": "01/01/2024",
                "status": "finished"
            }),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "status", "created_date"]);
}

#[tokio::test]
async fn test_unmatched_note_ids_are_not_found() {
    let app = spawn_app().await;

    let (cookie, _) = register_user(&app, "Ana", "ana@x.com", "secret1").await;

    // Ids that cannot match any row (including non-positive ones) resolve
    // through the ownership filter to a plain 404, never a validation error.
    for id in [0, -1, 99999] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/notes/{id}"))
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/notes/{id}/complete"),
                serde_json::json!({}),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_notes_are_owner_scoped() {
    let app = spawn_app().await;

    let (ana_cookie, _) = register_user(&app, "Ana", "ana@x.com", "secret1").await;
    let (bob_cookie, _) = register_user(&app, "Bob", "bob@x.com", "secret2").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/notes",
            serde_json::json!({
                "title": "Ana's secret plan",
                "created_date": "2024-01-01",
                "status": "todo"
            }),
            Some(&ana_cookie),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let note_id = body["data"]["id"].as_i64().unwrap();

    // Bob cannot see, mutate, or delete Ana's note; every path is a plain 404.
    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&bob_cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/notes/{note_id}"))
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .header(header::COOKIE, &bob_cookie)
                .body(Body::from(
                    serde_json::json!({ "title": "hijacked" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/notes/{note_id}"))
                .header(header::COOKIE, &bob_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Ana's note is untouched.
    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&ana_cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    let notes = body["data"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "Ana's secret plan");
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = spawn_app().await;

    // Protected routes reject requests without a session.
    let response = app.clone().oneshot(get("/api/notes", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (cookie, _) = register_user(&app, "Ana", "ana@x.com", "secret1").await;

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/logout", serde_json::json!({}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Logging out without a session is not an error.
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/logout", serde_json::json!({}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
