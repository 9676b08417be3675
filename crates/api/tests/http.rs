//! HTTP-level smoke tests: router wiring, auth extraction, and the JSON
//! error envelope, driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use docuflow_api::auth::jwt::{generate_access_token, JwtConfig};
use docuflow_api::config::ServerConfig;
use docuflow_api::state::AppState;
use docuflow_api::routes;
use docuflow_notify::NotificationGateway;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec![],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            access_token_expiry_mins: 60,
        },
    }
}

fn app(pool: PgPool) -> (Router, ServerConfig) {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifier: Arc::new(NotificationGateway::new(Vec::new())),
    };
    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(state);
    (router, config)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_health_endpoint(pool: PgPool) {
    let (app, _) = app(pool);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_token_is_unauthorized(pool: PgPool) {
    let (app, _) = app(pool);

    let response = app
        .oneshot(
            Request::get("/api/v1/documents")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_request_over_http(pool: PgPool) {
    let (student_id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (username, email, course, role)
         VALUES ('http-student', 'http@example.edu', 'bachelor of arts in english', 'student')
         RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let (document_id,): (i64,) = sqlx::query_as(
        "INSERT INTO document_types (name, processing_time, fee)
         VALUES ('Transcript of Records', '5 days', 250.0)
         RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let (app, config) = app(pool);
    let token = generate_access_token(student_id, "student", None, &config.jwt).unwrap();

    let body = serde_json::json!({
        "student_id": student_id,
        "document_id": document_id,
        "reason": "enrollment",
    });
    let request = Request::post("/api/v1/requests")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["payment"], "pending");

    // The duplicate surfaces as a 409 through the error envelope.
    let body = serde_json::json!({
        "student_id": student_id,
        "document_id": document_id,
        "reason": "enrollment",
    });
    let request = Request::post("/api/v1/requests")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_department_is_bad_request(pool: PgPool) {
    let (student_id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (username, role) VALUES ('dept-check', 'student') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let (app, config) = app(pool);
    let token = generate_access_token(1, "admin", Some("registrar"), &config.jwt).unwrap();

    let request = Request::put(format!(
        "/api/v1/student-clearances/{student_id}/athletics"
    ))
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(
        serde_json::json!({ "status": "approved" }).to_string(),
    ))
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "VALIDATION_ERROR");
}
