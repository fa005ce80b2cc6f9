//! Round-trip tests for the device-auth client against an in-process server.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use classpair_api::{ApiError, DeviceAuthClient, SessionApi};
use classpair_core::{AuthStatus, Config};
use serde_json::json;

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn client_for(base_url: String) -> DeviceAuthClient {
    DeviceAuthClient::new(&Config::new().with_api_base_url(base_url))
}

#[tokio::test]
async fn test_create_then_poll_until_authorized() {
    let router = Router::new()
        .route(
            "/device-auth/session",
            post(|| async {
                Json(json!({"data": {
                    "sessionId": "sess-1234abcd",
                    "qrPayload": "opaque-qr-blob",
                    "expiresAt": "2099-01-01T00:00:00Z"
                }}))
            }),
        )
        .route(
            "/device-auth/session/:id",
            get(|Path(id): Path<String>| async move {
                assert_eq!(id, "sess-1234abcd");
                Json(json!({"data": {
                    "status": "authorized",
                    "authToken": "tok-9",
                    "teacher": {
                        "_id": "t-1",
                        "teacherId": "T100",
                        "name": "Asha Rao",
                        "schoolId": "s-9",
                        "class": "8B",
                        "subject": "Math",
                        "allClasses": ["8B"],
                        "allSubjects": ["Math"],
                        "isClassTeacher": true
                    }
                }}))
            }),
        );
    let client = client_for(spawn_server(router).await);

    let session = client.create_session().await.unwrap();
    assert_eq!(session.session_id, "sess-1234abcd");
    assert_eq!(session.qr_payload, "opaque-qr-blob");
    assert_eq!(session.short_id(), "sess-123");

    let result = client.fetch_status(&session.session_id).await.unwrap();
    assert_eq!(result.status, AuthStatus::Authorized);
    let (token, teacher) = result.credentials().unwrap();
    assert_eq!(token, "tok-9");
    assert_eq!(teacher.name, "Asha Rao");
}

#[tokio::test]
async fn test_non_success_status_is_network_error() {
    let router = Router::new().route(
        "/device-auth/session",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = client_for(spawn_server(router).await);

    let err = client.create_session().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_malformed_body_is_protocol_error() {
    let router = Router::new()
        .route("/device-auth/session", post(|| async { "not json at all" }))
        .route(
            "/device-auth/session/:id",
            get(|| async { Json(json!({"data": {"authToken": "tok"}})) }),
        );
    let client = client_for(spawn_server(router).await);

    let err = client.create_session().await.unwrap_err();
    assert!(matches!(err, ApiError::Protocol(_)), "got {err:?}");

    // A poll body without a status field is a protocol error too; callers
    // must never read a malformed response as "still pending".
    let err = client.fetch_status("whatever").await.unwrap_err();
    assert!(matches!(err, ApiError::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing is listening on this port.
    let client = client_for("http://127.0.0.1:9".to_string());
    let err = client.create_session().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
}
