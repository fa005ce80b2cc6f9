//! Device-auth HTTP client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classpair_core::{AuthStatus, AuthorizationResult, Config, PairingSession, TeacherProfile};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors returned by the session client
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or non-success HTTP status
    #[error("network error: {0}")]
    Network(String),
    /// Response body was malformed or missing required fields
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// Result type for session client operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Client contract for the device-auth endpoints
///
/// The pairing state machine only talks to this trait, so tests can drive it
/// with an in-process implementation.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Create a new pairing session
    async fn create_session(&self) -> ApiResult<PairingSession>;

    /// Query the authorization status of an existing session
    async fn fetch_status(&self, session_id: &str) -> ApiResult<AuthorizationResult>;
}

/// Response envelope used by the device-auth service
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// Session-creation body before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody {
    session_id: Option<String>,
    qr_payload: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// Status-poll body before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    status: Option<AuthStatus>,
    auth_token: Option<String>,
    teacher: Option<TeacherProfile>,
}

fn parse_session(body: &str) -> ApiResult<PairingSession> {
    let envelope: Envelope<SessionBody> = serde_json::from_str(body)
        .map_err(|e| ApiError::Protocol(format!("invalid session response: {e}")))?;
    let body = envelope
        .data
        .ok_or_else(|| ApiError::Protocol("session response missing data".to_string()))?;

    match (body.session_id, body.qr_payload, body.expires_at) {
        (Some(session_id), Some(qr_payload), Some(expires_at)) => Ok(PairingSession {
            session_id,
            qr_payload,
            expires_at,
        }),
        _ => Err(ApiError::Protocol(
            "session response missing required fields".to_string(),
        )),
    }
}

fn parse_status(body: &str) -> ApiResult<AuthorizationResult> {
    let envelope: Envelope<StatusBody> = serde_json::from_str(body)
        .map_err(|e| ApiError::Protocol(format!("invalid status response: {e}")))?;
    let body = envelope
        .data
        .ok_or_else(|| ApiError::Protocol("status response missing data".to_string()))?;
    let status = body
        .status
        .ok_or_else(|| ApiError::Protocol("status response missing status field".to_string()))?;

    Ok(AuthorizationResult {
        status,
        auth_token: body.auth_token,
        teacher: body.teacher,
    })
}

/// Production client for the device-auth service
#[derive(Debug, Clone)]
pub struct DeviceAuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl DeviceAuthClient {
    /// Create a new client from the application configuration
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_success_body(response: reqwest::Response) -> ApiResult<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Network(format!("server returned status {status}")));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl SessionApi for DeviceAuthClient {
    async fn create_session(&self) -> ApiResult<PairingSession> {
        let url = self.url("/device-auth/session");
        debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let body = Self::read_success_body(response).await?;
        parse_session(&body)
    }

    async fn fetch_status(&self, session_id: &str) -> ApiResult<AuthorizationResult> {
        let url = self.url(&format!("/device-auth/session/{session_id}"));
        debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let body = Self::read_success_body(response).await?;
        parse_status(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_complete() {
        let body = r#"{"data": {
            "sessionId": "s1",
            "qrPayload": "payload1",
            "expiresAt": "2099-01-01T00:00:00Z"
        }}"#;
        let session = parse_session(body).unwrap();
        assert_eq!(session.session_id, "s1");
        assert_eq!(session.qr_payload, "payload1");
    }

    #[test]
    fn test_parse_session_missing_field() {
        let body = r#"{"data": {"sessionId": "s1", "expiresAt": "2099-01-01T00:00:00Z"}}"#;
        assert!(matches!(parse_session(body), Err(ApiError::Protocol(_))));
    }

    #[test]
    fn test_parse_session_missing_data() {
        assert!(matches!(parse_session("{}"), Err(ApiError::Protocol(_))));
        assert!(matches!(
            parse_session(r#"{"data": null}"#),
            Err(ApiError::Protocol(_))
        ));
    }

    #[test]
    fn test_parse_session_garbage() {
        assert!(matches!(
            parse_session("<html>502</html>"),
            Err(ApiError::Protocol(_))
        ));
    }

    #[test]
    fn test_parse_status_pending() {
        let body = r#"{"data": {"status": "pending"}}"#;
        let result = parse_status(body).unwrap();
        assert_eq!(result.status, AuthStatus::Pending);
        assert!(result.auth_token.is_none());
        assert!(result.credentials().is_none());
    }

    #[test]
    fn test_parse_status_authorized() {
        let body = r#"{"data": {
            "status": "authorized",
            "authToken": "tok",
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
        }}"#;
        let result = parse_status(body).unwrap();
        let (token, teacher) = result.credentials().unwrap();
        assert_eq!(token, "tok");
        assert_eq!(teacher.class, "8B");
    }

    #[test]
    fn test_parse_status_unrecognized_value_is_pending_like() {
        let body = r#"{"data": {"status": "rejected"}}"#;
        let result = parse_status(body).unwrap();
        assert_eq!(result.status, AuthStatus::Unknown);
        assert!(result.credentials().is_none());
    }

    #[test]
    fn test_parse_status_missing_status_is_protocol_error() {
        // A body without the status field must fail loudly, never read as
        // "still pending".
        let body = r#"{"data": {"authToken": "tok"}}"#;
        assert!(matches!(parse_status(body), Err(ApiError::Protocol(_))));
    }
}
