//! Pairing session and teacher identity data model
//!
//! Everything here mirrors what the device-auth service sends over the wire.
//! Session identifiers, QR payloads and auth tokens are server-issued and
//! opaque to this client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-side pairing session awaiting authorization
///
/// Created by a successful session-creation call, immutable afterwards.
/// A retry supersedes it with a fresh session; a terminal transition
/// discards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingSession {
    /// Opaque server-issued identifier, unique per pairing attempt
    pub session_id: String,
    /// Opaque string to encode into the scannable barcode
    pub qr_payload: String,
    /// Instant after which the session is no longer valid
    pub expires_at: DateTime<Utc>,
}

impl PairingSession {
    /// Lifetime left before this session expires, measured from `now`.
    ///
    /// Returns `None` when the session is already expired.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        (self.expires_at - now).to_std().ok().filter(|d| !d.is_zero())
    }

    /// Whether the session has passed its expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining_lifetime(now).is_none()
    }

    /// First eight characters of the session id, for on-screen display
    pub fn short_id(&self) -> &str {
        let end = self
            .session_id
            .char_indices()
            .nth(8)
            .map_or(self.session_id.len(), |(i, _)| i);
        &self.session_id[..end]
    }
}

/// Profile of the authenticated teacher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub teacher_id: String,
    /// Display name
    pub name: String,
    pub school_id: String,
    /// Assigned class, e.g. "8B"
    pub class: String,
    /// Assigned subject, e.g. "Math"
    pub subject: String,
    #[serde(default)]
    pub all_classes: Vec<String>,
    #[serde(default)]
    pub all_subjects: Vec<String>,
    #[serde(default)]
    pub is_class_teacher: bool,
}

/// Authorization state reported by a status poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Pending,
    Authorized,
    /// Any status string this client does not recognize. Treated exactly
    /// like `Pending`: the session stays open until authorized or expired.
    Unknown,
}

impl<'de> Deserialize<'de> for AuthStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "pending" => AuthStatus::Pending,
            "authorized" => AuthStatus::Authorized,
            _ => AuthStatus::Unknown,
        })
    }
}

/// Outcome of one status poll
///
/// Produced fresh by each poll; only the terminal authorized instance is
/// retained, and it is consumed exactly once by the credential handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationResult {
    pub status: AuthStatus,
    /// Present only once the session is authorized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Present only once the session is authorized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherProfile>,
}

impl AuthorizationResult {
    /// The credentials, if and only if this poll completed the login.
    ///
    /// Requires `status == Authorized` with both the token and the profile
    /// present; an authorized status missing either field counts as still
    /// pending.
    pub fn credentials(&self) -> Option<(&str, &TeacherProfile)> {
        if self.status != AuthStatus::Authorized {
            return None;
        }
        match (&self.auth_token, &self.teacher) {
            (Some(token), Some(teacher)) => Some((token.as_str(), teacher)),
            _ => None,
        }
    }
}
