//! Credential handoff seam
//!
//! The pairing state machine hands the terminal credentials to whatever the
//! host application wires in here. Implementations must tolerate being the
//! last step of a login: they are invoked exactly once per successful
//! attempt and must not fail the flow.

use crate::model::TeacherProfile;
use async_trait::async_trait;

/// Receives the credentials of a successfully authorized pairing attempt.
#[async_trait]
pub trait CredentialSink: Send + Sync {
    /// Called exactly once per successful attempt, with the server-issued
    /// auth token and the authenticated teacher's profile.
    async fn on_authorized(&self, auth_token: &str, teacher: &TeacherProfile);
}
