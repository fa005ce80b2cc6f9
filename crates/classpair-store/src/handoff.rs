//! Login handoff: persist identity fields, then request the screen switch

use crate::store::{CredentialStore, KEY_SELECTED_CLASS, KEY_TEACHER};
use async_trait::async_trait;
use classpair_core::{CredentialSink, NavRequest, Screen, TeacherProfile};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Consumes a successful pairing attempt.
///
/// Persists the teacher's class and display name, then asks the host
/// application for a one-way navigation reset onto the home screen. The
/// reset discards the login screen from history: the session it showed is
/// single-use and already consumed.
pub struct LoginHandoff {
    store: Arc<CredentialStore>,
    nav_tx: mpsc::Sender<NavRequest>,
}

impl LoginHandoff {
    /// Create a handoff writing to the given store and navigation channel
    pub fn new(store: Arc<CredentialStore>, nav_tx: mpsc::Sender<NavRequest>) -> Self {
        Self { store, nav_tx }
    }
}

#[async_trait]
impl CredentialSink for LoginHandoff {
    async fn on_authorized(&self, _auth_token: &str, teacher: &TeacherProfile) {
        info!(
            teacher = %teacher.name,
            class = %teacher.class,
            subject = %teacher.subject,
            "login authorized"
        );

        // Cached display values only; a failure here must not block the
        // login that just succeeded.
        if let Err(e) = self.store.set(KEY_SELECTED_CLASS, &teacher.class).await {
            warn!("Failed to persist selected class: {}", e);
        }
        if let Err(e) = self.store.set(KEY_TEACHER, &teacher.name).await {
            warn!("Failed to persist teacher name: {}", e);
        }

        if self
            .nav_tx
            .send(NavRequest::ResetTo(Screen::Home))
            .await
            .is_err()
        {
            warn!("Navigation channel closed before handoff completed");
        }
    }
}
