//! Pairing state machine and its driver task

use std::sync::Arc;

use chrono::Utc;
use classpair_api::SessionApi;
use classpair_core::{Config, CredentialSink, PairingSession};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Message shown when the service hands out a session that is already dead.
const ERR_ALREADY_EXPIRED: &str = "QR code already expired. Please refresh.";
/// Message shown when the session outlives its authorization window.
const ERR_EXPIRED: &str = "QR code expired. Please refresh.";

/// Lifecycle phase of a pairing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingPhase {
    /// Creating a session on the service
    Generating,
    /// Session live, polling for authorization
    Waiting,
    /// A companion device authorized the session; credentials handed off
    Authorized,
    /// Attempt failed; waiting for a user-initiated retry
    Error,
}

impl std::fmt::Display for PairingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairingPhase::Generating => write!(f, "generating"),
            PairingPhase::Waiting => write!(f, "waiting"),
            PairingPhase::Authorized => write!(f, "authorized"),
            PairingPhase::Error => write!(f, "error"),
        }
    }
}

/// Read-only view of the current pairing state
///
/// The session is present exactly in the waiting and authorized phases;
/// the error message is present exactly in the error phase. Constructors
/// below are the only way a snapshot is built, which keeps that invariant
/// out of reach of the rest of the crate.
#[derive(Debug, Clone)]
pub struct PairingSnapshot {
    pub phase: PairingPhase,
    session: Option<PairingSession>,
    last_error: Option<String>,
}

impl PairingSnapshot {
    fn generating() -> Self {
        Self {
            phase: PairingPhase::Generating,
            session: None,
            last_error: None,
        }
    }

    fn waiting(session: PairingSession) -> Self {
        Self {
            phase: PairingPhase::Waiting,
            session: Some(session),
            last_error: None,
        }
    }

    fn authorized(session: PairingSession) -> Self {
        Self {
            phase: PairingPhase::Authorized,
            session: Some(session),
            last_error: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            phase: PairingPhase::Error,
            session: None,
            last_error: Some(message.into()),
        }
    }

    /// The live session, in the waiting and authorized phases
    pub fn session(&self) -> Option<&PairingSession> {
        self.session.as_ref()
    }

    /// Opaque payload to render as a QR code, while a session is live
    pub fn qr_payload(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.qr_payload.as_str())
    }

    /// Truncated session id for on-screen display
    pub fn short_session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.short_id())
    }

    /// Failure message, in the error phase
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

enum Command {
    Retry,
}

enum AttemptEnd {
    Authorized,
    Failed(String),
}

/// Handle to a running pairing flow
///
/// Spawns a single driver task that owns the whole lifecycle. Dropping the
/// handle (or calling [`shutdown`](Self::shutdown)) aborts the task, which
/// cancels both timers and stops all polling; no callback can fire into a
/// torn-down attempt.
pub struct PairingFlow {
    state_rx: watch::Receiver<PairingSnapshot>,
    retry_tx: mpsc::Sender<Command>,
    driver: JoinHandle<()>,
}

impl PairingFlow {
    /// Start a new pairing flow and its driver task
    pub fn start(
        api: Arc<dyn SessionApi>,
        sink: Arc<dyn CredentialSink>,
        config: Config,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(PairingSnapshot::generating());
        let (retry_tx, retry_rx) = mpsc::channel(1);
        let driver = tokio::spawn(drive(api, sink, config, state_tx, retry_rx));

        Self {
            state_rx,
            retry_tx,
            driver,
        }
    }

    /// Watch the flow's state snapshots
    pub fn subscribe(&self) -> watch::Receiver<PairingSnapshot> {
        self.state_rx.clone()
    }

    /// Current state snapshot
    pub fn snapshot(&self) -> PairingSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Request a fresh attempt with a brand-new session.
    ///
    /// Accepted only while the flow is in the error phase; retries are
    /// always user-initiated.
    pub fn retry(&self) {
        if self.state_rx.borrow().phase == PairingPhase::Error {
            let _ = self.retry_tx.try_send(Command::Retry);
        }
    }

    /// Tear the flow down. Cancels the poll and expiry timers and stops
    /// all network activity.
    pub fn shutdown(&self) {
        self.driver.abort();
    }
}

impl Drop for PairingFlow {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(
    api: Arc<dyn SessionApi>,
    sink: Arc<dyn CredentialSink>,
    config: Config,
    state_tx: watch::Sender<PairingSnapshot>,
    mut retry_rx: mpsc::Receiver<Command>,
) {
    loop {
        match run_attempt(api.as_ref(), sink.as_ref(), &config, &state_tx).await {
            AttemptEnd::Authorized => return,
            AttemptEnd::Failed(message) => {
                warn!("pairing attempt failed: {message}");
                state_tx.send_replace(PairingSnapshot::error(message));

                // Hold in the error phase until the user asks for another
                // attempt. A closed channel means the owning handle is gone.
                match retry_rx.recv().await {
                    Some(Command::Retry) => continue,
                    None => return,
                }
            }
        }
    }
}

/// One attempt: create a session, wait for authorization or expiry.
///
/// Both timers live in this future, so returning from it on any path is
/// what cancels them. That makes a second terminal transition structurally
/// impossible: once authorized, no stale poll or expiry fire exists to
/// change the phase or re-invoke the sink.
async fn run_attempt(
    api: &dyn SessionApi,
    sink: &dyn CredentialSink,
    config: &Config,
    state_tx: &watch::Sender<PairingSnapshot>,
) -> AttemptEnd {
    state_tx.send_replace(PairingSnapshot::generating());

    let session = match api.create_session().await {
        Ok(session) => session,
        Err(e) => return AttemptEnd::Failed(e.to_string()),
    };

    let Some(lifetime) = session.remaining_lifetime(Utc::now()) else {
        return AttemptEnd::Failed(ERR_ALREADY_EXPIRED.to_string());
    };

    info!(session = %session.short_id(), "pairing session created, waiting for authorization");
    state_tx.send_replace(PairingSnapshot::waiting(session.clone()));

    // One-shot expiry timer for the session's remaining lifetime.
    let expiry = time::sleep(lifetime);
    tokio::pin!(expiry);

    // Poll timer; first tick fires one full interval after entering the
    // waiting phase. Skipping missed ticks keeps status requests serialized
    // when a response is slower than the interval.
    let mut poll = time::interval_at(Instant::now() + config.poll_interval, config.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut expiry => {
                return AttemptEnd::Failed(ERR_EXPIRED.to_string());
            }
            _ = poll.tick() => {
                match api.fetch_status(&session.session_id).await {
                    Ok(result) => {
                        if let Some((token, teacher)) = result.credentials() {
                            state_tx.send_replace(PairingSnapshot::authorized(session.clone()));
                            sink.on_authorized(token, teacher).await;
                            return AttemptEnd::Authorized;
                        }
                        // Anything short of a complete authorization
                        // (pending, unknown status, missing token or
                        // profile) keeps the session open.
                        debug!(session = %session.short_id(), "authorization still pending");
                    }
                    Err(e) => {
                        // Poll failures are transient by assumption: the
                        // session is still valid, the next tick retries.
                        warn!(session = %session.short_id(), "status poll failed: {e}");
                    }
                }
            }
        }
    }
}
