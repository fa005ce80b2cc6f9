//! ClassPair Session - Pairing lifecycle state machine
//!
//! Owns one QR login attempt end to end: create a pairing session, publish
//! its QR payload, poll the service until a companion device authorizes the
//! session or it expires, then hand the credentials off exactly once.
//!
//! # Lifecycle
//!
//! ```text
//! generating ──▶ waiting ──▶ authorized   (terminal)
//!     ▲  │          │
//!     │  └──────────┴──────▶ error
//!     └──────── retry (user-initiated) ───┘
//! ```
//!
//! A single driver task owns the poll timer and the expiry timer; leaving
//! the waiting phase drops both, so a stale timer can never fire into a
//! finished attempt. The rest of the application observes the flow through
//! read-only [`PairingSnapshot`]s on a watch channel.
//!
//! # Example
//!
//! ```no_run
//! use classpair_api::DeviceAuthClient;
//! use classpair_core::Config;
//! use classpair_session::{PairingFlow, PairingPhase};
//! use std::sync::Arc;
//!
//! async fn example(sink: Arc<dyn classpair_core::CredentialSink>) {
//!     let config = Config::new();
//!     let api = Arc::new(DeviceAuthClient::new(&config));
//!     let flow = PairingFlow::start(api, sink, config);
//!
//!     let mut states = flow.subscribe();
//!     while states.changed().await.is_ok() {
//!         let snapshot = states.borrow().clone();
//!         if let Some(payload) = snapshot.qr_payload() {
//!             println!("render this: {payload}");
//!         }
//!         if snapshot.phase == PairingPhase::Authorized {
//!             break;
//!         }
//!     }
//! }
//! ```

pub mod machine;

pub use machine::{PairingFlow, PairingPhase, PairingSnapshot};
