//! ClassPair Store - Durable credentials and login handoff
//!
//! A small JSON-file key-value store for the handful of identity fields the
//! client keeps between launches, and the [`LoginHandoff`] that consumes a
//! successful pairing attempt: persist the teacher's class and display name,
//! then ask the host application to reset navigation onto the home screen.
//!
//! Persistence here is a display convenience. A login whose credentials
//! fail to persist is still a login, so storage failures never block the
//! navigation reset.

pub mod handoff;
pub mod store;

pub use handoff::LoginHandoff;
pub use store::{CredentialStore, StoreError, StoreResult, KEY_SELECTED_CLASS, KEY_TEACHER};
