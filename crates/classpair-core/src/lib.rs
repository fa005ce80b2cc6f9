//! ClassPair Core - Shared types for the QR pairing login flow
//!
//! This crate provides the foundational types used across all ClassPair
//! components: runtime configuration, the pairing session and teacher
//! identity data model, the credential handoff seam, and the screen
//! navigation types.

pub mod config;
pub mod model;
pub mod screen;
pub mod sink;

pub use config::Config;
pub use model::{AuthStatus, AuthorizationResult, PairingSession, TeacherProfile};
pub use screen::{NavRequest, Screen};
pub use sink::CredentialSink;
