//! ClassPair API - Pairing session client
//!
//! Stateless HTTP client for the device-auth endpoints of the remote
//! authentication service:
//!
//! - `POST /device-auth/session` creates a pairing session and returns the
//!   QR payload to display.
//! - `GET /device-auth/session/{id}` reports whether the session has been
//!   authorized by a companion device.
//!
//! Retry policy lives with the caller; this crate only maps requests and
//! responses. Every response body is treated as untrusted: required fields
//! are validated before a [`PairingSession`] or [`AuthorizationResult`] is
//! constructed, and a malformed body is an [`ApiError::Protocol`] rather
//! than a silent default.
//!
//! [`PairingSession`]: classpair_core::PairingSession
//! [`AuthorizationResult`]: classpair_core::AuthorizationResult

pub mod client;

pub use client::{ApiError, ApiResult, DeviceAuthClient, SessionApi};
