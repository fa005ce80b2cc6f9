//! Screen and navigation types
//!
//! The client has two screens: the QR login screen and the home screen.
//! Navigation is one-way: a reset replaces the whole stack, so a consumed
//! single-use login session can never be navigated back to.

/// The screens of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// QR login screen, shown until a pairing attempt succeeds
    QrLogin,
    /// Post-login welcome screen
    Home,
}

/// A navigation request from the core to the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRequest {
    /// Replace the navigation history with the given screen
    ResetTo(Screen),
}
