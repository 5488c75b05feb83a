//! Policy configuration for the workspace membership lifecycle.
//!
//! All policy constants that would otherwise be hardcoded live here, so an
//! embedding application can tune them without forking the crate.
//!
//! # Example
//!
//! ```rust
//! use anteroom::WorkspaceConfig;
//! use chrono::Duration;
//!
//! // Use defaults
//! let config = WorkspaceConfig::default();
//!
//! // Or customize
//! let config = WorkspaceConfig {
//!     invitation_expiry: Duration::days(14),
//!     enforce_unique_pending: false,
//! };
//! ```

use chrono::Duration;

/// Configuration for invitation policy.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// How long an invitation stays actionable after creation.
    ///
    /// Expiry is lazy: invitations past this horizon are filtered out of
    /// pending listings and rejected on accept/decline, but no background
    /// job rewrites their status. Default: 7 days.
    pub invitation_expiry: Duration,

    /// Reject a new invitation when a pending one already exists for the
    /// same workspace and email.
    ///
    /// Default: true. Turn this off if the product intentionally allows
    /// several concurrent invites to the same address.
    pub enforce_unique_pending: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            invitation_expiry: Duration::days(7),
            enforce_unique_pending: true,
        }
    }
}

impl WorkspaceConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }
}
