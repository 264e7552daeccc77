//! Session projection types.
//!
//! `Session` is the client's current belief about who is signed in. It is
//! recomputed wholesale from every successful `api/v1/me` response, never
//! patched field by field, so the client cannot drift from the server's view.

use serde::{Deserialize, Serialize};

/// A forum user as reported by the session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque server-assigned identifier.
    pub id: String,
    /// Display name. Empty until first-login naming completes.
    #[serde(default)]
    pub name: String,
}

/// The current authentication state.
///
/// Invariant: `authenticated == false` implies `user` is `None`;
/// `authenticated == true` implies `user` is present with a non-empty id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Session {
    /// The canonical signed-out value.
    pub fn signed_out() -> Self {
        Self {
            authenticated: false,
            user: None,
        }
    }

    /// Returns the user when authenticated.
    pub fn user(&self) -> Option<&User> {
        if self.authenticated {
            self.user.as_ref()
        } else {
            None
        }
    }

    /// True when the server authenticated the user but no display name is
    /// set yet (the first-login marker).
    pub fn needs_display_name(&self) -> bool {
        self.user().is_some_and(|u| u.name.is_empty())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::signed_out()
    }
}
