//! External triggers for the auth state machine.
//!
//! Completion of the popup flow reaches the controller as an explicit event,
//! decoupled from whatever notification transport the host embeds (window
//! messaging, IPC, a test harness). Hosts without a channel can call the
//! controller's handler methods directly instead.

use tokio::sync::mpsc;

/// External auth triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// User chose a provider; open its sign-in popup.
    SignIn { provider: String },
    /// The popup navigated to its final destination and signalled the
    /// parent; the outcome is waiting in the result cookie.
    OAuthCompleted,
    /// User chose to sign out.
    SignOut,
}

/// Channel-based event sender.
pub type AuthEventTx = mpsc::Sender<AuthEvent>;

/// Channel-based event receiver.
pub type AuthEventRx = mpsc::Receiver<AuthEvent>;

/// Default channel capacity for auth events.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 32;

/// Creates a bounded auth event channel with the default capacity.
pub fn create_event_channel() -> (AuthEventTx, AuthEventRx) {
    mpsc::channel(DEFAULT_EVENT_CHANNEL_CAPACITY)
}
