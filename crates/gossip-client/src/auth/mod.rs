//! Authentication core: token storage, cookie relay, session client, and the
//! controller state machine that ties them together.

pub mod client;
pub mod controller;
pub mod cookie;
pub mod events;
pub mod token;

pub use client::{ClientError, SessionClient};
pub use controller::{AuthController, AuthPhase, NamingPrompt, PopupOpener, SystemOpener};
pub use cookie::{CookieSource, OAuthOutcome, RESULT_COOKIE};
pub use events::{AuthEvent, AuthEventRx, AuthEventTx, create_event_channel};
pub use token::TokenStore;
