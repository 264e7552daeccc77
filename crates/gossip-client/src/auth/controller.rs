//! The authentication state machine.
//!
//! Owns the published session projection and drives the popup OAuth
//! lifecycle: sign-in opens the provider's begin endpoint in a separate
//! browsing context, completion arrives out of band as an
//! [`AuthEvent::OAuthCompleted`], and the outcome is read back through the
//! cookie relay. Every transition that needs fresh truth re-derives the
//! session from the server in [`AuthController::reconcile_session`] instead
//! of patching fields locally.

use std::future::Future;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::auth::client::{ClientError, SessionClient};
use crate::auth::cookie::{self, CookieSource, OAuthOutcome, RESULT_COOKIE};
use crate::auth::events::{AuthEvent, AuthEventRx};
use crate::auth::token::{self, TokenStore};
use crate::config::AppConfig;
use crate::session::Session;

/// Path prefix of the per-provider OAuth begin endpoint.
pub const OAUTH_BEGIN_PATH: &str = "oauth/begin";

/// Controller lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// No live credential.
    Unauthenticated,
    /// A sign-in popup is open; completion arrives out of band.
    Authenticating,
    /// Signed in with a display name.
    Authenticated,
    /// Signed in, first-login naming prompt active.
    AwaitingDisplayName,
}

/// Opens the OAuth begin URL in a separate browsing context.
pub trait PopupOpener {
    /// # Errors
    /// Returns an error if the popup could not be opened.
    fn open_popup(&self, url: &str) -> Result<()>;
}

/// Default opener delegating to the system browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl PopupOpener for SystemOpener {
    fn open_popup(&self, url: &str) -> Result<()> {
        open::that(url)?;
        Ok(())
    }
}

/// Blocking first-login naming collaborator.
///
/// Yields the candidate display name, or `None` when the user dismissed the
/// prompt. The controller performs the server call itself and re-derives the
/// session afterwards, so the prompt stays pure UI.
pub trait NamingPrompt {
    fn request_name(
        &mut self,
        user_id: &str,
    ) -> impl Future<Output = Option<String>> + Send;
}

/// The client-side authentication state machine.
///
/// Long-lived and re-entrant for the life of the application session; there
/// are no terminal states. Single writer by construction: the embedding host
/// holds the controller `&mut` on one task and observers read the session
/// through [`AuthController::subscribe`] handles.
pub struct AuthController<P, C> {
    config: AppConfig,
    phase: AuthPhase,
    store: TokenStore,
    client: SessionClient,
    cookies: C,
    popup: Box<dyn PopupOpener + Send + Sync>,
    prompt: P,
    session_tx: watch::Sender<Session>,
}

impl<P, C> AuthController<P, C>
where
    P: NamingPrompt,
    C: CookieSource,
{
    /// Creates a controller in the unauthenticated state.
    pub fn new(client: SessionClient, store: TokenStore, cookies: C, prompt: P) -> Self {
        let (session_tx, _) = watch::channel(Session::signed_out());
        Self {
            config: AppConfig::default(),
            phase: AuthPhase::Unauthenticated,
            store,
            client,
            cookies,
            popup: Box::new(SystemOpener),
            prompt,
            session_tx,
        }
    }

    /// Replaces the popup opener (the system browser by default).
    #[must_use]
    pub fn with_popup_opener(mut self, popup: Box<dyn PopupOpener + Send + Sync>) -> Self {
        self.popup = popup;
        self
    }

    /// Read-only handle to the published session projection.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session_tx.subscribe()
    }

    /// The currently published session.
    pub fn session(&self) -> Session {
        self.session_tx.borrow().clone()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    /// The loaded application config (defaults until `startup` succeeds).
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Loads config (best effort) and performs the initial auth check.
    ///
    /// A config failure is logged and leaves the defaults in place; it never
    /// blocks the auth check.
    pub async fn startup(&mut self) {
        match AppConfig::fetch(self.client.http(), self.client.base_url()).await {
            Ok(config) => self.config = config,
            Err(e) => warn!("failed to load config: {e:#}"),
        }
        self.reconcile_session().await;
    }

    /// Runs startup, then applies events until every sender is dropped.
    pub async fn run(&mut self, mut rx: AuthEventRx) {
        self.startup().await;
        while let Some(event) = rx.recv().await {
            self.handle_event(event).await;
        }
    }

    /// Applies a single external event.
    pub async fn handle_event(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignIn { provider } => self.sign_in(&provider),
            AuthEvent::OAuthCompleted => self.oauth_completed().await,
            AuthEvent::SignOut => self.sign_out(),
        }
    }

    /// Opens the OAuth popup for the given provider.
    ///
    /// Fire and forget: the controller does not poll or wait; completion
    /// arrives later as [`AuthEvent::OAuthCompleted`]. Concurrent sign-ins
    /// each open their own popup and the last completion wins.
    pub fn sign_in(&mut self, provider: &str) {
        let url = format!("{}/{OAUTH_BEGIN_PATH}/{provider}", self.client.base_url());
        if let Err(e) = self.popup.open_popup(&url) {
            warn!("failed to open sign-in popup for {provider}: {e:#}");
            return;
        }
        debug!("sign-in popup opened for {provider}");
        self.phase = AuthPhase::Authenticating;
    }

    /// Handles the out-of-band completion signal from the popup.
    ///
    /// Safe from any phase: truth comes from the result cookie plus a fresh
    /// session fetch, never from state captured at sign-in time.
    pub async fn oauth_completed(&mut self) {
        match cookie::read_result(&self.cookies, RESULT_COOKIE) {
            OAuthOutcome::Success(new_token) => {
                if let Err(e) = self.store.save(&new_token) {
                    warn!("failed to persist token, signing out: {e:#}");
                    self.sign_out();
                    return;
                }
                debug!("oauth flow succeeded, token {}", token::mask_token(&new_token));
                self.reconcile_session().await;
            }
            OAuthOutcome::Error(reason) => self.oauth_error(&reason),
            OAuthOutcome::Malformed => self.oauth_error("Unknown"),
        }
    }

    fn oauth_error(&mut self, reason: &str) {
        // The server reports this reason for accounts it refuses to sign in.
        if reason == "UserBlocked" {
            warn!("oauth error: user is blocked");
        } else {
            warn!("oauth error: {reason}");
        }
        self.sign_out();
    }

    /// Clears the stored token and active credential and publishes the
    /// signed-out session. Idempotent; safe from any phase.
    pub fn sign_out(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!("failed to clear stored token: {e:#}");
        }
        self.client.clear_credential();
        self.publish(Session::signed_out());
        self.phase = AuthPhase::Unauthenticated;
    }

    /// Re-derives the session from storage plus the server.
    ///
    /// Loads the stored token as the active credential (storage failures
    /// degrade to no token), then loops on `fetch_me` until a resting state.
    /// The first-login naming sub-flow triggers another round rather than
    /// trusting the prompt's local outcome, so a session with an empty name
    /// is never published as a resting state.
    pub async fn reconcile_session(&mut self) {
        let stored = self.store.load().unwrap_or_else(|e| {
            warn!("token storage unavailable, treating as signed out: {e:#}");
            None
        });
        self.client.set_credential(stored);

        loop {
            let session = match self.client.fetch_me().await {
                Ok(session) => session,
                Err(ClientError::CredentialRejected) => {
                    debug!("stored credential rejected by the server");
                    self.sign_out();
                    return;
                }
                Err(ClientError::Transport(msg)) => {
                    // No auth determination can be made; keep the last
                    // published session until the next natural trigger.
                    warn!("session check failed: {msg}");
                    return;
                }
            };

            match session.user().cloned() {
                Some(user) if user.name.is_empty() => {
                    self.phase = AuthPhase::AwaitingDisplayName;
                    if !self.run_naming_prompt(&user.id).await {
                        self.sign_out();
                    }
                    // Either way the next round re-derives from the server.
                }
                Some(_) => {
                    self.phase = AuthPhase::Authenticated;
                    self.publish(session);
                    return;
                }
                None => {
                    self.phase = AuthPhase::Unauthenticated;
                    self.publish(Session::signed_out());
                    return;
                }
            }
        }
    }

    /// Runs the naming prompt and pushes the result to the server.
    ///
    /// Returns whether the server accepted a new name.
    async fn run_naming_prompt(&mut self, user_id: &str) -> bool {
        let Some(name) = self.prompt.request_name(user_id).await else {
            debug!("naming prompt dismissed");
            return false;
        };

        match self.client.set_display_name(user_id, &name).await {
            Ok(true) => true,
            Ok(false) => {
                warn!("server refused display name {name:?}");
                false
            }
            Err(e) => {
                warn!("failed to set display name: {e}");
                false
            }
        }
    }

    fn publish(&self, session: Session) {
        self.session_tx.send_replace(session);
    }
}
