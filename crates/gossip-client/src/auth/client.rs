//! HTTP client for the authenticated session endpoints.
//!
//! Carries the active bearer credential; the controller sets it from the
//! token store before each reconciliation and clears it on sign-out. Network
//! only: no storage or cookie access happens here.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::Session;

/// Session endpoint path ("who am I"), relative to the server base URL.
pub const ME_PATH: &str = "api/v1/me";
/// Display-name mutation endpoint path.
pub const SET_NAME_PATH: &str = "api/v1/me/name";

/// Failure classes for session calls.
///
/// Callers branch on the class: a rejected credential forces a sign-out and
/// is never retried with the same token, while a transport failure leaves
/// the session undetermined until the next natural trigger.
#[derive(Debug)]
pub enum ClientError {
    /// The presented bearer token was rejected (HTTP 401).
    CredentialRejected,
    /// The server was unreachable, answered an unexpected status, or the
    /// response body did not parse.
    Transport(String),
}

impl ClientError {
    /// Builds a transport error from a failure status and raw body,
    /// extracting the server's JSON `error` message when one is present.
    fn http_status(status: reqwest::StatusCode, body: &str) -> Self {
        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(msg) = json.get("error").and_then(|v| v.as_str())
        {
            return ClientError::Transport(format!("HTTP {status}: {msg}"));
        }
        ClientError::Transport(format!("HTTP {status}"))
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::CredentialRejected => write!(f, "credential rejected"),
            ClientError::Transport(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

#[derive(Serialize)]
struct SetNameRequest<'a> {
    id: &'a str,
    name: &'a str,
}

#[derive(Deserialize)]
struct SetNameResponse {
    success: bool,
}

/// Client for the gossip session endpoints.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    credential: Option<String>,
}

impl SessionClient {
    /// Creates a client for the given server base URL.
    ///
    /// A trailing `/` is trimmed so path joins stay canonical.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            credential: None,
        }
    }

    /// Returns the underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns the server base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sets (or unsets) the active bearer credential.
    pub fn set_credential(&mut self, token: Option<String>) {
        self.credential = token;
    }

    /// Clears the active bearer credential.
    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    /// True while a credential is active.
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Attaches the active credential, if any. Without one no
    /// `Authorization` header is sent at all (never an empty value).
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetches the server's view of the current session.
    ///
    /// A 200 with `authenticated=false` is a successful answer, not an
    /// error; it normalizes to [`Session::signed_out`].
    ///
    /// # Errors
    /// `CredentialRejected` when the server rejects the bearer token,
    /// `Transport` for any other failure.
    pub async fn fetch_me(&self) -> Result<Session, ClientError> {
        let request = self.authorize(self.http.get(self.url(ME_PATH)));
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let session: Session = Self::parse_response(response).await?;

        if !session.authenticated {
            return Ok(Session::signed_out());
        }
        if session.user.as_ref().is_none_or(|u| u.id.is_empty()) {
            return Err(ClientError::Transport(
                "authenticated session without a user".to_string(),
            ));
        }
        Ok(session)
    }

    /// Asks the server to set the display name for `user_id`.
    ///
    /// Returns whether the server accepted the update; the caller decides
    /// recovery policy.
    ///
    /// # Errors
    /// `CredentialRejected` when the server rejects the bearer token,
    /// `Transport` for any other failure.
    pub async fn set_display_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<bool, ClientError> {
        let request = self
            .authorize(self.http.post(self.url(SET_NAME_PATH)))
            .json(&SetNameRequest { id: user_id, name });
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let body: SetNameResponse = Self::parse_response(response).await?;
        Ok(body.success)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::CredentialRejected);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::http_status(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: trailing slashes are trimmed from the base URL.
    #[test]
    fn test_base_url_trimmed() {
        let client = SessionClient::new("https://example.com/forum/");
        assert_eq!(client.base_url(), "https://example.com/forum");
        assert_eq!(client.url(ME_PATH), "https://example.com/forum/api/v1/me");
    }

    /// Test: credential lifecycle.
    #[test]
    fn test_credential_lifecycle() {
        let mut client = SessionClient::new("https://example.com");
        assert!(!client.has_credential());
        client.set_credential(Some("tok".to_string()));
        assert!(client.has_credential());
        client.clear_credential();
        assert!(!client.has_credential());
    }

    /// Test: transport errors surface the server's JSON error message.
    #[test]
    fn test_http_status_extracts_error_message() {
        let err = ClientError::http_status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"database down"}"#,
        );
        let ClientError::Transport(msg) = err else {
            panic!("expected transport error");
        };
        assert!(msg.contains("database down"));
    }
}
