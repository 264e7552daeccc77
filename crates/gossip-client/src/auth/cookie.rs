//! OAuth result relay via the shared same-origin cookie.
//!
//! The popup's server-controlled redirect chain ends by writing
//! `gossip_oauth_result=<status>:<payload>` and signalling the parent window.
//! The parent reads the cookie back once per completed flow. Parsing is pure
//! and never clears the cookie; its lifecycle belongs to the server.

/// Name of the cookie carrying the OAuth outcome.
pub const RESULT_COOKIE: &str = "gossip_oauth_result";

/// Host seam standing in for the document cookie header.
///
/// Implementations return the raw `name=value; name2=value2` string the
/// embedding environment currently sees, or `None` when no cookies exist.
pub trait CookieSource {
    fn cookie_header(&self) -> Option<String>;
}

/// Outcome of one OAuth popup flow, as relayed through the result cookie.
///
/// Transient: read once per popup completion; the backing cookie's content
/// is irrelevant until the next flow overwrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthOutcome {
    /// The flow completed and produced a bearer token.
    Success(String),
    /// The server reported a failure reason (e.g. "UserBlocked").
    Error(String),
    /// The cookie was absent or not in `<status>:<payload>` form.
    Malformed,
}

impl OAuthOutcome {
    /// Parses a raw cookie value into an outcome.
    ///
    /// Exactly one `:` with a recognized status yields `Success`/`Error`;
    /// every other shape is `Malformed`.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return OAuthOutcome::Malformed;
        };

        let mut segments = raw.split(':');
        let (Some(status), Some(payload), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return OAuthOutcome::Malformed;
        };

        match status {
            "success" => OAuthOutcome::Success(payload.to_string()),
            "error" => OAuthOutcome::Error(payload.to_string()),
            _ => OAuthOutcome::Malformed,
        }
    }
}

/// Finds a cookie by exact name in a raw cookie header.
///
/// A name that is merely a substring (or suffix) of another cookie's name
/// does not match.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|cookie| {
        let (key, value) = cookie.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Reads and parses the OAuth result cookie from the source.
pub fn read_result(source: &impl CookieSource, name: &str) -> OAuthOutcome {
    let header = source.cookie_header();
    let raw = header.as_deref().and_then(|h| find_cookie(h, name));
    OAuthOutcome::parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: success and error values parse into their outcomes.
    #[test]
    fn test_parse_success_and_error() {
        assert_eq!(
            OAuthOutcome::parse(Some("success:tok123")),
            OAuthOutcome::Success("tok123".to_string())
        );
        assert_eq!(
            OAuthOutcome::parse(Some("error:UserBlocked")),
            OAuthOutcome::Error("UserBlocked".to_string())
        );
    }

    /// Test: every malformed shape collapses to Malformed.
    #[test]
    fn test_parse_malformed_shapes() {
        for raw in [
            None,
            Some(""),
            Some("success"),
            Some("success:a:b"),
            Some("denied:reason"),
            Some(":payload"),
        ] {
            assert_eq!(OAuthOutcome::parse(raw), OAuthOutcome::Malformed, "{raw:?}");
        }
    }

    /// Test: exact-name lookup across multiple cookies.
    #[test]
    fn test_find_cookie_exact_name() {
        let header = "foo=bar; gossip_oauth_result=success:tok; other=xyz";
        assert_eq!(find_cookie(header, "gossip_oauth_result"), Some("success:tok"));
        assert_eq!(find_cookie(header, "foo"), Some("bar"));
        assert_eq!(find_cookie(header, "missing"), None);
    }

    /// Test: a substring of another cookie's name does not match.
    #[test]
    fn test_find_cookie_rejects_substring_names() {
        let header = "xgossip_oauth_result=success:evil; gossip_oauth_result_old=success:stale";
        assert_eq!(find_cookie(header, "gossip_oauth_result"), None);

        let header = "xgossip_oauth_result=success:evil; gossip_oauth_result=success:good";
        assert_eq!(find_cookie(header, "gossip_oauth_result"), Some("success:good"));
    }

    /// Test: values keep everything after the first `=`.
    #[test]
    fn test_find_cookie_value_with_equals() {
        let header = "gossip_oauth_result=success:a=b";
        assert_eq!(find_cookie(header, "gossip_oauth_result"), Some("success:a=b"));
    }
}
