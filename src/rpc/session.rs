use log::warn;
use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue, SET_COOKIE};

/// Authentication lifecycle of a client instance.
///
/// `LoggingIn` is a transient sub-state guarding against business calls
/// mid-handshake; the login exchange itself goes out anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginState {
    #[default]
    LoggedOut,
    LoggingIn,
    LoggedIn,
}

/// Session token, cookies, and login state owned by one client instance.
///
/// Created empty at client construction, populated by a successful login
/// exchange, and cleared by logout or a fatal auth error. Once a token is
/// stored it is attached to every subsequent request until explicitly
/// cleared; no request carries a stale token after logout.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    cookies: Vec<(String, String)>,
    state: LoginState,
    expired: bool,
}

impl Session {
    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// True after the server declared the session dead; business calls
    /// fail fast until the next login.
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Enters the login handshake with a clean slate.
    pub fn begin_login(&mut self) {
        self.token = None;
        self.cookies.clear();
        self.expired = false;
        self.state = LoginState::LoggingIn;
    }

    /// Completes the handshake. The token may be absent when the product
    /// authenticates through cookies alone.
    pub fn complete_login(&mut self, token: Option<String>) {
        self.token = token;
        self.expired = false;
        self.state = LoginState::LoggedIn;
    }

    /// Abandons a failed handshake.
    pub fn abort_login(&mut self) {
        self.token = None;
        self.cookies.clear();
        self.state = LoginState::LoggedOut;
    }

    /// Unconditionally clears all session state (logout path). Subsequent
    /// calls go out anonymous.
    pub fn invalidate(&mut self) {
        self.token = None;
        self.cookies.clear();
        self.expired = false;
        self.state = LoginState::LoggedOut;
    }

    /// Clears all session state in response to a server-reported expiry,
    /// flagging the session so the next call fails fast instead of
    /// repeating a doomed exchange.
    pub fn mark_expired(&mut self) {
        self.token = None;
        self.cookies.clear();
        self.state = LoginState::LoggedOut;
        self.expired = true;
    }

    /// Collects `Set-Cookie` pairs from a response for echoing on later
    /// requests. Attributes after the first `;` are dropped; a repeated
    /// name replaces the stored value.
    pub fn absorb_cookies(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            let pair = raw.split(';').next().unwrap_or("");
            let Some((name, val)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim().to_string();
            let val = val.trim().to_string();
            if name.is_empty() {
                continue;
            }
            if let Some(slot) = self.cookies.iter_mut().find(|(n, _)| *n == name) {
                slot.1 = val;
            } else {
                self.cookies.push((name, val));
            }
        }
    }

    /// Merges the session context (token header, cookies) into an outgoing
    /// request. Attaches nothing unless `LoggedIn`.
    pub fn apply(&self, headers: &mut HeaderMap, token_header: &str) {
        if self.state != LoginState::LoggedIn {
            return;
        }

        if let Some(token) = &self.token {
            match (
                HeaderName::from_bytes(token_header.as_bytes()),
                HeaderValue::from_str(token),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => {
                    warn!(header = token_header; "Session token not representable as a header, sending without it");
                }
            }
        }

        if !self.cookies.is_empty() {
            let line = self
                .cookies
                .iter()
                .map(|(n, v)| format!("{n}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            if let Ok(value) = HeaderValue::from_str(&line) {
                headers.insert(COOKIE, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_headers(set_cookie: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for raw in set_cookie {
            headers.append(SET_COOKIE, HeaderValue::from_str(raw).unwrap());
        }
        headers
    }

    #[test]
    fn fresh_session_attaches_nothing() {
        let session = Session::default();
        assert_eq!(session.state(), LoginState::LoggedOut);

        let mut headers = HeaderMap::new();
        session.apply(&mut headers, "X-Token");
        assert!(headers.is_empty());
    }

    #[test]
    fn login_lifecycle_attaches_token_and_cookies() {
        let mut session = Session::default();
        session.begin_login();
        assert_eq!(session.state(), LoginState::LoggingIn);

        session.absorb_cookies(&response_headers(&["SESSION_ID=abc123; Path=/; HttpOnly"]));
        session.complete_login(Some("tok-1".to_string()));
        assert_eq!(session.state(), LoginState::LoggedIn);

        let mut headers = HeaderMap::new();
        session.apply(&mut headers, "X-Token");
        assert_eq!(headers.get("X-Token").unwrap(), "tok-1");
        assert_eq!(headers.get(COOKIE).unwrap(), "SESSION_ID=abc123");
    }

    #[test]
    fn handshake_state_attaches_nothing() {
        let mut session = Session::default();
        session.begin_login();

        let mut headers = HeaderMap::new();
        session.apply(&mut headers, "X-Token");
        assert!(headers.is_empty());
    }

    #[test]
    fn repeated_cookie_name_replaces_value() {
        let mut session = Session::default();
        session.begin_login();
        session.absorb_cookies(&response_headers(&["SESSION_ID=old"]));
        session.absorb_cookies(&response_headers(&["SESSION_ID=new; Secure", "TOKEN=t1"]));
        session.complete_login(None);

        let mut headers = HeaderMap::new();
        session.apply(&mut headers, "X-Token");
        assert_eq!(headers.get(COOKIE).unwrap(), "SESSION_ID=new; TOKEN=t1");
        assert!(headers.get("X-Token").is_none());
    }

    #[test]
    fn invalidate_clears_everything() {
        let mut session = Session::default();
        session.begin_login();
        session.complete_login(Some("tok-1".to_string()));

        session.invalidate();

        assert_eq!(session.state(), LoginState::LoggedOut);
        assert!(session.token().is_none());
        assert!(!session.is_expired());

        let mut headers = HeaderMap::new();
        session.apply(&mut headers, "X-Token");
        assert!(headers.is_empty());
    }

    #[test]
    fn expiry_clears_state_and_sets_fail_fast_flag() {
        let mut session = Session::default();
        session.begin_login();
        session.complete_login(Some("tok-1".to_string()));

        session.mark_expired();

        assert_eq!(session.state(), LoginState::LoggedOut);
        assert!(session.is_expired());
        assert!(session.token().is_none());

        session.begin_login();
        assert!(!session.is_expired());
    }
}
