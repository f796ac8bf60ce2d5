//! In-process session store and session cookie helpers.
//!
//! Sessions are opaque random tokens mapped to user ids. The map lives in
//! process memory, so restarting the server logs everyone out.

use std::sync::Arc;

use dashmap::DashMap;

use crate::auth::password::generate_session_token;
use crate::types::UserId;

/// Token-to-user map shared across request handlers.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, UserId>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh token for a user and record it.
    pub fn create(&self, user_id: UserId) -> String {
        let token = generate_session_token();
        self.sessions.insert(token.clone(), user_id);
        token
    }

    /// Resolve a token to the user it was issued to.
    pub fn resolve(&self, token: &str) -> Option<UserId> {
        self.sessions.get(token).map(|entry| *entry.value())
    }

    /// Drop a single session. Returns false if the token was unknown.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every session belonging to a user. Used when an account is
    /// deactivated or deleted.
    pub fn revoke_for_user(&self, user_id: UserId) {
        self.sessions.retain(|_, v| *v != user_id);
    }
}

/// Build the Set-Cookie value that establishes a session.
pub fn session_cookie(cookie_name: &str, token: &str) -> String {
    format!("{cookie_name}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Build the Set-Cookie value that clears the session cookie.
pub fn clear_session_cookie(cookie_name: &str) -> String {
    format!("{cookie_name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Pull the session token out of a request's Cookie header, if present.
pub fn token_from_cookie_header(cookie_header: &str, cookie_name: &str) -> Option<String> {
    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=')
            && name == cookie_name
            && !value.is_empty()
        {
            return Some(value.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test_log::test]
    fn test_create_resolve_revoke() {
        let store = SessionStore::new();
        let user_id = Uuid::new_v4();

        let token = store.create(user_id);
        assert_eq!(store.resolve(&token), Some(user_id));

        assert!(store.revoke(&token));
        assert_eq!(store.resolve(&token), None);

        // Revoking again is a no-op
        assert!(!store.revoke(&token));
    }

    #[test_log::test]
    fn test_revoke_for_user_leaves_other_sessions() {
        let store = SessionStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let alice_token1 = store.create(alice);
        let alice_token2 = store.create(alice);
        let bob_token = store.create(bob);

        store.revoke_for_user(alice);
        assert_eq!(store.resolve(&alice_token1), None);
        assert_eq!(store.resolve(&alice_token2), None);
        assert_eq!(store.resolve(&bob_token), Some(bob));
    }

    #[test_log::test]
    fn test_token_from_cookie_header() {
        let header = "theme=dark; hostelctl_session=abc123; other=1";
        assert_eq!(
            token_from_cookie_header(header, "hostelctl_session").as_deref(),
            Some("abc123")
        );
        assert_eq!(token_from_cookie_header(header, "missing"), None);
        assert_eq!(token_from_cookie_header("hostelctl_session=", "hostelctl_session"), None);
    }

    #[test_log::test]
    fn test_cookie_round_trip() {
        let set = session_cookie("hostelctl_session", "tok");
        assert!(set.starts_with("hostelctl_session=tok"));
        assert!(set.contains("HttpOnly"));

        let clear = clear_session_cookie("hostelctl_session");
        assert!(clear.contains("Max-Age=0"));
    }
}
