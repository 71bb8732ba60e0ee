//! Bearer token and guest id shared by every outbound call.
//!
//! The upstream gateway occasionally hands out a fresh token or guest id in
//! its response headers. Whatever it sends replaces the in-memory value for
//! all subsequent requests. Nothing is persisted; a restart falls back to the
//! configured values.

use std::sync::Arc;

use arc_swap::ArcSwap;
use reqwest::header::HeaderMap;

/// Response headers that may carry a refreshed token, in priority order.
pub const TOKEN_HEADERS: [&str; 5] = [
    "authorization",
    "x-auth-token",
    "token",
    "x-api-key",
    "x-session-token",
];

/// Header carrying the guest id, both outbound and in responses.
pub const GUEST_ID_HEADER: &str = "x-guest-id";

const BEARER_PREFIX: &str = "Bearer ";
/// Base64 of `{"`, the start of every JWT header segment.
const JWT_PREFIX: &str = "eyJ";

/// A point-in-time copy of the credentials.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub auth_token: String,
    pub guest_id: String,
}

/// What a header scan changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CredentialRefresh {
    pub token_updated: bool,
    pub guest_id_updated: bool,
}

/// Lock-free credential store. Concurrent refreshes are last-writer-wins.
#[derive(Debug)]
pub struct CredentialStore {
    inner: ArcSwap<Credentials>,
}

impl CredentialStore {
    pub fn new(auth_token: impl Into<String>, guest_id: impl Into<String>) -> Self {
        Self {
            inner: ArcSwap::from_pointee(Credentials {
                auth_token: auth_token.into(),
                guest_id: guest_id.into(),
            }),
        }
    }

    /// Current credentials.
    pub fn snapshot(&self) -> Arc<Credentials> {
        self.inner.load_full()
    }

    /// Replace the token if it differs from the stored one.
    pub fn update_token(&self, token: &str) -> bool {
        if self.inner.load().auth_token == token {
            return false;
        }
        tracing::info!("Updating authentication token");
        self.inner.rcu(|current| Credentials {
            auth_token: token.to_string(),
            guest_id: current.guest_id.clone(),
        });
        true
    }

    /// Replace the guest id if it is non-empty and differs from the stored one.
    pub fn update_guest_id(&self, guest_id: &str) -> bool {
        if guest_id.is_empty() || self.inner.load().guest_id == guest_id {
            return false;
        }
        tracing::info!(guest_id = %guest_id, "Found new guest ID");
        self.inner.rcu(|current| Credentials {
            auth_token: current.auth_token.clone(),
            guest_id: guest_id.to_string(),
        });
        true
    }

    /// Inspect upstream response headers and pick up any new credentials.
    pub fn refresh_from_headers(&self, headers: &HeaderMap) -> CredentialRefresh {
        tracing::debug!(headers = ?headers, "Response headers");

        let mut refresh = CredentialRefresh::default();

        if let Some((header, token)) = find_token(headers) {
            tracing::info!(header = %header, "Found new token in response header");
            refresh.token_updated = self.update_token(token);
        }

        if let Some(guest_id) = first_value(headers, GUEST_ID_HEADER) {
            refresh.guest_id_updated = self.update_guest_id(guest_id);
        }

        refresh
    }
}

/// First token found among [`TOKEN_HEADERS`], with the header it came from.
///
/// Only the first value of each header is considered. Values that are neither
/// `Bearer <token>` nor a raw JWT are skipped.
pub fn find_token(headers: &HeaderMap) -> Option<(&'static str, &str)> {
    TOKEN_HEADERS.iter().find_map(|&name| {
        let value = first_value(headers, name)?;
        if let Some(token) = value.strip_prefix(BEARER_PREFIX) {
            Some((name, token))
        } else if value.starts_with(JWT_PREFIX) {
            Some((name, value))
        } else {
            None
        }
    })
}

fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        let h = headers(&[("authorization", "Bearer abc.def")]);
        assert_eq!(find_token(&h), Some(("authorization", "abc.def")));
    }

    #[test]
    fn raw_jwt_is_accepted() {
        let h = headers(&[("x-session-token", "eyJhbGciOiJSUzI1NiJ9.x.y")]);
        assert_eq!(find_token(&h), Some(("x-session-token", "eyJhbGciOiJSUzI1NiJ9.x.y")));
    }

    #[test]
    fn unrecognised_values_fall_through_to_next_header() {
        let h = headers(&[("authorization", "Basic Zm9vOmJhcg=="), ("token", "Bearer t2")]);
        assert_eq!(find_token(&h), Some(("token", "t2")));
    }

    #[test]
    fn header_priority_order() {
        let h = headers(&[("x-api-key", "Bearer later"), ("x-auth-token", "Bearer earlier")]);
        assert_eq!(find_token(&h), Some(("x-auth-token", "earlier")));
    }

    #[test]
    fn only_first_value_of_a_header_counts() {
        let h = headers(&[("authorization", "opaque"), ("authorization", "Bearer second")]);
        assert_eq!(find_token(&h), None);
    }

    #[test]
    fn refresh_updates_token_and_guest_id() {
        let store = CredentialStore::new("old", "guest-1");
        let h = headers(&[("x-auth-token", "Bearer new"), ("x-guest-id", "guest-2")]);

        let refresh = store.refresh_from_headers(&h);

        assert!(refresh.token_updated);
        assert!(refresh.guest_id_updated);
        let creds = store.snapshot();
        assert_eq!(creds.auth_token, "new");
        assert_eq!(creds.guest_id, "guest-2");
    }

    #[test]
    fn identical_values_are_not_updates() {
        let store = CredentialStore::new("same", "guest");
        let h = headers(&[("authorization", "Bearer same"), ("x-guest-id", "guest")]);
        assert_eq!(store.refresh_from_headers(&h), CredentialRefresh::default());
    }

    #[test]
    fn empty_guest_id_is_ignored() {
        let store = CredentialStore::new("t", "guest");
        assert!(!store.update_guest_id(""));
        assert_eq!(store.snapshot().guest_id, "guest");
    }
}
