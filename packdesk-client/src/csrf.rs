//! CSRF token lookup
//!
//! The backend expects the token in `X-CSRFToken` on every non-GET request.
//! It comes either from configuration or from the `csrftoken` cookie the
//! backend sets on the session.

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_COOKIE: &str = "csrftoken";

/// Extract the CSRF token from a `Cookie` header value (`a=1; csrftoken=xyz`)
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
