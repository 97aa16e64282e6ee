//! Token cookies.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Attributes applied to every token cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieConfig {
    /// Adds `Secure`; enable behind HTTPS.
    pub secure: bool,
}

impl CookieConfig {
    /// Renders a `Set-Cookie` value.
    pub fn set(&self, name: &str, value: &str, max_age_secs: u64) -> String {
        let mut cookie =
            format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Renders a `Set-Cookie` value that deletes the cookie.
    pub fn clear(&self, name: &str) -> String {
        self.set(name, "", 0)
    }
}

/// Reads a cookie from the request headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
