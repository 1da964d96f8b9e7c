// CSRF token handling for state-changing requests
use regex::Regex;
use std::sync::OnceLock;

pub const TOKEN_COOKIE: &str = "_xsrf";
pub const TOKEN_HEADER: &str = "X-Xsrftoken";

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(.+; *)?_xsrf *= *([^;" ]+)"#).expect("xsrf pattern is valid")
    })
}

/// Read the token out of a `Cookie` header style string.
pub fn token_from_cookies(cookies: &str) -> Option<&str> {
    token_pattern()
        .captures(cookies)
        .and_then(|captures| captures.get(2))
        .map(|token| token.as_str())
}

/// GET, HEAD and OPTIONS never carry the token.
pub fn requires_token(method: &str) -> bool {
    !matches!(method, "GET" | "HEAD" | "OPTIONS")
}
