//! Extract a bearer token from the `Authorization` header.

use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Optional token from `Authorization: Bearer <token>`. Absent when the header is missing or uses another scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| {
                let (scheme, rest) = s.trim().split_once(' ')?;
                scheme.eq_ignore_ascii_case("bearer").then(|| rest.trim().to_string())
            })
            .filter(|s| !s.is_empty());
        BearerToken(token)
    }
}
