//! Detect htmx requests (`HX-Request: true`) so handlers can answer with fragments.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

pub const HX_REQUEST_HEADER: &str = "HX-Request";

#[derive(Clone, Copy, Debug)]
pub struct HxRequest(pub bool);

#[async_trait]
impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get(HX_REQUEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        Ok(HxRequest(is_htmx))
    }
}
