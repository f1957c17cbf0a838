//! Session extraction.
//!
//! Role and school arrive as request headers and are turned into a
//! [`TenantContext`] here, at the edge. Nothing below the handler reads
//! them again.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use schoolhub_core::{HubError, Role, TenantContext};

use crate::HubAxumError;

pub const ROLE_HEADER: &str = "x-role";
pub const TENANT_HEADER: &str = "x-tenant-id";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub fn session_from_headers(headers: &HeaderMap) -> Result<TenantContext, HubError> {
    let role: Role = header(headers, ROLE_HEADER)
        .ok_or_else(|| HubError::not_authenticated(format!("missing {ROLE_HEADER} header")))?
        .parse()?;

    TenantContext::resolve(role, header(headers, TENANT_HEADER))
}

/// Extractor form of [`session_from_headers`].
#[derive(Debug, Clone)]
pub struct Session(pub TenantContext);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = HubAxumError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session(session_from_headers(&parts.headers)?))
    }
}
