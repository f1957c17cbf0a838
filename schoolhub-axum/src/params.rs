//! Per-call request details handed to hooks and services.
//!
//! REST handlers build these from the incoming request. Code running inside
//! the server (seeding, admin pages) uses [`RestParams::internal`] so hooks can
//! tell the two apart.

use std::collections::HashMap;
use std::fmt;

use axum::http::{HeaderMap, Method, Uri};

/// Where a service call came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provider {
    Rest,
    #[default]
    Internal,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Rest => "rest",
            Provider::Internal => "internal",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RestParams {
    pub provider: Provider,
    /// Header names are lowercase; non-UTF-8 values are skipped.
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub method: Method,
    pub path: String,
}

impl RestParams {
    pub fn from_request(
        headers: &HeaderMap,
        query: HashMap<String, String>,
        method: Method,
        uri: &Uri,
    ) -> Self {
        let headers = headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_owned(), value.to_owned()))
            })
            .collect();

        Self {
            provider: Provider::Rest,
            headers,
            query,
            method,
            path: uri.path().to_owned(),
        }
    }

    /// Params for calls that originate inside the server (seeding, pages).
    pub fn internal() -> Self {
        Self::default()
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// Conversion from the REST request details into the app's params type.
pub trait FromRestParams: Sized {
    fn from_rest_params(params: RestParams) -> Self;
}

impl FromRestParams for RestParams {
    fn from_rest_params(params: RestParams) -> Self {
        params
    }
}

/// Apps that ignore request details.
impl FromRestParams for () {
    fn from_rest_params(_: RestParams) -> Self {}
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn request_params_keep_text_headers_and_query() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Role", HeaderValue::from_static("teacher"));
        headers.insert("x-blob", HeaderValue::from_bytes(&[0xfe, 0xff]).unwrap());
        let query = HashMap::from([("onDelete".to_string(), "cascade".to_string())]);
        let uri: Uri = "/schools/sch_1?onDelete=cascade".parse().unwrap();

        let params = RestParams::from_request(&headers, query, Method::DELETE, &uri);

        assert_eq!(params.provider, Provider::Rest);
        assert_eq!(params.headers.get("x-role").map(String::as_str), Some("teacher"));
        assert!(!params.headers.contains_key("x-blob"));
        assert_eq!(params.query_value("onDelete"), Some("cascade"));
        assert_eq!(params.method, Method::DELETE);
        assert_eq!(params.path, "/schools/sch_1");
    }

    #[test]
    fn internal_params_are_empty() {
        let params = RestParams::internal();
        assert_eq!(params.provider.to_string(), "internal");
        assert!(params.query.is_empty());
        assert!(params.headers.is_empty());
    }
}
