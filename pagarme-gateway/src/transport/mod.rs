//! Transport abstraction.
//!
//! The [`Transport`] trait is the seam between request building and the
//! network. [`HttpTransport`] is the production implementation; tests plug in
//! an in-memory one.
//!
//! A transport receives a fully resolved [`TransportRequest`] (method, URL
//! with query, `Authorization` value and optional JSON body) and returns the
//! raw [`TransportResponse`]. Non-success statuses are reported as
//! [`GatewayError::ApiError`](crate::error::GatewayError::ApiError) with the
//! body preserved.

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;
use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::Value;
use url::Url;

use crate::{error::Result, request::HttpMethod};

pub mod http;

pub use http::HttpTransport;

/// Builds an HTTP Basic `Authorization` value with the API key as user name
/// and an empty password.
///
/// # Examples
///
/// ```
/// use pagarme_gateway::transport::basic_authorization;
///
/// assert_eq!(basic_authorization("sk_test"), "Basic c2tfdGVzdDo=");
/// ```
#[must_use]
pub fn basic_authorization(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{api_key}:")))
}

/// A fully resolved request.
#[derive(Clone)]
pub struct TransportRequest<'a> {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL, query included.
    pub url: Url,
    /// `Authorization` header value.
    pub authorization: &'a str,
    /// JSON body for POST requests.
    pub body: Option<&'a Value>,
}

impl fmt::Debug for TransportRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "api_key" { "[REDACTED]".to_owned() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        f.debug_struct("TransportRequest")
            .field("method", &self.method)
            .field("url", &url.as_str())
            .field("authorization", &"[REDACTED]")
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Raw response from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// Response headers.
    pub headers: Vec<(String, String)>,
}

/// Sends resolved requests to the API.
///
/// Implementations must return
/// [`GatewayError::ApiError`](crate::error::GatewayError::ApiError) for
/// non-success statuses so the body can be decoded into a
/// [`Response`](crate::response::Response). No retries are expected.
pub trait Transport: Send + Sync {
    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ApiError`](crate::error::GatewayError::ApiError)
    /// on a non-success status, or a transport error if no response arrived.
    fn send<'a>(
        &'a self,
        request: TransportRequest<'a>,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str {
        "http"
    }
}
