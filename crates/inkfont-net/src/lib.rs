//! inkfont Networking
//!
//! Request/response plumbing shared by the session client and the reference
//! registry: the `Transport` seam, a reqwest-backed HTTP client, the JSON
//! envelope every endpoint answers with, and the endpoint wire types.

pub mod loader;
pub mod form;
pub mod client;
pub mod envelope;
pub mod api;

pub use loader::{Request, Method, Body};
pub use form::{FormData, FormDataValue};
pub use client::{HttpClient, HttpClientBuilder, ClientConfig};
pub use envelope::{Reply, decode, decode_strict};

/// Moves a request to a backend and brings back its response.
///
/// Implementations block; async callers run them under `smol::unblock`.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> Result<Response, NetError>;
}

/// HTTP Response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Build a response with a JSON body
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: value.to_string().into_bytes(),
        }
    }

    /// Get body as text
    pub fn text(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Check if response is successful
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Get header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| NetError::Decode(e.to_string()))
    }
}

/// Network error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}
