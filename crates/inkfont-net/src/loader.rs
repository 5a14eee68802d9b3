//! Requests
//!
//! Transport-neutral request description. URLs are endpoint paths; the
//! HTTP client resolves them against its configured base.

use std::collections::HashMap;

use serde::Serialize;

use crate::{FormData, NetError};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Request payload
#[derive(Debug, Clone)]
pub enum Body {
    Bytes(Vec<u8>),
    Form(FormData),
}

/// Request configuration
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Body>,
}

impl Request {
    pub fn get(url: &str) -> Self {
        Self {
            method: Method::Get,
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn post(url: &str) -> Self {
        Self {
            method: Method::Post,
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(Body::Bytes(body));
        self
    }

    /// Serialize `value` as the JSON body
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, NetError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| NetError::Decode(e.to_string()))?;
        Ok(self.with_header("Content-Type", "application/json").with_body(bytes))
    }

    /// Attach a multipart form
    pub fn with_form(mut self, form: FormData) -> Self {
        self.body = Some(Body::Form(form));
        self
    }

    /// The URL path without its query string
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or("")
    }

    /// Raw body bytes, if the body is not a form
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.body {
            Some(Body::Bytes(b)) => Some(b),
            _ => None,
        }
    }

    /// Form body, if any
    pub fn form(&self) -> Option<&FormData> {
        match &self.body {
            Some(Body::Form(f)) => Some(f),
            _ => None,
        }
    }
}
