//! HTTP Client
//!
//! `Transport` over reqwest's blocking client. Endpoint paths are resolved
//! against the configured base URL.

use std::time::Duration;

use reqwest::blocking::multipart;
use url::Url;

use crate::{Body, FormData, FormDataValue, Method, NetError, Request, Response, Transport};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://127.0.0.1:5000`
    pub base_url: String,
    /// User agent string
    pub user_agent: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// Default headers
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            user_agent: format!("inkfont/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout: Duration::from_secs(10),
            // Uploads run segmentation server-side before answering.
            request_timeout: Duration::from_secs(120),
            default_headers: Vec::new(),
        }
    }
}

/// HTTP client builder
pub struct HttpClientBuilder {
    config: ClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.base_url = url.to_string();
        self
    }

    pub fn user_agent(mut self, ua: &str) -> Self {
        self.config.user_agent = ua.to_string();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        self.config.default_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> Result<HttpClient, NetError> {
        HttpClient::with_config(self.config)
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client
pub struct HttpClient {
    config: ClientConfig,
    base: Url,
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a client builder
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Create with custom config
    pub fn with_config(config: ClientConfig) -> Result<Self, NetError> {
        let base = parse_base(&config.base_url)?;

        let mut headers = reqwest::header::HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| NetError::Network(format!("Invalid header name {}: {}", name, e)))?;
            let value = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| NetError::Network(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let inner = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| NetError::Network(format!("Client setup failed: {}", e)))?;

        Ok(Self { config, base, inner })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve an endpoint path (or absolute URL) against the base URL
    pub fn resolve(&self, target: &str) -> Result<Url, NetError> {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Url::parse(target).map_err(|e| NetError::InvalidUrl(format!("{}: {}", target, e)));
        }
        self.base
            .join(target.trim_start_matches('/'))
            .map_err(|e| NetError::InvalidUrl(format!("{}: {}", target, e)))
    }
}

impl Transport for HttpClient {
    fn send(&self, request: Request) -> Result<Response, NetError> {
        let url = self.resolve(&request.url)?;
        tracing::info!("HTTP {} {}", request.method.as_str(), url);

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.inner.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(Body::Bytes(bytes)) => builder.body(bytes),
            Some(Body::Form(form)) => builder.multipart(to_multipart(form)?),
            None => builder,
        };

        let resp = builder.send()
            .map_err(|e| NetError::Network(format!("Request failed: {}", e)))?;

        let status = resp.status().as_u16();
        let headers = resp.headers().iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.bytes()
            .map_err(|e| NetError::Network(format!("Read failed: {}", e)))?
            .to_vec();

        tracing::debug!("HTTP {} ({} bytes)", status, body.len());
        Ok(Response { status, headers, body })
    }
}

fn parse_base(base_url: &str) -> Result<Url, NetError> {
    let mut base = Url::parse(base_url)
        .map_err(|e| NetError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(NetError::InvalidUrl(format!("Invalid scheme: {}", base_url)));
    }
    // Keep any path prefix when joining endpoint paths.
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn to_multipart(form: FormData) -> Result<multipart::Form, NetError> {
    let mut out = multipart::Form::new();
    for (name, value) in form.entries() {
        out = match value.clone() {
            FormDataValue::Text(text) => out.text(name.to_string(), text),
            FormDataValue::File { name: filename, content, content_type } => {
                let part = multipart::Part::bytes(content)
                    .file_name(filename)
                    .mime_str(&content_type)
                    .map_err(|e| NetError::Network(format!("Invalid content type: {}", e)))?;
                out.part(name.to_string(), part)
            }
        };
    }
    Ok(out)
}
