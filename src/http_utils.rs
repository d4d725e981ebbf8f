//! HTTP utilities for the kitdm client.
//!
//! This module provides the transport seam used by the access layer. Requests and
//! responses are plain values so the protocol code can be exercised against a fake
//! transport, while [`HttpClient`] sends them over the wire with reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, ETAG, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use tracing::{debug, trace};

/// Errors raised before a response could be obtained
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid multipart part '{name}': {source}")]
    InvalidPart {
        name: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// A single part of a multipart upload, fully read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub name: String,
    pub file_name: String,
    pub media_type: String,
    pub content: Vec<u8>,
}

/// Body of an outgoing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    #[default]
    Empty,
    Text(String),
    Multipart(Vec<FilePart>),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, url: String, headers: HeaderMap) -> Self {
        Self {
            method,
            url,
            headers,
            body: RequestBody::Empty,
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The entity tag of the response, if the server sent one.
    pub fn etag(&self) -> Option<&HeaderValue> {
        self.headers.get(ETAG)
    }

    /// The body as text, replacing invalid UTF-8 sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests to a remote service.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Configuration for HTTP requests with common settings
#[derive(Debug, Clone)]
pub struct HttpRequestConfig {
    /// Value of the User-Agent header sent with every request
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for HttpRequestConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("kitdm/{}", env!("CARGO_PKG_VERSION")),
            timeout: 1800, // 30 minutes, uploads and folder downloads can be large
        }
    }
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpRequestConfig,
}

impl HttpClient {
    pub fn new(config: HttpRequestConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(TransportError::ClientBuild)?;

        Ok(Self { client, config })
    }

    fn multipart_form(parts: Vec<FilePart>) -> Result<Form, TransportError> {
        let mut form = Form::new();
        for part in parts {
            let name = part.name.clone();
            let body = Part::bytes(part.content)
                .file_name(part.file_name)
                .mime_str(&part.media_type)
                .map_err(|source| TransportError::InvalidPart {
                    name: name.clone(),
                    source,
                })?;
            form = form.part(name, body);
        }
        Ok(form)
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!("Performing {} {}", request.method, request.url);

        let mut headers = request.headers;
        if let Ok(agent) = HeaderValue::from_str(&self.config.user_agent) {
            headers.entry(USER_AGENT).or_insert(agent);
        }

        let builder = self.client.request(request.method, &request.url);
        let builder = match request.body {
            RequestBody::Empty => builder.headers(headers),
            RequestBody::Text(text) => builder.headers(headers).body(text),
            RequestBody::Multipart(parts) => {
                trace!("Sending {} part(s) as multipart/form-data", parts.len());
                // reqwest sets the multipart content type including its boundary
                headers.remove(CONTENT_TYPE);
                builder.headers(headers).multipart(Self::multipart_form(parts)?)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|source| TransportError::Connection {
                url: request.url.clone(),
                source,
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Connection {
                url: request.url.clone(),
                source,
            })?
            .to_vec();

        trace!("Received HTTP {} with {} byte(s)", status, body.len());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
