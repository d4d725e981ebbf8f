//! Shared access layer for the KIT Data Manager services.
//!
//! [`AccessClient`] bundles the transport, the base URL of one service and the
//! [`SessionManager`] of the current invocation. The request helpers in this module
//! enforce the status-code contract of the services; the submodules build the
//! conditional mutation protocol, the two-phase delete and the uniform facade on top
//! of them.

pub mod facade;
pub mod precondition;
pub mod soft_delete;

pub use facade::Payload;
pub use precondition::Mutation;
pub use soft_delete::{DeleteMode, DeleteOutcome};

use crate::http_utils::{HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportError};
use crate::session::{AuthError, SessionManager};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, trace};
use url::form_urlencoded;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{method} {url} failed with HTTP {status}: {body}")]
    UnexpectedStatus {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),
    #[error("failed to parse response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid header value for {name}")]
    InvalidHeader { name: String },
    #[error("{0}")]
    Unsupported(String),
}

/// How a resource reacts to delete requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteSupport {
    /// Revoked by the first delete, purged by the second.
    Lifecycle,
    /// Removed by a single delete, without a revoked state.
    Immediate,
    /// Delete requests are rejected before any network call.
    Unsupported,
}

/// A remote entity as seen by the protocol layer.
///
/// `path` is relative to the service base URL and already contains the identifier.
/// Query parameters are supplied per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub path: String,
    pub media_type: Option<String>,
    pub collection: bool,
    pub delete: DeleteSupport,
}

impl ResourceRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            media_type: None,
            collection: false,
            delete: DeleteSupport::Unsupported,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn as_collection(mut self, collection: bool) -> Self {
        self.collection = collection;
        self
    }

    pub fn with_delete(mut self, delete: DeleteSupport) -> Self {
        self.delete = delete;
        self
    }
}

/// Server responses are either one object or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResponseShape {
    Many(Vec<Value>),
    Single(Value),
}

impl ResponseShape {
    /// Parses a response body. An empty body is an empty list.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(ResponseShape::Many(Vec::new()));
        }
        serde_json::from_slice(body)
    }

    pub fn into_many(self) -> Vec<Value> {
        match self {
            ResponseShape::Many(values) => values,
            ResponseShape::Single(value) => vec![value],
        }
    }
}

/// Ordered query parameters. Absent values are skipped when the path is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, Option<String>)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: ToString>(mut self, name: &str, value: Option<V>) -> Self {
        self.0
            .push((name.to_string(), value.map(|v| v.to_string())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(_, value)| value.is_none())
    }

    /// Appends the present parameters to `path`, the first after `?` and the rest
    /// after `&`. Values are percent-encoded.
    pub fn apply(&self, path: &str) -> String {
        let mut result = path.to_string();
        let mut separator = if path.contains('?') { '&' } else { '?' };
        for (name, value) in &self.0 {
            if let Some(value) = value {
                result.push(separator);
                result.push_str(name);
                result.push('=');
                result.extend(form_urlencoded::byte_serialize(value.as_bytes()));
                separator = '&';
            }
        }
        result
    }
}

/// Client for one service, owning the session of the current invocation.
pub struct AccessClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    session: SessionManager,
}

impl AccessClient {
    pub fn new(base_url: &str, transport: Arc<dyn HttpTransport>, session: SessionManager) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fresh request headers with an optional `Accept` value, authenticated if asked.
    pub(crate) async fn headers(
        &mut self,
        auth: bool,
        accept: Option<&str>,
    ) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(accept) = accept {
            headers.insert(ACCEPT, header_value(ACCEPT.as_str(), accept)?);
        }
        self.session.ensure_authenticated(auth, &mut headers).await?;
        Ok(headers)
    }

    async fn expect(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: RequestBody,
        expected: StatusCode,
    ) -> Result<HttpResponse, ApiError> {
        let url = self.url(path);
        let request = HttpRequest::new(method.clone(), url.clone(), headers).with_body(body);
        let response = self.transport.execute(request).await?;

        if response.status != expected {
            let body = response.body_text();
            error!(
                "Unexpected response from {} {}: HTTP {} {}",
                method, url, response.status, body
            );
            return Err(ApiError::UnexpectedStatus {
                method,
                url,
                status: response.status,
                body,
            });
        }

        trace!("{} {} succeeded with HTTP {}", method, url, response.status);
        Ok(response)
    }

    pub(crate) async fn do_get(&self, path: &str, headers: HeaderMap) -> Result<HttpResponse, ApiError> {
        debug!("Getting {}", path);
        self.expect(Method::GET, path, headers, RequestBody::Empty, StatusCode::OK)
            .await
    }

    pub(crate) async fn do_post(
        &self,
        path: &str,
        headers: HeaderMap,
        body: RequestBody,
    ) -> Result<HttpResponse, ApiError> {
        debug!("Creating {}", path);
        self.expect(Method::POST, path, headers, body, StatusCode::CREATED)
            .await
    }

    pub(crate) async fn do_put(
        &self,
        path: &str,
        headers: HeaderMap,
        body: RequestBody,
    ) -> Result<HttpResponse, ApiError> {
        debug!("Replacing {}", path);
        self.expect(Method::PUT, path, headers, body, StatusCode::OK)
            .await
    }

    pub(crate) async fn do_patch(
        &self,
        path: &str,
        headers: HeaderMap,
        body: RequestBody,
    ) -> Result<HttpResponse, ApiError> {
        debug!("Patching {}", path);
        self.expect(Method::PATCH, path, headers, body, StatusCode::NO_CONTENT)
            .await
    }

    pub(crate) async fn do_delete(&self, path: &str, headers: HeaderMap) -> Result<HttpResponse, ApiError> {
        debug!("Deleting {}", path);
        self.expect(
            Method::DELETE,
            path,
            headers,
            RequestBody::Empty,
            StatusCode::NO_CONTENT,
        )
        .await
    }
}

pub(crate) fn header_value(name: &str, value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader {
        name: name.to_string(),
    })
}
