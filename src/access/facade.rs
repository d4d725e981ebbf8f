//! Uniform create/get/update/patch/download surface used by the service clients.
//! Delete lives in [`super::soft_delete`].

use super::{header_value, AccessClient, ApiError, Mutation, QueryParams, ResourceRef, ResponseShape};
use crate::http_utils::{FilePart, RequestBody};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, trace};

pub const ZIP_MEDIA_TYPE: &str = "application/zip";

/// Request body of a create or replace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    #[default]
    Empty,
    Json { content_type: String, body: String },
    Multipart(Vec<FilePart>),
}

impl Payload {
    pub fn json(body: impl Into<String>) -> Self {
        Payload::Json {
            content_type: mime::APPLICATION_JSON.to_string(),
            body: body.into(),
        }
    }

    pub fn typed(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Payload::Json {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub(crate) fn into_body(self, headers: &mut HeaderMap) -> Result<RequestBody, ApiError> {
        match self {
            Payload::Empty => Ok(RequestBody::Empty),
            Payload::Json { content_type, body } => {
                headers.insert(CONTENT_TYPE, header_value(CONTENT_TYPE.as_str(), &content_type)?);
                Ok(RequestBody::Text(body))
            }
            Payload::Multipart(parts) => Ok(RequestBody::Multipart(parts)),
        }
    }
}

impl AccessClient {
    /// POSTs a new resource. No precondition exists for something not yet created.
    pub async fn create(
        &mut self,
        resource: &ResourceRef,
        query: &QueryParams,
        payload: Payload,
        auth: bool,
    ) -> Result<Vec<Value>, ApiError> {
        let mut headers = self.headers(auth, resource.media_type.as_deref()).await?;
        let body = payload.into_body(&mut headers)?;
        let response = self.do_post(&query.apply(&resource.path), headers, body).await?;
        Ok(ResponseShape::parse(&response.body)?.into_many())
    }

    /// Lists a collection or looks up a single resource.
    pub async fn get(
        &mut self,
        resource: &ResourceRef,
        query: &QueryParams,
        auth: bool,
    ) -> Result<Vec<Value>, ApiError> {
        let headers = self.headers(auth, resource.media_type.as_deref()).await?;
        let response = self.do_get(&query.apply(&resource.path), headers).await?;
        Ok(ResponseShape::parse(&response.body)?.into_many())
    }

    /// Replaces an existing resource.
    pub async fn update(
        &mut self,
        resource: &ResourceRef,
        payload: Payload,
        auth: bool,
    ) -> Result<Vec<Value>, ApiError> {
        let headers = self.headers(auth, None).await?;
        let response = self
            .mutate_with_precondition(resource, Mutation::Replace(payload), headers)
            .await?;
        Ok(ResponseShape::parse(&response.body)?.into_many())
    }

    /// Applies a JSON Patch and returns the patched representation.
    pub async fn patch(
        &mut self,
        resource: &ResourceRef,
        document: String,
        auth: bool,
    ) -> Result<Vec<Value>, ApiError> {
        let headers = self.headers(auth, None).await?;
        self.mutate_with_precondition(resource, Mutation::Patch(document), headers)
            .await?;

        // PATCH answers 204 without a body
        trace!("Reading patched representation of {}", resource.path);
        self.get(resource, &QueryParams::new(), auth).await
    }

    /// Fetches the raw bytes of a resource. Collections are requested as zip archive
    /// and never addressed by version.
    pub async fn download(
        &mut self,
        resource: &ResourceRef,
        version: Option<u64>,
        auth: bool,
    ) -> Result<Vec<u8>, ApiError> {
        let (accept, query) = if resource.collection {
            if version.is_some() {
                debug!("Ignoring version for download of collection {}", resource.path);
            }
            (Some(ZIP_MEDIA_TYPE), QueryParams::new())
        } else {
            (
                resource.media_type.as_deref(),
                QueryParams::new().with("version", version),
            )
        };

        let headers = self.headers(auth, accept).await?;
        let response = self.do_get(&query.apply(&resource.path), headers).await?;
        Ok(response.body)
    }
}
