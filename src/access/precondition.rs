//! Read-then-mutate with optimistic concurrency control.

use super::{header_value, AccessClient, ApiError, Payload, ResourceRef};
use crate::http_utils::{HttpResponse, RequestBody};
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, IF_MATCH};
use tracing::{debug, trace};

pub const JSON_PATCH_MEDIA_TYPE: &str = "application/json-patch+json";

/// A change to an existing resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Full replace with PUT, expecting 200.
    Replace(Payload),
    /// JSON Patch document sent with PATCH, expecting 204.
    Patch(String),
    /// DELETE, expecting 204.
    Delete,
}

impl AccessClient {
    /// Reads `resource` for its entity tag and issues `mutation` with `If-Match`.
    ///
    /// `headers` must already be authenticated. The mutation is never sent if the
    /// read fails; the read's error is returned instead. An absent tag leaves
    /// `If-Match` unset, anything else is forwarded unchecked.
    pub async fn mutate_with_precondition(
        &self,
        resource: &ResourceRef,
        mutation: Mutation,
        mut headers: HeaderMap,
    ) -> Result<HttpResponse, ApiError> {
        let mut read_headers = headers.clone();
        if let Some(media_type) = &resource.media_type {
            read_headers.insert(ACCEPT, header_value(ACCEPT.as_str(), media_type)?);
        }

        trace!("Reading entity tag of {}", resource.path);
        let current = self.do_get(&resource.path, read_headers).await?;

        headers.remove(ACCEPT);
        match current.etag() {
            Some(tag) => {
                trace!("Using entity tag {:?}", tag);
                headers.insert(IF_MATCH, tag.clone());
            }
            None => debug!("No entity tag returned for {}", resource.path),
        }

        match mutation {
            Mutation::Replace(payload) => {
                let body = payload.into_body(&mut headers)?;
                self.do_put(&resource.path, headers, body).await
            }
            Mutation::Patch(document) => {
                headers.insert(
                    CONTENT_TYPE,
                    header_value(CONTENT_TYPE.as_str(), JSON_PATCH_MEDIA_TYPE)?,
                );
                self.do_patch(&resource.path, headers, RequestBody::Text(document))
                    .await
            }
            Mutation::Delete => self.do_delete(&resource.path, headers).await,
        }
    }
}
