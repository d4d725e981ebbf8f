//! base-repo: data resources and their content.

use super::{string_field, ResourceClient, ServiceError, Upload};
use crate::access::{AccessClient, DeleteMode, DeleteOutcome, DeleteSupport, Payload, QueryParams, ResourceRef};
use crate::configuration::{BaseRepoSettings, TableColumns};
use crate::documents::{file_name, file_part, payload_part, read_json_document};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, trace};

pub const RESOURCES_PATH: &str = "api/v1/dataresources/";
pub const CONTENT_INFORMATION_MEDIA_TYPE: &str = "application/vnd.datamanager.content-information+json";

const RESOURCE_KEYS: [&str; 1] = ["resourceType"];

/// What a base-repo operation addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseRepoTarget {
    /// All data resources. Creating here creates a new resource.
    Resources,
    Resource(String),
    /// Content below a resource. A relative path ending in `/` is a folder.
    Content {
        resource_id: String,
        relative_path: String,
    },
}

impl BaseRepoTarget {
    /// Content when a relative path is given, otherwise the resource itself.
    pub fn for_identifier(resource_id: &str, relative_path: Option<&str>) -> Self {
        match relative_path {
            Some(path) if !path.is_empty() => BaseRepoTarget::Content {
                resource_id: resource_id.to_string(),
                relative_path: path.to_string(),
            },
            _ => BaseRepoTarget::Resource(resource_id.to_string()),
        }
    }
}

fn resource_path(resource_id: &str) -> String {
    format!("{}{}", RESOURCES_PATH, resource_id)
}

fn content_path(resource_id: &str, relative_path: &str) -> String {
    format!(
        "{}{}/data/{}",
        RESOURCES_PATH,
        resource_id,
        relative_path.trim_start_matches('/')
    )
}

pub struct BaseRepoClient {
    access: AccessClient,
    settings: BaseRepoSettings,
}

impl BaseRepoClient {
    pub fn new(access: AccessClient, settings: BaseRepoSettings) -> Self {
        Self { access, settings }
    }

    fn reference(&self, target: &BaseRepoTarget) -> ResourceRef {
        match target {
            BaseRepoTarget::Resources => {
                ResourceRef::new(RESOURCES_PATH).with_media_type(mime::APPLICATION_JSON.as_ref())
            }
            BaseRepoTarget::Resource(id) => ResourceRef::new(resource_path(id))
                .with_media_type(mime::APPLICATION_JSON.as_ref())
                .with_delete(DeleteSupport::Lifecycle),
            BaseRepoTarget::Content {
                resource_id,
                relative_path,
            } => ResourceRef::new(content_path(resource_id, relative_path))
                .with_media_type(CONTENT_INFORMATION_MEDIA_TYPE)
                .as_collection(relative_path.ends_with('/'))
                .with_delete(DeleteSupport::Immediate),
        }
    }

    async fn create_resource(&mut self, upload: &Upload, auth: bool) -> Result<Vec<Value>, ServiceError> {
        let metadata = read_json_document(upload.require_metadata()?, &RESOURCE_KEYS)?;
        let listing = ResourceRef::new(RESOURCES_PATH);
        Ok(self
            .access
            .create(&listing, &QueryParams::new(), Payload::json(metadata.text), auth)
            .await?)
    }

    async fn create_content(
        &mut self,
        resource_id: &str,
        relative_path: &str,
        upload: &Upload,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        let mut relative_path = relative_path.trim_start_matches('/').to_string();
        if relative_path.is_empty() || relative_path.ends_with('/') {
            let payload = upload.payload.as_deref().ok_or_else(|| {
                ServiceError::InvalidArgument(
                    "relative path must not end with a slash if no payload is provided".to_string(),
                )
            })?;
            relative_path.push_str(&file_name(payload)?);
        }

        let mut parts = Vec::new();
        if let Some(metadata) = &upload.metadata {
            let upload_name = file_name(metadata)?;
            parts.push(file_part("metadata", &upload_name, mime::APPLICATION_JSON.as_ref(), metadata)?);
        }
        if let Some(payload) = &upload.payload {
            parts.push(payload_part("file", payload)?);
        }
        if parts.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "content creation requires metadata, payload or both".to_string(),
            ));
        }

        let content = ResourceRef::new(content_path(resource_id, &relative_path))
            .with_media_type(CONTENT_INFORMATION_MEDIA_TYPE);
        debug!("Uploading content to {}", content.path);
        self.access
            .create(
                &ResourceRef::new(content.path.clone()),
                &QueryParams::new(),
                Payload::Multipart(parts),
                auth,
            )
            .await?;

        // the upload response carries no content information
        trace!("Reading content information of {}", content.path);
        Ok(self.access.get(&content, &QueryParams::new(), auth).await?)
    }
}

#[async_trait]
impl ResourceClient for BaseRepoClient {
    type Target = BaseRepoTarget;

    fn name(&self) -> &'static str {
        "base-repo"
    }

    fn access(&self) -> &AccessClient {
        &self.access
    }

    async fn create(
        &mut self,
        target: &BaseRepoTarget,
        upload: &Upload,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        match target {
            BaseRepoTarget::Resources => self.create_resource(upload, auth).await,
            BaseRepoTarget::Resource(id) => self.create_content(id, "/", upload, auth).await,
            BaseRepoTarget::Content {
                resource_id,
                relative_path,
            } => {
                self.create_content(resource_id, relative_path, upload, auth)
                    .await
            }
        }
    }

    async fn get(
        &mut self,
        target: &BaseRepoTarget,
        query: &QueryParams,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        let reference = self.reference(target);
        Ok(self.access.get(&reference, query, auth).await?)
    }

    async fn update(
        &mut self,
        target: &BaseRepoTarget,
        upload: &Upload,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        let BaseRepoTarget::Resource(_) = target else {
            return Err(ServiceError::InvalidArgument(
                "only data resources can be updated".to_string(),
            ));
        };
        let metadata = read_json_document(upload.require_metadata()?, &RESOURCE_KEYS)?;
        let reference = self.reference(target);
        Ok(self
            .access
            .update(&reference, Payload::json(metadata.text), auth)
            .await?)
    }

    async fn patch(
        &mut self,
        target: &BaseRepoTarget,
        patch: &Path,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        if let BaseRepoTarget::Resources = target {
            return Err(ServiceError::InvalidArgument(
                "an identifier is required for patching".to_string(),
            ));
        }
        let document = read_json_document(patch, &[])?;
        let reference = self.reference(target);
        Ok(self.access.patch(&reference, document.text, auth).await?)
    }

    async fn delete(
        &mut self,
        target: &BaseRepoTarget,
        mode: DeleteMode,
        auth: bool,
    ) -> Result<DeleteOutcome, ServiceError> {
        if let BaseRepoTarget::Content { relative_path, .. } = target {
            if relative_path.ends_with('/') {
                return Err(ServiceError::InvalidArgument(
                    "folders cannot be deleted, delete each content element instead".to_string(),
                ));
            }
        }
        let reference = self.reference(target);
        Ok(self.access.try_delete(&reference, mode, auth).await?)
    }

    async fn download(
        &mut self,
        target: &BaseRepoTarget,
        version: Option<u64>,
        auth: bool,
    ) -> Result<Vec<u8>, ServiceError> {
        let BaseRepoTarget::Content {
            resource_id,
            relative_path,
        } = target
        else {
            return Err(ServiceError::InvalidArgument(
                "a relative path is required for downloading".to_string(),
            ));
        };
        // single files are fetched without Accept so the server returns the raw bytes
        let reference = ResourceRef::new(content_path(resource_id, relative_path))
            .as_collection(relative_path.ends_with('/'));
        Ok(self.access.download(&reference, version, auth).await?)
    }

    fn id_for_element(&self, element: &Value) -> Option<String> {
        match element.get("parentResource") {
            Some(parent) => Some(format!(
                "{}/data/{}",
                string_field(parent, "id")?,
                string_field(element, "relativePath")?
            )),
            None => string_field(element, "id"),
        }
    }

    fn columns_for_element(&self, element: &Value) -> &TableColumns {
        if element.get("parentResource").is_some() {
            &self.settings.table_items_content
        } else {
            &self.settings.table_items_resource
        }
    }
}
