//! Clients for the three KIT Data Manager services.
//!
//! Every service implements [`ResourceClient`] on top of one [`AccessClient`]. The
//! services only decide paths, media types and multipart layouts; authentication,
//! preconditions and the delete lifecycle are handled by the access layer.

pub mod base_repo;
pub mod metastore;
pub mod typed_pid;

pub use base_repo::{BaseRepoClient, BaseRepoTarget};
pub use metastore::{MetastoreClient, MetastoreKind, MetastoreTarget};
pub use typed_pid::{PidTarget, TypedPidClient};

use crate::access::{AccessClient, ApiError, DeleteMode, DeleteOutcome, QueryParams};
use crate::documents::DocumentError;
use crate::format::{RenderFormat, Rendered, Table};
use crate::configuration::TableColumns;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    InvalidArgument(String),
}

/// Local files that make up a create or update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Upload {
    pub metadata: Option<PathBuf>,
    pub payload: Option<PathBuf>,
}

impl Upload {
    pub fn new(metadata: Option<PathBuf>, payload: Option<PathBuf>) -> Self {
        Self { metadata, payload }
    }

    pub fn metadata(path: impl Into<PathBuf>) -> Self {
        Self {
            metadata: Some(path.into()),
            payload: None,
        }
    }

    pub(crate) fn require_metadata(&self) -> Result<&Path, ServiceError> {
        self.metadata
            .as_deref()
            .ok_or_else(|| ServiceError::InvalidArgument("metadata file is required".to_string()))
    }

    pub(crate) fn require_payload(&self) -> Result<&Path, ServiceError> {
        self.payload
            .as_deref()
            .ok_or_else(|| ServiceError::InvalidArgument("payload file is required".to_string()))
    }
}

fn unsupported(service: &str, operation: &str) -> ServiceError {
    ServiceError::Api(ApiError::Unsupported(format!(
        "{} is not supported by {}",
        operation, service
    )))
}

/// The capability set shared by all service clients.
///
/// Operations a service does not offer keep the default implementation, which fails
/// before any network call.
#[async_trait]
pub trait ResourceClient: Send {
    /// What an operation addresses, e.g. a resource, a content element or a schema.
    type Target: Send + Sync;

    fn name(&self) -> &'static str;

    fn access(&self) -> &AccessClient;

    async fn create(
        &mut self,
        target: &Self::Target,
        upload: &Upload,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError>;

    async fn get(
        &mut self,
        target: &Self::Target,
        query: &QueryParams,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError>;

    async fn update(
        &mut self,
        target: &Self::Target,
        upload: &Upload,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError>;

    async fn patch(
        &mut self,
        _target: &Self::Target,
        _patch: &Path,
        _auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        Err(unsupported(self.name(), "patch"))
    }

    async fn delete(
        &mut self,
        _target: &Self::Target,
        _mode: DeleteMode,
        _auth: bool,
    ) -> Result<DeleteOutcome, ServiceError> {
        Err(unsupported(self.name(), "delete"))
    }

    async fn download(
        &mut self,
        _target: &Self::Target,
        _version: Option<u64>,
        _auth: bool,
    ) -> Result<Vec<u8>, ServiceError> {
        Err(unsupported(self.name(), "download"))
    }

    /// Identifier printed for an element in LIST mode.
    fn id_for_element(&self, element: &Value) -> Option<String>;

    /// Table columns for a result whose first element is `element`.
    fn columns_for_element(&self, element: &Value) -> &TableColumns;

    fn render(&self, values: Vec<Value>, format: RenderFormat) -> Rendered {
        if values.is_empty() {
            return Rendered::Empty;
        }
        match format {
            RenderFormat::Table => {
                let columns = self.columns_for_element(&values[0]);
                Rendered::Table(Table::from_values(&values, columns))
            }
            RenderFormat::List => Rendered::List(
                values
                    .iter()
                    .map(|value| self.id_for_element(value).unwrap_or_default())
                    .collect(),
            ),
            RenderFormat::Raw => Rendered::Raw(values),
        }
    }
}

pub(crate) fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
