//! Typed PID Maker: PID records and the registry of known PIDs.

use super::{string_field, ResourceClient, ServiceError, Upload};
use crate::access::{AccessClient, Payload, QueryParams, ResourceRef};
use crate::configuration::{PidMakerSettings, TableColumns};
use crate::documents::read_json_document;
use async_trait::async_trait;
use serde_json::Value;

pub const PID_SIMPLE_MEDIA_TYPE: &str = "application/vnd.datamanager.pid.simple+json";

const RECORDS_PATH: &str = "api/v1/pit/pid/";
const KNOWN_PIDS_PATH: &str = "api/v1/pit/known-pid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PidTarget {
    /// A new record. With `dry_run` the server only validates it.
    NewRecord { dry_run: bool },
    Record(String),
    /// One known PID, or all of them.
    Known(Option<String>),
}

pub struct TypedPidClient {
    access: AccessClient,
    settings: PidMakerSettings,
}

impl TypedPidClient {
    pub fn new(access: AccessClient, settings: PidMakerSettings) -> Self {
        Self { access, settings }
    }

    fn reference(target: &PidTarget) -> ResourceRef {
        let path = match target {
            PidTarget::NewRecord { dry_run: false } => RECORDS_PATH.to_string(),
            PidTarget::NewRecord { dry_run: true } => format!("{}?dryrun=true", RECORDS_PATH),
            PidTarget::Record(pid) => format!("{}{}", RECORDS_PATH, pid),
            PidTarget::Known(Some(pid)) => format!("{}/{}", KNOWN_PIDS_PATH, pid),
            PidTarget::Known(None) => KNOWN_PIDS_PATH.to_string(),
        };
        ResourceRef::new(path).with_media_type(mime::APPLICATION_JSON.as_ref())
    }

    /// Reads a record in either the default (`entries`) or the simple (`record`) format
    /// and labels it with the matching content type.
    fn record_payload(upload: &Upload) -> Result<Payload, ServiceError> {
        let document = read_json_document(upload.require_metadata()?, &["entries", "record"])?;
        if document.has_key("entries") {
            Ok(Payload::json(document.text))
        } else {
            Ok(Payload::typed(PID_SIMPLE_MEDIA_TYPE, document.text))
        }
    }
}

#[async_trait]
impl ResourceClient for TypedPidClient {
    type Target = PidTarget;

    fn name(&self) -> &'static str {
        "Typed PID Maker"
    }

    fn access(&self) -> &AccessClient {
        &self.access
    }

    async fn create(
        &mut self,
        target: &PidTarget,
        upload: &Upload,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        if !matches!(target, PidTarget::NewRecord { .. }) {
            return Err(ServiceError::InvalidArgument(
                "records are created without an identifier".to_string(),
            ));
        }
        let payload = Self::record_payload(upload)?;
        let path = Self::reference(target).path;
        Ok(self
            .access
            .create(&ResourceRef::new(path), &QueryParams::new(), payload, auth)
            .await?)
    }

    async fn get(
        &mut self,
        target: &PidTarget,
        query: &QueryParams,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        Ok(self.access.get(&Self::reference(target), query, auth).await?)
    }

    async fn update(
        &mut self,
        target: &PidTarget,
        upload: &Upload,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        let PidTarget::Record(_) = target else {
            return Err(ServiceError::InvalidArgument(
                "a PID is required for updating a record".to_string(),
            ));
        };
        let payload = Self::record_payload(upload)?;
        Ok(self
            .access
            .update(&Self::reference(target), payload, auth)
            .await?)
    }

    fn id_for_element(&self, element: &Value) -> Option<String> {
        string_field(element, "pid")
    }

    fn columns_for_element(&self, element: &Value) -> &TableColumns {
        if element.get("created").is_some() {
            &self.settings.table_items_pid
        } else {
            &self.settings.table_items_record
        }
    }
}
