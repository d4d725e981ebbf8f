//! MetaStore: metadata schemas and the documents validated against them.

use super::{string_field, ResourceClient, ServiceError, Upload};
use crate::access::{AccessClient, DeleteMode, DeleteOutcome, DeleteSupport, Payload, QueryParams, ResourceRef};
use crate::configuration::{MetastoreSettings, TableColumns};
use crate::documents::{document_part, file_part, read_json_document};
use crate::http_utils::FilePart;
use async_trait::async_trait;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

pub const SCHEMA_RECORD_MEDIA_TYPE: &str = "application/vnd.datamanager.schema-record+json";
pub const METADATA_RECORD_MEDIA_TYPE: &str = "application/vnd.datamanager.metadata-record+json";

/// Which MetaStore collection an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MetastoreKind {
    Schema,
    Document,
}

impl MetastoreKind {
    fn endpoint(&self) -> &'static str {
        match self {
            MetastoreKind::Schema => "api/v1/schemas",
            MetastoreKind::Document => "api/v1/metadata",
        }
    }

    fn record_media_type(&self) -> &'static str {
        match self {
            MetastoreKind::Schema => SCHEMA_RECORD_MEDIA_TYPE,
            MetastoreKind::Document => METADATA_RECORD_MEDIA_TYPE,
        }
    }

    /// Top-level keys one of which a record must carry.
    fn record_keys(&self) -> &'static [&'static str] {
        match self {
            MetastoreKind::Schema => &["type", "schemaId"],
            MetastoreKind::Document => &["relatedResource", "schema"],
        }
    }

    /// Multipart part name and upload file name of the schema or document.
    fn content_part(&self) -> (&'static str, &'static str) {
        match self {
            MetastoreKind::Schema => ("schema", "schema.json"),
            MetastoreKind::Document => ("document", "document.json"),
        }
    }

    fn record_file_name(&self) -> &'static str {
        match self {
            MetastoreKind::Schema => "schema_record.json",
            MetastoreKind::Document => "metadata_record.json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetastoreTarget {
    pub kind: MetastoreKind,
    pub id: Option<String>,
}

impl MetastoreTarget {
    pub fn collection(kind: MetastoreKind) -> Self {
        Self { kind, id: None }
    }

    pub fn single(kind: MetastoreKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: Some(id.into()),
        }
    }

    fn path(&self) -> String {
        match &self.id {
            Some(id) => format!("{}/{}", self.kind.endpoint(), id),
            None => self.kind.endpoint().to_string(),
        }
    }

    fn require_id(&self) -> Result<&str, ServiceError> {
        self.id
            .as_deref()
            .ok_or_else(|| ServiceError::InvalidArgument(format!("a {} identifier is required", self.kind)))
    }
}

pub struct MetastoreClient {
    access: AccessClient,
    settings: MetastoreSettings,
}

impl MetastoreClient {
    pub fn new(access: AccessClient, settings: MetastoreSettings) -> Self {
        Self { access, settings }
    }

    fn reference(&self, target: &MetastoreTarget) -> ResourceRef {
        ResourceRef::new(target.path())
            .with_media_type(target.kind.record_media_type())
            .with_delete(DeleteSupport::Lifecycle)
    }

    /// Record and content parts of an upload, in that order. Missing files are skipped.
    fn parts(kind: MetastoreKind, upload: &Upload) -> Result<Vec<FilePart>, ServiceError> {
        let mut parts = Vec::new();
        if let Some(metadata) = &upload.metadata {
            let record = read_json_document(metadata, kind.record_keys())?;
            parts.push(document_part("record", kind.record_file_name(), &record));
        }
        if let Some(payload) = &upload.payload {
            let (name, upload_name) = kind.content_part();
            parts.push(file_part(name, upload_name, mime::APPLICATION_JSON.as_ref(), payload)?);
        }
        Ok(parts)
    }
}

#[async_trait]
impl ResourceClient for MetastoreClient {
    type Target = MetastoreTarget;

    fn name(&self) -> &'static str {
        "MetaStore"
    }

    fn access(&self) -> &AccessClient {
        &self.access
    }

    async fn create(
        &mut self,
        target: &MetastoreTarget,
        upload: &Upload,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        upload.require_metadata()?;
        upload.require_payload()?;
        let parts = Self::parts(target.kind, upload)?;
        let collection = ResourceRef::new(target.kind.endpoint());
        Ok(self
            .access
            .create(&collection, &QueryParams::new(), Payload::Multipart(parts), auth)
            .await?)
    }

    async fn get(
        &mut self,
        target: &MetastoreTarget,
        query: &QueryParams,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        let reference = self.reference(target);
        Ok(self.access.get(&reference, query, auth).await?)
    }

    async fn update(
        &mut self,
        target: &MetastoreTarget,
        upload: &Upload,
        auth: bool,
    ) -> Result<Vec<Value>, ServiceError> {
        target.require_id()?;
        let parts = Self::parts(target.kind, upload)?;
        if parts.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "an update requires a record, a payload or both".to_string(),
            ));
        }
        let reference = self.reference(target);
        Ok(self
            .access
            .update(&reference, Payload::Multipart(parts), auth)
            .await?)
    }

    async fn delete(
        &mut self,
        target: &MetastoreTarget,
        mode: DeleteMode,
        auth: bool,
    ) -> Result<DeleteOutcome, ServiceError> {
        target.require_id()?;
        let reference = self.reference(target);
        Ok(self.access.try_delete(&reference, mode, auth).await?)
    }

    async fn download(
        &mut self,
        target: &MetastoreTarget,
        version: Option<u64>,
        auth: bool,
    ) -> Result<Vec<u8>, ServiceError> {
        target.require_id()?;
        let reference = ResourceRef::new(target.path());
        Ok(self.access.download(&reference, version, auth).await?)
    }

    fn id_for_element(&self, element: &Value) -> Option<String> {
        if element.get("label").is_some() {
            string_field(element, "schemaId")
        } else {
            string_field(element, "id")
        }
    }

    fn columns_for_element(&self, element: &Value) -> &TableColumns {
        if element.get("label").is_some() {
            &self.settings.table_items_schema
        } else {
            &self.settings.table_items_document
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::testing::{client, RecordingTransport};
    use crate::access::ApiError;
    use crate::format::{RenderFormat, Rendered};
    use crate::http_utils::RequestBody;
    use reqwest::header::{ACCEPT, IF_MATCH};
    use reqwest::Method;
    use std::fs;
    use std::path::PathBuf;
    use std::str::FromStr;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store(transport: &Arc<RecordingTransport>) -> MetastoreClient {
        let settings = serde_yaml::from_str("server_url: http://repo.example.org/").unwrap();
        MetastoreClient::new(client(transport), settings)
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn part_names(body: &RequestBody) -> Vec<(String, String)> {
        match body {
            RequestBody::Multipart(parts) => parts
                .iter()
                .map(|p| (p.name.clone(), p.file_name.clone()))
                .collect(),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(MetastoreKind::from_str("Schema").unwrap(), MetastoreKind::Schema);
        assert_eq!(MetastoreKind::from_str("document").unwrap(), MetastoreKind::Document);
        assert!(MetastoreKind::from_str("folder").is_err());
    }

    #[tokio::test]
    async fn test_create_schema_uploads_record_and_schema() {
        let dir = TempDir::new().unwrap();
        let record = write(&dir, "record.json", r#"{"schemaId":"s1","type":"JSON"}"#);
        let schema = write(&dir, "my_schema.json", r#"{"type":"object"}"#);
        let transport = Arc::new(RecordingTransport::default());
        transport.reply(201, &[], r#"{"schemaId":"s1","label":"l"}"#);
        let mut store = store(&transport);

        let result = store
            .create(
                &MetastoreTarget::collection(MetastoreKind::Schema),
                &Upload::new(Some(record), Some(schema)),
                false,
            )
            .await
            .unwrap();

        assert_eq!(store.id_for_element(&result[0]).unwrap(), "s1");
        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://repo.example.org/api/v1/schemas");
        assert!(request.headers.get(ACCEPT).is_none());
        assert_eq!(
            part_names(&request.body),
            vec![
                ("record".to_string(), "schema_record.json".to_string()),
                ("schema".to_string(), "schema.json".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_create_document_requires_matching_record() {
        let dir = TempDir::new().unwrap();
        let record = write(&dir, "record.json", r#"{"schemaId":"s1"}"#);
        let document = write(&dir, "doc.json", "{}");
        let transport = Arc::new(RecordingTransport::default());
        let mut store = store(&transport);

        let result = store
            .create(
                &MetastoreTarget::collection(MetastoreKind::Document),
                &Upload::new(Some(record), Some(document)),
                false,
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Document(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_document_reads_tag_with_record_type() {
        let dir = TempDir::new().unwrap();
        let document = write(&dir, "doc.json", r#"{"title":"new"}"#);
        let transport = Arc::new(RecordingTransport::default());
        transport.reply(200, &[("etag", "\"7\"")], r#"{"id":"d1"}"#);
        transport.reply(200, &[], r#"{"id":"d1","recordVersion":2}"#);
        let mut store = store(&transport);

        store
            .update(
                &MetastoreTarget::single(MetastoreKind::Document, "d1"),
                &Upload::new(None, Some(document)),
                false,
            )
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].headers.get(ACCEPT).unwrap(), METADATA_RECORD_MEDIA_TYPE);
        assert_eq!(requests[1].method, Method::PUT);
        assert_eq!(requests[1].url, "http://repo.example.org/api/v1/metadata/d1");
        assert!(requests[1].headers.get(ACCEPT).is_none());
        assert_eq!(requests[1].headers.get(IF_MATCH).unwrap(), "\"7\"");
        assert_eq!(
            part_names(&requests[1].body),
            vec![("document".to_string(), "document.json".to_string())]
        );
    }

    #[tokio::test]
    async fn test_update_without_files_is_rejected() {
        let transport = Arc::new(RecordingTransport::default());
        let mut store = store(&transport);

        let result = store
            .update(&MetastoreTarget::single(MetastoreKind::Schema, "s1"), &Upload::default(), false)
            .await;

        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_get_schema_listing_with_query() {
        let transport = Arc::new(RecordingTransport::default());
        transport.reply(200, &[], r#"[{"schemaId":"a","label":"x"},{"schemaId":"b","label":"y"}]"#);
        let mut store = store(&transport);
        let query = QueryParams::new().with("page", Some(0)).with("size", Some(20));

        let result = store
            .get(&MetastoreTarget::collection(MetastoreKind::Schema), &query, false)
            .await
            .unwrap();

        assert_eq!(
            store.render(result, RenderFormat::List),
            Rendered::List(vec!["a".into(), "b".into()])
        );
        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://repo.example.org/api/v1/schemas?page=0&size=20");
        assert_eq!(request.headers.get(ACCEPT).unwrap(), SCHEMA_RECORD_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_soft_delete_of_schema_is_one_step() {
        let transport = Arc::new(RecordingTransport::default());
        transport.reply(200, &[("etag", "\"1\"")], "{}");
        transport.reply(204, &[], "");
        let mut store = store(&transport);

        let outcome = store
            .delete(&MetastoreTarget::single(MetastoreKind::Schema, "s1"), DeleteMode::Soft, false)
            .await
            .unwrap();

        assert_eq!(outcome, DeleteOutcome::Revoked);
        assert_eq!(transport.methods(), vec![Method::GET, Method::DELETE]);
    }

    #[tokio::test]
    async fn test_patch_is_unsupported() {
        let transport = Arc::new(RecordingTransport::default());
        let mut store = store(&transport);

        let result = store
            .patch(
                &MetastoreTarget::single(MetastoreKind::Schema, "s1"),
                std::path::Path::new("patch.json"),
                false,
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Api(ApiError::Unsupported(_)))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_download_appends_version() {
        let transport = Arc::new(RecordingTransport::default());
        transport.reply(200, &[], r#"{"type":"object"}"#);
        let mut store = store(&transport);

        store
            .download(&MetastoreTarget::single(MetastoreKind::Schema, "s1"), Some(4), false)
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://repo.example.org/api/v1/schemas/s1?version=4");
        assert!(request.headers.get(ACCEPT).is_none());
    }
}
