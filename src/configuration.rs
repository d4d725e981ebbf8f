use dirs::config_dir;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, trace};
use url::Url;

pub const DEFAULT_APPLICATION_ID: &str = "kitdm";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const LOCAL_PROPERTIES_FILE_NAME: &str = "properties.json";
pub const PROPERTIES_ENV_VAR: &str = "KITDM_PROPERTIES";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("properties not found at {path:?}")]
    NotFound { path: PathBuf },
    #[error("failed to load configuration data from {path:?}, because of: {cause}")]
    FailedToLoadData {
        path: PathBuf,
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write configuration data, because of: {cause}")]
    FailedToWriteData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("missing configuration section {name:?}")]
    MissingSection { name: String },
}

/// Table layout as ordered `(column title, dotted key path)` pairs.
///
/// Stored as a map in the properties file; the order of the entries is the column
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableColumns(Vec<(String, String)>);

impl TableColumns {
    pub fn new<T: Into<String>, P: Into<String>>(columns: Vec<(T, P)>) -> Self {
        Self(
            columns
                .into_iter()
                .map(|(title, path)| (title.into(), path.into()))
                .collect(),
        )
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(title, _)| title.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(title, path)| (title.as_str(), path.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for TableColumns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (title, path) in &self.0 {
            map.serialize_entry(title, path)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TableColumns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnsVisitor;

        impl<'de> Visitor<'de> for ColumnsVisitor {
            type Value = TableColumns;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of column titles to key paths")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut columns = Vec::new();
                while let Some((title, path)) = access.next_entry::<String, String>()? {
                    columns.push((title, path));
                }
                Ok(TableColumns(columns))
            }
        }

        deserializer.deserialize_map(ColumnsVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeycloakSettings {
    pub server_url: Url,
    pub client_id: String,
    pub realm_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRepoSettings {
    pub server_url: Url,
    #[serde(rename = "tableItemsResource", default = "default_resource_columns")]
    pub table_items_resource: TableColumns,
    #[serde(rename = "tableItemsContent", default = "default_content_columns")]
    pub table_items_content: TableColumns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetastoreSettings {
    pub server_url: Url,
    #[serde(rename = "tableItemsSchema", default = "default_schema_columns")]
    pub table_items_schema: TableColumns,
    #[serde(rename = "tableItemsDocument", default = "default_document_columns")]
    pub table_items_document: TableColumns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidMakerSettings {
    pub server_url: Url,
    #[serde(rename = "tableItemsRecord", default = "default_record_columns")]
    pub table_items_record: TableColumns,
    #[serde(rename = "tableItemsPid", default = "default_pid_columns")]
    pub table_items_pid: TableColumns,
}

fn default_resource_columns() -> TableColumns {
    TableColumns::new(vec![
        ("Id", "id"),
        ("Title", "titles.0.value"),
        ("Resource Type", "resourceType.value"),
        ("State", "state"),
    ])
}

fn default_content_columns() -> TableColumns {
    TableColumns::new(vec![
        ("Resource", "parentResource.id"),
        ("Relative Path", "relativePath"),
        ("Version", "version"),
        ("Size", "size"),
        ("Media Type", "mediaType"),
    ])
}

fn default_schema_columns() -> TableColumns {
    TableColumns::new(vec![
        ("Schema Id", "schemaId"),
        ("Version", "schemaVersion"),
        ("Type", "type"),
        ("Label", "label"),
    ])
}

fn default_document_columns() -> TableColumns {
    TableColumns::new(vec![
        ("Id", "id"),
        ("Version", "recordVersion"),
        ("Schema", "schema.identifier"),
        ("Related Resource", "relatedResource.identifier"),
    ])
}

fn default_record_columns() -> TableColumns {
    TableColumns::new(vec![("PID", "pid"), ("First Key", "entries.0.key")])
}

fn default_pid_columns() -> TableColumns {
    TableColumns::new(vec![
        ("PID", "pid"),
        ("Created", "created"),
        ("Modified", "modified"),
    ])
}

/// Client properties, one optional section per remote system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    keycloak: Option<KeycloakSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_repo: Option<BaseRepoSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metastore: Option<MetastoreSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_pid_maker: Option<PidMakerSettings>,
}

impl Configuration {
    /// The identity provider section; `None` disables authentication.
    pub fn keycloak(&self) -> Option<&KeycloakSettings> {
        self.keycloak.as_ref()
    }

    pub fn base_repo(&self) -> Result<&BaseRepoSettings, ConfigurationError> {
        self.base_repo
            .as_ref()
            .ok_or_else(|| ConfigurationError::MissingSection {
                name: "base_repo".to_string(),
            })
    }

    pub fn metastore(&self) -> Result<&MetastoreSettings, ConfigurationError> {
        self.metastore
            .as_ref()
            .ok_or_else(|| ConfigurationError::MissingSection {
                name: "metastore".to_string(),
            })
    }

    pub fn type_pid_maker(&self) -> Result<&PidMakerSettings, ConfigurationError> {
        self.type_pid_maker
            .as_ref()
            .ok_or_else(|| ConfigurationError::MissingSection {
                name: "type_pid_maker".to_string(),
            })
    }

    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        match config_dir() {
            Some(mut path) => {
                path.push(DEFAULT_APPLICATION_ID);
                path.push(DEFAULT_CONFIGURATION_FILE_NAME);
                Ok(path)
            }
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    /// Picks the properties file: an explicit path wins, then a `properties.json` in
    /// `working_dir`, then the per-user configuration file.
    pub fn resolve_path(
        explicit: Option<PathBuf>,
        working_dir: &Path,
    ) -> Result<PathBuf, ConfigurationError> {
        if let Some(path) = explicit {
            trace!("Using properties file from {}", PROPERTIES_ENV_VAR);
            return Ok(path);
        }

        let local = working_dir.join(LOCAL_PROPERTIES_FILE_NAME);
        if local.is_file() {
            return Ok(local);
        }

        Self::get_default_configuration_file_path()
    }

    pub fn configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        let explicit = std::env::var_os(PROPERTIES_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve_path(explicit, &working_dir)
    }

    pub fn load_default() -> Result<Configuration, ConfigurationError> {
        let path = Self::configuration_file_path()?;
        debug!("Loading configuration from {}...", path.display());
        Self::load_from_file(&path)
    }

    /// Reads a properties file. Files ending in `.json` are parsed as JSON, anything
    /// else as YAML.
    pub fn load_from_file(path: &Path) -> Result<Configuration, ConfigurationError> {
        let content = fs::read_to_string(path).map_err(|cause| {
            if cause.kind() == std::io::ErrorKind::NotFound {
                ConfigurationError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigurationError::FailedToLoadData {
                    path: path.to_path_buf(),
                    cause: Box::new(cause),
                }
            }
        })?;

        let is_json = path
            .extension()
            .map(|extension| extension.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
        } else {
            serde_yaml::from_str(&content).map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
        };

        parsed.map_err(|cause| ConfigurationError::FailedToLoadData {
            path: path.to_path_buf(),
            cause,
        })
    }

    /// Writes the configuration as YAML. Passwords are never written.
    pub fn write<W: Write>(&self, writer: W) -> Result<(), ConfigurationError> {
        serde_yaml::to_writer(writer, self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }
}
