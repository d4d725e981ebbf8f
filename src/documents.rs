//! Local metadata and payload files.
//!
//! Metadata files get a quick structural check before upload so obviously wrong
//! input fails without a network round-trip. The check is intentionally shallow:
//! the server still has the final word on validity.

use crate::http_utils::FilePart;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("file not found at {path:?}")]
    NotFound { path: PathBuf },
    #[error("failed to read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON file {path:?}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path:?} contains none of the expected keys {keys:?}")]
    MissingKeys { path: PathBuf, keys: Vec<String> },
    #[error("{path:?} has no file name")]
    NoFileName { path: PathBuf },
}

/// A JSON document read from disk, keeping the original text for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    pub path: PathBuf,
    pub text: String,
    pub value: Value,
}

impl JsonDocument {
    pub fn has_key(&self, key: &str) -> bool {
        self.value.get(key).is_some()
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, DocumentError> {
    fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DocumentError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DocumentError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Reads and parses `path`. When `any_of_keys` is not empty, at least one of them
/// must be a top-level member of the document.
pub fn read_json_document(path: &Path, any_of_keys: &[&str]) -> Result<JsonDocument, DocumentError> {
    trace!("Reading JSON document {}", path.display());
    let bytes = read_bytes(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let value: Value = serde_json::from_str(&text).map_err(|source| DocumentError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;

    let document = JsonDocument {
        path: path.to_path_buf(),
        text,
        value,
    };

    if !any_of_keys.is_empty() && !any_of_keys.iter().any(|key| document.has_key(key)) {
        return Err(DocumentError::MissingKeys {
            path: path.to_path_buf(),
            keys: any_of_keys.iter().map(|key| key.to_string()).collect(),
        });
    }

    Ok(document)
}

/// The file name component of `path`, used when uploading into a folder.
pub fn file_name(path: &Path) -> Result<String, DocumentError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| DocumentError::NoFileName {
            path: path.to_path_buf(),
        })
}

/// A multipart part carrying the file at `path` under a fixed upload name.
pub fn file_part(name: &str, upload_name: &str, media_type: &str, path: &Path) -> Result<FilePart, DocumentError> {
    Ok(FilePart {
        name: name.to_string(),
        file_name: upload_name.to_string(),
        media_type: media_type.to_string(),
        content: read_bytes(path)?,
    })
}

/// A multipart part carrying an already loaded document.
pub fn document_part(name: &str, upload_name: &str, document: &JsonDocument) -> FilePart {
    FilePart {
        name: name.to_string(),
        file_name: upload_name.to_string(),
        media_type: mime::APPLICATION_JSON.to_string(),
        content: document.text.clone().into_bytes(),
    }
}

/// A multipart part carrying the file at `path` under its own name, with a media
/// type guessed from the extension.
pub fn payload_part(name: &str, path: &Path) -> Result<FilePart, DocumentError> {
    let upload_name = file_name(path)?;
    let media_type = media_type_for(path);
    file_part(name, &upload_name, media_type.as_ref(), path)
}

fn media_type_for(path: &Path) -> mime::Mime {
    mime_guess::from_path(path).first_or_octet_stream()
}
