//! Reading and writing files.
//!
//! Documents are read and written as JSON when the file extension is `json`, as
//! YAML otherwise.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::debug;
use utoipa::openapi::OpenApi;

use crate::collection::Collection;
use crate::error::{CollectionError, DocumentError};
use crate::yaml::{ToYaml, from_yaml};

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}

/// Loads a Postman collection file.
///
/// # Errors
///
/// Returns a [`CollectionError`] if the file cannot be read or is not a collection.
pub fn load_collection(path: &Path) -> Result<Collection, CollectionError> {
    let file = File::open(path).map_err(|error| CollectionError::Read {
        path: path.to_path_buf(),
        error,
    })?;
    let collection = Collection::from_reader(BufReader::new(file))?;
    debug!(path = %path.display(), items = collection.items.len(), "collection loaded");
    Ok(collection)
}

/// Loads an OpenAPI document.
///
/// Status codes written as plain YAML keys (`200:`) are accepted.
///
/// # Errors
///
/// Returns a [`DocumentError`] if the file cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<OpenApi, DocumentError> {
    let text = fs::read_to_string(path).map_err(|error| DocumentError::Read {
        path: path.to_path_buf(),
        error,
    })?;

    let parsed: Result<OpenApi, String> = if is_json(path) {
        serde_json::from_str(&text).map_err(|err| err.to_string())
    } else {
        from_yaml(&text)
    };

    parsed.map_err(|message| DocumentError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Writes an OpenAPI document, creating the parent directories.
///
/// # Errors
///
/// Returns a [`DocumentError`] if the document cannot be serialized or written.
pub fn write_document(spec: &OpenApi, path: &Path) -> Result<(), DocumentError> {
    let content = if is_json(path) {
        serde_json::to_string_pretty(spec)?
    } else {
        spec.to_yaml()?
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| DocumentError::Write {
            path: parent.to_path_buf(),
            error,
        })?;
    }
    fs::write(path, content).map_err(|error| DocumentError::Write {
        path: path.to_path_buf(),
        error,
    })
}
