use std::io;
use std::path::PathBuf;

use crate::yaml::YamlError;

/// Errors that can occur while loading a Postman collection.
///
/// A collection error only concerns the file being loaded: callers processing many
/// collections can report it and carry on with the others.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum CollectionError {
    /// The collection file cannot be read.
    #[display("Failed to read collection {path:?}: {error}")]
    Read {
        /// The collection file.
        path: PathBuf,
        /// The underlying I/O error.
        error: io::Error,
    },

    /// The collection is not a valid Postman collection.
    ///
    /// The location is the JSON path of the offending value (e.g. `item[2].request.url`).
    #[display("Invalid collection at '{location}': {error}")]
    Parse {
        /// JSON path where the parsing failed.
        location: String,
        /// The underlying JSON error.
        error: serde_json::Error,
    },
}

/// Errors that can occur while reading, writing or resolving OpenAPI documents.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum DocumentError {
    /// YAML serialization error.
    YamlError(YamlError),

    /// JSON serialization error.
    JsonError(serde_json::Error),

    /// The document file cannot be read.
    #[display("Failed to read document {path:?}: {error}")]
    #[from(skip)]
    Read {
        /// The document file.
        path: PathBuf,
        /// The underlying I/O error.
        error: io::Error,
    },

    /// The document cannot be parsed as an OpenAPI specification.
    #[display("Invalid document {path:?}: {message}")]
    #[from(skip)]
    Parse {
        /// The document file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// A file or directory cannot be written.
    #[display("Failed to write {path:?}: {error}")]
    #[from(skip)]
    Write {
        /// The target file or directory.
        path: PathBuf,
        /// The underlying I/O error.
        error: io::Error,
    },

    /// A root document reference does not point to any fragment.
    #[display("Unresolved reference '{reference}' for path '{path}'")]
    #[from(skip)]
    UnresolvedReference {
        /// The API path holding the reference.
        path: String,
        /// The reference location.
        reference: String,
    },
}
