//! Fragment types for partitioned OpenAPI specifications.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;
use utoipa::openapi::path::PathItem;
use utoipa::openapi::{OpenApi, OpenApiBuilder, Paths};

use super::RootDocument;
use crate::error::DocumentError;
use crate::yaml::ToYaml;

/// A piece of the document written to its own file.
///
/// # Example
///
/// ```rust
/// use postspec_core::split::Fragment;
/// use utoipa::openapi::path::PathItem;
///
/// let fragment = Fragment::new("paths/ports/v2-ports.yaml", "/v2/ports", PathItem::default());
/// assert_eq!(fragment.reference(), "./paths/ports/v2-ports.yaml");
/// ```
#[derive(Debug, Clone)]
pub struct Fragment<T: Serialize> {
    /// Location of the file, relative to the root document.
    pub path: PathBuf,

    /// Key of the content in the original document, the API path for path items.
    pub key: String,

    /// The content to serialize into the fragment file.
    pub content: T,
}

impl<T: Serialize> Fragment<T> {
    /// Creates a new fragment.
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>, content: T) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            content,
        }
    }

    /// The reference pointer to this fragment, relative to the root document.
    pub fn reference(&self) -> String {
        let relative = self
            .path
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("./{relative}")
    }
}

/// The result of partitioning an OpenAPI specification.
///
/// Contains the root document (with `$ref` pointers to the fragments) and the
/// fragments themselves.
#[derive(Debug, Clone)]
pub struct SplitResult<T: Serialize> {
    /// The root document.
    pub main: RootDocument,

    /// Fragments to be written to separate files.
    pub fragments: Vec<Fragment<T>>,
}

impl<T: Serialize> SplitResult<T> {
    /// Creates a new split result with no fragments.
    pub fn new(main: RootDocument) -> Self {
        Self {
            main,
            fragments: Vec::new(),
        }
    }

    /// Adds a fragment to the result.
    pub fn add_fragment(&mut self, fragment: Fragment<T>) {
        self.fragments.push(fragment);
    }

    /// Returns `true` if there are no fragments.
    pub fn is_unsplit(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Returns the number of fragments.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Returns `true` if every root path has exactly one fragment and every
    /// fragment is referenced by its root path.
    pub fn is_lossless(&self) -> bool {
        self.fragments.len() == self.main.paths.len()
            && self.fragments.iter().all(|fragment| {
                self.main.reference(&fragment.key) == Some(fragment.reference().as_str())
            })
    }

    /// Writes the root document as `root_file` and every fragment below `dir`.
    ///
    /// Returns the written files, sorted. The root document is written last, once
    /// every fragment is on disk.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentError`] if a directory or a file cannot be written, or if
    /// some content cannot be serialized. Files written before the failure are left
    /// in place and the root document is not written.
    pub fn write_to(&self, dir: &Path, root_file: &str) -> Result<Vec<PathBuf>, DocumentError> {
        let mut written = Vec::with_capacity(self.fragments.len() + 1);

        for fragment in &self.fragments {
            let target = dir.join(&fragment.path);
            write_yaml(&target, &fragment.content)?;
            written.push(target);
        }

        let root = dir.join(root_file);
        write_yaml(&root, &self.main)?;
        written.push(root);

        written.sort();
        debug!(dir = %dir.display(), files = written.len(), "split written");
        Ok(written)
    }
}

impl SplitResult<PathItem> {
    /// Inlines the fragments back into the root document.
    ///
    /// The resulting paths are the ones of the partitioned document; the tags are
    /// those of the root document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnresolvedReference`] if a root path references no fragment.
    pub fn resolve(self) -> Result<OpenApi, DocumentError> {
        let mut by_reference: IndexMap<String, PathItem> = self
            .fragments
            .into_iter()
            .map(|fragment| (fragment.reference(), fragment.content))
            .collect();

        let mut paths = Paths::new();
        for (path, reference) in self.main.paths {
            let item = by_reference
                .shift_remove(&reference.ref_location)
                .ok_or_else(|| DocumentError::UnresolvedReference {
                    path: path.clone(),
                    reference: reference.ref_location.clone(),
                })?;
            paths.paths.insert(path, item);
        }

        let tags = (!self.main.tags.is_empty()).then_some(self.main.tags);
        let mut spec = OpenApiBuilder::new()
            .info(self.main.info)
            .servers(self.main.servers)
            .paths(paths)
            .components(self.main.components)
            .security(self.main.security)
            .tags(tags)
            .build();
        spec.openapi = self.main.openapi;
        Ok(spec)
    }
}

fn write_yaml<T: Serialize>(target: &Path, content: &T) -> Result<(), DocumentError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|error| DocumentError::Write {
            path: parent.to_path_buf(),
            error,
        })?;
    }
    let yaml = content.to_yaml()?;
    fs::write(target, yaml).map_err(|error| DocumentError::Write {
        path: target.to_path_buf(),
        error,
    })
}
