//! The OpenApiSplitter trait for partitioning OpenAPI specifications.

use serde::Serialize;
use utoipa::openapi::OpenApi;

use super::SplitResult;

/// Trait for splitting an OpenAPI specification into a root document and fragments.
///
/// # Implementing Custom Splitters
///
/// ```rust
/// use postspec_core::split::{OpenApiSplitter, RootDocument, SplitResult};
/// use utoipa::openapi::OpenApi;
/// use utoipa::openapi::path::PathItem;
///
/// struct MetadataOnly;
///
/// impl OpenApiSplitter for MetadataOnly {
///     type Fragment = PathItem;
///
///     fn split(&self, spec: OpenApi) -> SplitResult<Self::Fragment> {
///         SplitResult::new(RootDocument::from_metadata(&spec))
///     }
/// }
/// ```
///
/// # Built-in Implementations
///
/// * [`SplitPathsByTag`](super::SplitPathsByTag) - One file per path, grouped by primary tag
pub trait OpenApiSplitter {
    /// The type of content extracted into fragments.
    type Fragment: Serialize;

    /// Splits the specification into a root document and fragments.
    fn split(&self, spec: OpenApi) -> SplitResult<Self::Fragment>;
}

/// Extension trait for convenient splitting of OpenAPI specifications.
pub trait OpenApiSplitExt {
    /// Splits this specification using the provided splitter.
    ///
    /// # Example
    ///
    /// ```rust
    /// use postspec_core::split::{OpenApiSplitExt, SplitPathsByTag};
    /// use utoipa::openapi::OpenApiBuilder;
    ///
    /// let result = OpenApiBuilder::new().build().split_with(&SplitPathsByTag::default());
    /// assert!(result.is_unsplit());
    /// ```
    fn split_with<S: OpenApiSplitter>(self, splitter: &S) -> SplitResult<S::Fragment>;
}

impl OpenApiSplitExt for OpenApi {
    fn split_with<S: OpenApiSplitter>(self, splitter: &S) -> SplitResult<S::Fragment> {
        splitter.split(self)
    }
}
