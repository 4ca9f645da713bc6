//! Conversion diagnostics.
//!
//! The conversion never fails on a partially specified collection: what it could not
//! use, or had to overwrite, is reported here and logged.

use http::Method;

/// Why a collection leaf contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SkipReason {
    /// The leaf has no `request`.
    #[display("missing request")]
    MissingRequest,
    /// The request has no usable URL.
    #[display("missing URL")]
    MissingUrl,
    /// The method is not an OpenAPI path item verb.
    #[display("unsupported method '{_0}'")]
    UnsupportedMethod(String),
}

/// A skipped collection leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLeaf {
    /// Leaf name.
    pub name: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// A `(path, method)` pair produced twice: the later operation replaced the earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overwrite {
    /// API path.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// Summary of the replaced operation.
    pub replaced: String,
    /// Summary of the operation kept.
    pub kept: String,
}

/// An operation identifier shared by several operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationIdCollision {
    /// The shared identifier.
    pub operation_id: String,
    /// Every `(method, path)` pair using it, in document order.
    pub endpoints: Vec<(Method, String)>,
}

/// Diagnostics of a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Number of collection leaves visited.
    pub leaves: usize,
    /// Number of folders visited.
    pub folders: usize,
    /// Leaves that contributed nothing.
    pub skipped: Vec<SkippedLeaf>,
    /// Operations replaced by a later one on the same path and method.
    pub overwrites: Vec<Overwrite>,
    /// Operation identifiers that are not unique.
    pub collisions: Vec<OperationIdCollision>,
}

impl ConversionReport {
    /// Returns `true` if nothing was skipped, overwritten or collided.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.overwrites.is_empty() && self.collisions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_skip_reasons() {
        assert_eq!(SkipReason::MissingRequest.to_string(), "missing request");
        assert_eq!(
            SkipReason::UnsupportedMethod("CONNECT".to_string()).to_string(),
            "unsupported method 'CONNECT'"
        );
    }

    #[test]
    fn should_be_clean_by_default() {
        let mut report = ConversionReport::default();
        assert!(report.is_clean());

        report.skipped.push(SkippedLeaf {
            name: "Draft".to_string(),
            reason: SkipReason::MissingRequest,
        });
        assert!(!report.is_clean());
    }
}
