//! URL normalization.
//!
//! Postman URLs come either as a plain string (`https://api.megaport.com/v2/ports?limit=10`)
//! or as a structured object carrying path segments, declared variables and query
//! entries. Both are reduced to a canonical OpenAPI path (`/v2/ports/{portId}`) plus
//! query parameter descriptors.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// Hosts stripped from URL strings.
///
/// Matching is an exact prefix match, hosts are not pattern-matched.
pub const KNOWN_HOSTS: [&str; 4] = [
    "https://api.megaport.com",
    "https://api-staging.megaport.com",
    "https://auth-m2m.megaport.com",
    "https://auth-m2m-staging.megaport.com",
];

/// Colon-style variable at the start of a path segment (`/:portId`, `/:port-id`).
static COLON_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?<lead>^|/):(?<name>[\w-]+)").expect("a valid regex"));

/// Brace-style variable (`{portId}`).
static BRACE_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>[^}]+)}").expect("a valid regex"));

/// A URL as found in a collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawUrl {
    /// A plain URL string, possibly with a query string.
    Raw(String),
    /// A structured Postman URL.
    Structured(StructuredUrl),
}

/// A structured Postman URL.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StructuredUrl {
    /// The original URL string, used when no path segments are given.
    #[serde(default)]
    pub raw: Option<String>,
    /// Path segments.
    #[serde(default)]
    pub path: Option<UrlPath>,
    /// Declared path variables.
    #[serde(default)]
    pub variable: Vec<UrlVariable>,
    /// Query entries.
    #[serde(default)]
    pub query: Vec<QueryEntry>,
}

/// Path of a structured URL: a joined string or a list of segments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UrlPath {
    /// Already joined path.
    Joined(String),
    /// Path segments.
    Segments(Vec<PathSegment>),
}

/// One path segment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Plain segment.
    Text(String),
    /// Segment object (`{ "type": "string", "value": "ports" }`).
    Value {
        /// Segment value.
        value: String,
    },
}

impl PathSegment {
    fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Value { value } => value,
        }
    }
}

/// A declared path variable.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UrlVariable {
    /// Variable name, without the leading colon.
    #[serde(default)]
    pub key: String,
    /// Variable description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A query entry of a structured URL.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct QueryEntry {
    /// Parameter name.
    #[serde(default)]
    pub key: Option<String>,
    /// Parameter description.
    #[serde(default)]
    pub description: Option<String>,
    /// Disabled entries are not part of the request.
    #[serde(default)]
    pub disabled: bool,
}

/// A query parameter descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    /// Parameter name.
    pub name: String,
    /// Parameter description, may be empty.
    pub description: String,
    /// Whether the parameter was disabled in the collection.
    pub disabled: bool,
}

/// A normalized URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedUrl {
    /// Canonical path, always starting with `/`, variables in brace style.
    pub path: String,
    /// Enabled query parameters, in declaration order.
    pub query: Vec<QueryParam>,
    /// Descriptions of declared path variables, by variable name.
    pub variables: Vec<(String, String)>,
}

impl NormalizedUrl {
    /// Returns the description declared for a path variable.
    pub fn variable_description(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, description)| description.as_str())
    }
}

/// Normalizes collection URLs into canonical paths.
///
/// # Example
///
/// ```rust
/// use postspec_core::url::{RawUrl, UrlNormalizer};
///
/// let normalizer = UrlNormalizer::default();
/// let url = RawUrl::Raw("https://api.megaport.com/v2/ports/:portId?verbose=true".to_string());
/// let normalized = normalizer.normalize(&url).expect("a path");
///
/// assert_eq!(normalized.path, "/v2/ports/{portId}");
/// assert_eq!(normalized.query.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    known_hosts: Vec<String>,
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self::new(KNOWN_HOSTS)
    }
}

impl UrlNormalizer {
    /// Creates a normalizer stripping the given hosts.
    pub fn new(known_hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let known_hosts = known_hosts.into_iter().map(Into::into).collect();
        Self { known_hosts }
    }

    /// Normalizes a URL.
    ///
    /// Returns `None` when the URL carries no path information at all.
    pub fn normalize(&self, url: &RawUrl) -> Option<NormalizedUrl> {
        match url {
            RawUrl::Raw(raw) => self.normalize_str(raw),
            RawUrl::Structured(structured) => self.normalize_structured(structured),
        }
    }

    fn normalize_str(&self, raw: &str) -> Option<NormalizedUrl> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        Some(NormalizedUrl {
            path: self.canonical_path(path),
            query: parse_query_string(query),
            variables: Vec::new(),
        })
    }

    fn normalize_structured(&self, url: &StructuredUrl) -> Option<NormalizedUrl> {
        let mut normalized = match &url.path {
            Some(UrlPath::Segments(segments)) => {
                let joined = segments
                    .iter()
                    .map(PathSegment::as_str)
                    .collect::<Vec<_>>()
                    .join("/");
                NormalizedUrl {
                    path: self.canonical_path(&format!("/{joined}")),
                    ..NormalizedUrl::default()
                }
            }
            Some(UrlPath::Joined(path)) => self.normalize_str(path)?,
            None => self.normalize_str(url.raw.as_deref()?)?,
        };

        // Declared query entries are authoritative over the raw string
        if !url.query.is_empty() {
            normalized.query = url
                .query
                .iter()
                .filter(|entry| !entry.disabled)
                .filter_map(|entry| {
                    let name = entry.key.as_deref().filter(|key| !key.is_empty())?;
                    Some(QueryParam {
                        name: name.to_string(),
                        description: entry.description.clone().unwrap_or_default(),
                        disabled: false,
                    })
                })
                .collect();
        }

        normalized.variables = url
            .variable
            .iter()
            .filter(|variable| !variable.key.is_empty())
            .filter_map(|variable| {
                let description = variable.description.clone()?;
                Some((variable.key.clone(), description))
            })
            .collect();

        Some(normalized)
    }

    /// Strips a known host, rewrites colon variables and ensures a leading `/`.
    fn canonical_path(&self, path: &str) -> String {
        let path = self
            .known_hosts
            .iter()
            .find_map(|host| path.strip_prefix(host.as_str()))
            .unwrap_or(path);

        let path = COLON_VARIABLE.replace_all(path, "${lead}{${name}}");

        if path.starts_with('/') {
            path.into_owned()
        } else {
            format!("/{path}")
        }
    }
}

fn parse_query_string(query: &str) -> Vec<QueryParam> {
    query
        .split('&')
        .filter_map(|pair| {
            let name = pair.split_once('=').map_or(pair, |(name, _)| name);
            (!name.is_empty()).then(|| QueryParam {
                name: name.to_string(),
                description: String::new(),
                disabled: false,
            })
        })
        .collect()
}

/// Lists the brace-style variables of a path, in order, without duplicates.
///
/// ```rust
/// use postspec_core::url::path_variables;
///
/// assert_eq!(
///     path_variables("/v2/product/{productUid}/action/{action}"),
///     vec!["productUid", "action"]
/// );
/// ```
pub fn path_variables(path: &str) -> Vec<&str> {
    let mut names = Vec::new();
    for name in BRACE_VARIABLE
        .captures_iter(path)
        .filter_map(|caps| caps.name("name"))
        .map(|found| found.as_str())
    {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Removes every brace-style variable from a path.
pub(crate) fn strip_path_variables(path: &str) -> String {
    BRACE_VARIABLE.replace_all(path, "").into_owned()
}
