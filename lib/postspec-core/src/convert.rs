//! Collection tree walking.
//!
//! The walker visits the collection in document order. A folder replaces the tag
//! context of its descendants with its own name (siblings are not affected); a
//! request becomes one `(path, method, operation)` entry under the current tag.

use http::Method;
use indexmap::IndexMap;
use tracing::{debug, info, warn};
use utoipa::openapi::OpenApi;
use utoipa::openapi::path::{Operation, PathItem};

use crate::assemble::assemble;
use crate::collection::{Collection, CollectionNode, RequestNode};
use crate::config::{ConverterBuilder, ConverterConfig};
use crate::operation::{LeafRequest, build_operation, parse_method};
use crate::report::{ConversionReport, Overwrite, SkipReason, SkippedLeaf};
use crate::split::{OpenApiSplitExt, SplitPathsByTag, SplitResult};
use crate::tags::TagRegistry;
use crate::url::UrlNormalizer;

/// The operations of one path, by method, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PathEntry {
    /// Operations by HTTP method.
    pub methods: IndexMap<Method, Operation>,
}

impl PathEntry {
    /// The first tag of the first tagged operation, in insertion order.
    pub fn primary_tag(&self) -> Option<&str> {
        self.methods
            .values()
            .find_map(|operation| operation.tags.as_ref()?.first())
            .map(String::as_str)
    }
}

/// Operations keyed by normalized path, in document order.
#[derive(Debug, Clone, Default)]
pub struct PathMap {
    entries: IndexMap<String, PathEntry>,
}

impl PathMap {
    /// Inserts an operation.
    ///
    /// An operation already present for the same path and method is replaced, the
    /// replacement is recorded in the report.
    pub fn insert(
        &mut self,
        path: String,
        method: Method,
        operation: Operation,
        report: &mut ConversionReport,
    ) {
        let kept = operation.summary.clone().unwrap_or_default();
        let entry = self.entries.entry(path.clone()).or_default();
        if let Some(previous) = entry.methods.insert(method.clone(), operation) {
            let replaced = previous.summary.unwrap_or_default();
            warn!(%path, %method, %replaced, %kept, "duplicate endpoint, last one wins");
            report.overwrites.push(Overwrite {
                path,
                method,
                replaced,
                kept,
            });
        }
    }

    /// Merges another map into this one, unioning the methods of shared paths.
    pub fn merge(&mut self, other: Self, report: &mut ConversionReport) {
        for (path, entry) in other.entries {
            for (method, operation) in entry.methods {
                self.insert(path.clone(), method, operation, report);
            }
        }
    }

    /// Returns the entry of a path.
    pub fn get(&self, path: &str) -> Option<&PathEntry> {
        self.entries.get(path)
    }

    /// Iterates over paths and their entries, in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PathEntry)> {
        self.entries.iter()
    }

    /// Returns the number of paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there is no path.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the primary tag of every path having a tagged operation.
    pub fn primary_tags(&self) -> IndexMap<String, String> {
        self.entries
            .iter()
            .filter_map(|(path, entry)| Some((path.clone(), entry.primary_tag()?.to_string())))
            .collect()
    }

    /// Returns the number of operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.entries.values().map(|entry| entry.methods.len()).sum()
    }
}

impl IntoIterator for PathMap {
    type Item = (String, PathEntry);
    type IntoIter = indexmap::map::IntoIter<String, PathEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// The result of a conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The assembled OpenAPI document.
    pub document: OpenApi,
    /// What was skipped, overwritten or collided.
    pub report: ConversionReport,
    /// Primary tag of each path, taken in the order its operations were met.
    ///
    /// The document loses that order: its path items hold methods in a fixed order.
    pub primary_tags: IndexMap<String, String>,
}

impl Conversion {
    /// Splits the document, each path going to the directory of its primary tag.
    pub fn split(&self, splitter: SplitPathsByTag) -> SplitResult<PathItem> {
        self.document
            .clone()
            .split_with(&splitter.with_primary_tags(self.primary_tags.clone()))
    }
}

/// Converts Postman collections into OpenAPI documents.
///
/// # Example
///
/// ```rust
/// use postspec_core::{Collection, Converter};
///
/// let collection = Collection::from_json_str(r#"{
///   "item": [
///     { "name": "Authentication", "item": [
///       { "name": "Login", "request": { "method": "POST", "url": "https://api.megaport.com/v2/login" } }
///     ] }
///   ]
/// }"#)?;
///
/// let conversion = Converter::default().convert(&collection);
///
/// let item = conversion.document.paths.paths.get("/v2/login").expect("a path");
/// let login = item.post.as_ref().expect("a POST operation");
/// assert_eq!(login.operation_id.as_deref(), Some("postv2login"));
/// assert!(login.security.is_none());
/// # Ok::<(), postspec_core::CollectionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConverterConfig,
    normalizer: UrlNormalizer,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

impl Converter {
    pub(crate) fn new(config: ConverterConfig) -> Self {
        let normalizer = UrlNormalizer::new(config.known_hosts.iter().cloned());
        Self { config, normalizer }
    }

    /// Creates a converter builder.
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::default()
    }

    /// Converts a collection into an OpenAPI document.
    pub fn convert(&self, collection: &Collection) -> Conversion {
        let mut report = ConversionReport::default();

        let paths = self.walk(&collection.items, &self.config.default_tag, &mut report);
        let tags = TagRegistry::from_nodes(&collection.items);
        let primary_tags = paths.primary_tags();
        let document = assemble(&self.config, &collection.info, paths, &tags, &mut report);

        info!(
            paths = document.paths.paths.len(),
            tags = tags.len(),
            skipped = report.skipped.len(),
            overwrites = report.overwrites.len(),
            collisions = report.collisions.len(),
            "collection converted"
        );
        Conversion {
            document,
            report,
            primary_tags,
        }
    }

    /// Walks a sequence of nodes under the `tag` context.
    pub fn walk(
        &self,
        nodes: &[CollectionNode],
        tag: &str,
        report: &mut ConversionReport,
    ) -> PathMap {
        let mut paths = PathMap::default();

        for node in nodes {
            match node {
                CollectionNode::Folder(folder) => {
                    report.folders += 1;
                    let folder_tag = if folder.name.trim().is_empty() {
                        self.config.default_tag.as_str()
                    } else {
                        folder.name.as_str()
                    };
                    debug!(folder = %folder.name, children = folder.children.len(), "walking folder");
                    let children = self.walk(&folder.children, folder_tag, report);
                    paths.merge(children, report);
                }
                CollectionNode::Request(leaf) => {
                    report.leaves += 1;
                    match self.endpoint(leaf, tag) {
                        Ok((path, method, operation)) => {
                            debug!(%path, %method, %tag, "request converted");
                            paths.insert(path, method, operation, report);
                        }
                        Err(reason) => {
                            warn!(name = %leaf.name, %reason, "request skipped");
                            report.skipped.push(SkippedLeaf {
                                name: leaf.name.clone(),
                                reason,
                            });
                        }
                    }
                }
            }
        }

        paths
    }

    fn endpoint(
        &self,
        leaf: &RequestNode,
        tag: &str,
    ) -> Result<(String, Method, Operation), SkipReason> {
        let request = leaf.request.as_ref().ok_or(SkipReason::MissingRequest)?;

        let raw_method = request.method.as_deref().unwrap_or("GET");
        let method = parse_method(raw_method)
            .ok_or_else(|| SkipReason::UnsupportedMethod(raw_method.to_string()))?;

        let url = request
            .url
            .as_ref()
            .and_then(|url| self.normalizer.normalize(url))
            .ok_or(SkipReason::MissingUrl)?;

        let description = leaf.description.as_deref().or(request.description.as_deref());
        let leaf_request = LeafRequest {
            name: &leaf.name,
            description,
            method: &method,
            body: request.body.as_ref(),
            auth: request.auth.as_ref(),
        };
        let operation = build_operation(&leaf_request, tag, &url);

        Ok((url.path, method, operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{FolderNode, Request};
    use crate::url::RawUrl;

    fn folder(name: &str, children: Vec<CollectionNode>) -> CollectionNode {
        CollectionNode::Folder(FolderNode {
            name: name.to_string(),
            description: None,
            children,
        })
    }

    fn leaf(name: &str, method: &str, url: &str) -> CollectionNode {
        CollectionNode::Request(RequestNode {
            name: name.to_string(),
            description: None,
            request: Some(Request {
                method: Some(method.to_string()),
                url: Some(RawUrl::Raw(url.to_string())),
                ..Request::default()
            }),
        })
    }

    fn tag_of(paths: &PathMap, path: &str, method: &Method) -> Option<String> {
        paths
            .get(path)?
            .methods
            .get(method)?
            .tags
            .as_ref()?
            .first()
            .cloned()
    }

    #[test]
    fn should_inherit_folder_tag_downward_only() {
        let nodes = vec![
            folder(
                "Ports",
                vec![
                    leaf("List Ports", "GET", "/v2/ports"),
                    folder("Port Details", vec![leaf("Get Port", "GET", "/v2/port/:id")]),
                    leaf("Buy Port", "POST", "/v2/ports"),
                ],
            ),
            leaf("Ping", "GET", "/ping"),
        ];
        let mut report = ConversionReport::default();

        let paths = Converter::default().walk(&nodes, "default", &mut report);

        assert_eq!(tag_of(&paths, "/v2/ports", &Method::GET).as_deref(), Some("Ports"));
        assert_eq!(tag_of(&paths, "/v2/ports", &Method::POST).as_deref(), Some("Ports"));
        assert_eq!(
            tag_of(&paths, "/v2/port/{id}", &Method::GET).as_deref(),
            Some("Port Details")
        );
        assert_eq!(tag_of(&paths, "/ping", &Method::GET).as_deref(), Some("default"));
        assert_eq!(report.folders, 2);
        assert_eq!(report.leaves, 4);
    }

    #[test]
    fn should_union_methods_across_branches() {
        let nodes = vec![
            folder("Read", vec![leaf("List Ports", "GET", "/v2/ports")]),
            folder("Write", vec![leaf("Buy Port", "POST", "/v2/ports")]),
        ];
        let mut report = ConversionReport::default();

        let paths = Converter::default().walk(&nodes, "default", &mut report);

        assert_eq!(paths.len(), 1);
        let methods: Vec<_> = paths
            .get("/v2/ports")
            .map(|entry| entry.methods.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(methods, vec![Method::GET, Method::POST]);
        assert!(report.overwrites.is_empty());
    }

    #[test]
    fn should_let_last_duplicate_win() {
        let nodes = vec![
            folder("First", vec![leaf("List Ports", "GET", "/v2/ports")]),
            folder("Second", vec![leaf("List Ports Again", "GET", "/v2/ports")]),
        ];
        let mut report = ConversionReport::default();

        let paths = Converter::default().walk(&nodes, "default", &mut report);

        assert_eq!(tag_of(&paths, "/v2/ports", &Method::GET).as_deref(), Some("Second"));
        assert_eq!(
            report.overwrites,
            vec![Overwrite {
                path: "/v2/ports".to_string(),
                method: Method::GET,
                replaced: "List Ports".to_string(),
                kept: "List Ports Again".to_string(),
            }]
        );
    }

    #[test]
    fn should_skip_unusable_leaves() {
        let nodes = vec![
            CollectionNode::Request(RequestNode {
                name: "Draft".to_string(),
                description: None,
                request: None,
            }),
            CollectionNode::Request(RequestNode {
                name: "No URL".to_string(),
                description: None,
                request: Some(Request::default()),
            }),
            leaf("Tunnel", "CONNECT", "/v2/tunnel"),
            leaf("Empty URL", "GET", ""),
            leaf("List Ports", "GET", "/v2/ports"),
        ];
        let mut report = ConversionReport::default();

        let paths = Converter::default().walk(&nodes, "default", &mut report);

        assert_eq!(paths.operation_count(), 1);
        let reasons: Vec<_> = report.skipped.iter().map(|skipped| skipped.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::MissingRequest,
                SkipReason::MissingUrl,
                SkipReason::UnsupportedMethod("CONNECT".to_string()),
                SkipReason::MissingUrl,
            ]
        );
    }

    #[test]
    fn should_default_missing_method_to_get() {
        let nodes = vec![CollectionNode::Request(RequestNode {
            name: "Ping".to_string(),
            description: None,
            request: Some(Request {
                url: Some(RawUrl::Raw("/ping".to_string())),
                ..Request::default()
            }),
        })];
        let mut report = ConversionReport::default();

        let paths = Converter::default().walk(&nodes, "default", &mut report);

        assert!(paths.get("/ping").is_some_and(|entry| entry.methods.contains_key(&Method::GET)));
    }

    #[test]
    fn should_use_default_tag_for_unnamed_folder() {
        let nodes = vec![folder(" ", vec![leaf("Ping", "GET", "/ping")])];
        let mut report = ConversionReport::default();

        let paths = Converter::builder()
            .with_default_tag("misc")
            .build()
            .walk(&nodes, "misc", &mut report);

        assert_eq!(tag_of(&paths, "/ping", &Method::GET).as_deref(), Some("misc"));
    }

    #[test]
    fn should_walk_deep_trees() {
        let mut node = leaf("Deep", "GET", "/deep");
        for depth in 0..200 {
            node = folder(&format!("Level {depth}"), vec![node]);
        }
        let mut report = ConversionReport::default();

        let paths = Converter::default().walk(&[node], "default", &mut report);

        assert_eq!(tag_of(&paths, "/deep", &Method::GET).as_deref(), Some("Level 0"));
        assert_eq!(report.folders, 200);
    }

    #[test]
    fn should_take_primary_tag_in_insertion_order() {
        let collection = Collection {
            items: vec![
                folder("Write", vec![leaf("Create X", "POST", "/v2/x")]),
                folder("Read", vec![leaf("Get X", "GET", "/v2/x")]),
            ],
            ..Collection::default()
        };

        let conversion = Converter::default().convert(&collection);
        let result = conversion.split(SplitPathsByTag::default());

        assert_eq!(
            conversion.primary_tags.get("/v2/x").map(String::as_str),
            Some("Write")
        );
        assert_eq!(result.main.reference("/v2/x"), Some("./paths/write/v2-x.yaml"));
        let tags: Vec<_> = result.main.tags.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(tags, vec!["Write"]);
        assert!(result.is_lossless());
    }
}
