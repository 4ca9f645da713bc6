//! Built-in splitting strategies.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;
use utoipa::openapi::path::{Operation, PathItem};
use utoipa::openapi::tag::{Tag, TagBuilder};
use utoipa::openapi::{OpenApi, Ref};

use super::{Fragment, OpenApiSplitter, RootDocument, SplitResult};
use crate::config::DEFAULT_TAG;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("a valid regex"));

/// Iterates over the operations of a path item, in the fixed method order
/// (get, put, post, delete, options, head, patch, trace).
fn iter_operations(path_item: &PathItem) -> impl Iterator<Item = &Operation> {
    [
        path_item.get.as_ref(),
        path_item.put.as_ref(),
        path_item.post.as_ref(),
        path_item.delete.as_ref(),
        path_item.options.as_ref(),
        path_item.head.as_ref(),
        path_item.patch.as_ref(),
        path_item.trace.as_ref(),
    ]
    .into_iter()
    .flatten()
}

/// The first tag of the first operation declaring one.
fn primary_tag(path_item: &PathItem) -> Option<&str> {
    iter_operations(path_item)
        .filter_map(|operation| operation.tags.as_ref()?.first())
        .map(String::as_str)
        .next()
}

/// Directory name of a tag: lowercase, runs of other characters become a single `-`.
///
/// Non-ASCII letters are transliterated rather than replaced, `Café` gives `cafe`.
///
/// ```rust
/// use postspec_core::split::tag_slug;
///
/// assert_eq!(tag_slug("Port Details"), "port-details");
/// assert_eq!(tag_slug("MCR / MVE"), "mcr-mve");
/// assert_eq!(tag_slug("***"), "default");
/// ```
pub fn tag_slug(tag: &str) -> String {
    let slug = slug::slugify(tag);
    if slug.is_empty() {
        DEFAULT_TAG.to_string()
    } else {
        slug
    }
}

/// File name of a path, case preserved: runs of non-alphanumeric characters become
/// a single `-`; the root path `/` is `root`.
///
/// ```rust
/// use postspec_core::split::path_slug;
///
/// assert_eq!(path_slug("/v2/ports/{portId}"), "v2-ports-portId");
/// assert_eq!(path_slug("/"), "root");
/// ```
pub fn path_slug(path: &str) -> String {
    let slug = NON_ALPHANUMERIC.replace_all(path, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "root".to_string()
    } else {
        slug.to_string()
    }
}

/// Splits the paths into one file per path, grouped in one directory per primary tag.
///
/// The primary tag of a path is the one set with [`with_primary_tags`](Self::with_primary_tags),
/// else the first tag of its first tagged operation, else the default tag.
/// [`Conversion::split`](crate::Conversion::split) sets the primary tags from the
/// order operations were converted in. The root document references every path file and only
/// lists the primary tags actually used, in first-seen order; a used tag the
/// document does not declare is listed with its name only.
///
/// Two paths whose slugs only differ by case, or collapse to the same slug, get a
/// numeric suffix so every path keeps its own file.
///
/// # Example
///
/// ```rust
/// use postspec_core::split::{OpenApiSplitter, SplitPathsByTag};
/// use utoipa::openapi::{HttpMethod, OpenApiBuilder, Paths};
/// use utoipa::openapi::path::{OperationBuilder, PathItem};
///
/// let operation = OperationBuilder::new().tag("Ports").build();
/// let mut paths = Paths::new();
/// paths.paths.insert("/v2/ports".to_string(), PathItem::new(HttpMethod::Get, operation));
/// let spec = OpenApiBuilder::new().paths(paths).build();
///
/// let result = SplitPathsByTag::default().split(spec);
///
/// assert_eq!(result.main.reference("/v2/ports"), Some("./paths/ports/v2-ports.yaml"));
/// ```
#[derive(Debug, Clone)]
pub struct SplitPathsByTag {
    paths_dir: String,
    extension: String,
    default_tag: String,
    primary_tags: HashMap<String, String>,
}

impl Default for SplitPathsByTag {
    fn default() -> Self {
        Self {
            paths_dir: "paths".to_string(),
            extension: "yaml".to_string(),
            default_tag: DEFAULT_TAG.to_string(),
            primary_tags: HashMap::new(),
        }
    }
}

impl SplitPathsByTag {
    /// Sets the directory holding the tag directories, relative to the root document.
    #[must_use]
    pub fn with_paths_dir(mut self, dir: impl Into<String>) -> Self {
        self.paths_dir = dir.into();
        self
    }

    /// Sets the extension of the path files.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the tag of paths without any tagged operation.
    #[must_use]
    pub fn with_default_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_tag = tag.into();
        self
    }

    /// Sets the primary tag of some paths, overriding the one read from their
    /// operations.
    #[must_use]
    pub fn with_primary_tags(mut self, tags: impl IntoIterator<Item = (String, String)>) -> Self {
        self.primary_tags.extend(tags);
        self
    }
}

impl OpenApiSplitter for SplitPathsByTag {
    type Fragment = PathItem;

    fn split(&self, spec: OpenApi) -> SplitResult<Self::Fragment> {
        let declared: HashMap<String, Tag> = spec
            .tags
            .iter()
            .flatten()
            .map(|tag| (tag.name.clone(), tag.clone()))
            .collect();

        let mut result = SplitResult::new(RootDocument::from_metadata(&spec));
        let mut used_tags: IndexMap<String, Tag> = IndexMap::new();
        let mut taken: HashMap<String, HashSet<String>> = HashMap::new();

        for (path, path_item) in spec.paths.paths {
            let tag = self
                .primary_tags
                .get(&path)
                .map(String::as_str)
                .or_else(|| primary_tag(&path_item))
                .unwrap_or(&self.default_tag)
                .to_string();
            let dir = tag_slug(&tag);
            let file = unique_slug(path_slug(&path), taken.entry(dir.clone()).or_default());

            let fragment = Fragment::new(
                format!("{}/{dir}/{file}.{}", self.paths_dir, self.extension),
                path.clone(),
                path_item,
            );
            debug!(%path, %tag, file = %fragment.path.display(), "path extracted");

            result
                .main
                .paths
                .insert(path, Ref::new(fragment.reference()));
            result.add_fragment(fragment);

            if !used_tags.contains_key(&tag) {
                let entry = declared
                    .get(&tag)
                    .cloned()
                    .unwrap_or_else(|| TagBuilder::new().name(&tag).build());
                used_tags.insert(tag, entry);
            }
        }

        result.main.tags = used_tags.into_values().collect();
        result
    }
}

/// Returns `slug`, or `slug-N` with the smallest `N >= 2` not yet taken, compared
/// case-insensitively.
fn unique_slug(slug: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(slug.to_lowercase()) {
        return slug;
    }
    let mut suffix = 2_usize;
    loop {
        let candidate = format!("{slug}-{suffix}");
        if taken.insert(candidate.to_lowercase()) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use utoipa::openapi::path::OperationBuilder;
    use utoipa::openapi::{HttpMethod, OpenApiBuilder, Paths};

    use super::*;

    fn tagged(tag: Option<&str>) -> Operation {
        let builder = OperationBuilder::new().summary(Some("op"));
        match tag {
            Some(tag) => builder.tag(tag).build(),
            None => builder.build(),
        }
    }

    fn spec(entries: Vec<(&str, PathItem)>, tags: Vec<Tag>) -> OpenApi {
        let mut paths = Paths::new();
        for (path, item) in entries {
            paths.paths.insert(path.to_string(), item);
        }
        OpenApiBuilder::new()
            .paths(paths)
            .tags((!tags.is_empty()).then_some(tags))
            .build()
    }

    fn tag_names(result: &SplitResult<PathItem>) -> Vec<String> {
        result.main.tags.iter().map(|tag| tag.name.clone()).collect()
    }

    #[rstest]
    #[case("/v2/locations", "v2-locations")]
    #[case("/v2/ports/{portId}", "v2-ports-portId")]
    #[case("/v3/product/{productUid}/action/{action}", "v3-product-productUid-action-action")]
    #[case("/a.b", "a-b")]
    #[case("/", "root")]
    #[case("", "root")]
    fn should_slug_paths(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(path_slug(path), expected);
    }

    #[rstest]
    #[case("Ports", "ports")]
    #[case("Port  Details", "port-details")]
    #[case("Cloud -- Partner", "cloud-partner")]
    #[case("Café", "cafe")]
    #[case("", "default")]
    fn should_slug_tags(#[case] tag: &str, #[case] expected: &str) {
        assert_eq!(tag_slug(tag), expected);
    }

    #[test]
    fn should_pick_first_tag_in_method_order() {
        let mut item = PathItem::new(HttpMethod::Post, tagged(Some("Write")));
        item.get = Some(tagged(Some("Read")));

        assert_eq!(primary_tag(&item), Some("Read"));
    }

    #[test]
    fn should_prefer_given_primary_tag() {
        let mut item = PathItem::new(HttpMethod::Post, tagged(Some("Write")));
        item.get = Some(tagged(Some("Read")));
        let spec = spec(vec![("/v2/x", item)], vec![]);

        let result = SplitPathsByTag::default()
            .with_primary_tags([("/v2/x".to_string(), "Write".to_string())])
            .split(spec);

        assert_eq!(result.main.reference("/v2/x"), Some("./paths/write/v2-x.yaml"));
        assert_eq!(tag_names(&result), vec!["Write"]);
    }

    #[test]
    fn should_skip_untagged_operations() {
        let mut item = PathItem::new(HttpMethod::Get, tagged(None));
        item.delete = Some(tagged(Some("Ports")));

        assert_eq!(primary_tag(&item), Some("Ports"));
    }

    #[test]
    fn should_reference_one_file_per_path() {
        let spec = spec(
            vec![
                ("/v2/ports", PathItem::new(HttpMethod::Get, tagged(Some("Ports")))),
                ("/v2/login", PathItem::new(HttpMethod::Post, tagged(Some("Authentication")))),
                ("/ping", PathItem::new(HttpMethod::Get, tagged(None))),
            ],
            vec![],
        );

        let result = SplitPathsByTag::default().split(spec);

        let references: Vec<_> = result
            .main
            .paths
            .values()
            .map(|reference| reference.ref_location.as_str())
            .collect();
        assert_eq!(
            references,
            vec![
                "./paths/ports/v2-ports.yaml",
                "./paths/authentication/v2-login.yaml",
                "./paths/default/ping.yaml",
            ]
        );
        assert!(result.is_lossless());
    }

    #[test]
    fn should_list_used_tags_in_first_seen_order() {
        let declared = vec![
            TagBuilder::new().name("Unused").build(),
            TagBuilder::new()
                .name("Ports")
                .description(Some("Port endpoints"))
                .build(),
        ];
        let spec = spec(
            vec![
                ("/ping", PathItem::new(HttpMethod::Get, tagged(None))),
                ("/v2/ports", PathItem::new(HttpMethod::Get, tagged(Some("Ports")))),
                ("/v2/port/{id}", PathItem::new(HttpMethod::Get, tagged(Some("Ports")))),
            ],
            declared,
        );

        let result = SplitPathsByTag::default().split(spec);

        assert_eq!(tag_names(&result), vec!["default", "Ports"]);
        assert_eq!(result.main.tags.first().and_then(|tag| tag.description.clone()), None);
        assert_eq!(
            result.main.tags.get(1).and_then(|tag| tag.description.clone()).as_deref(),
            Some("Port endpoints")
        );
    }

    #[test]
    fn should_keep_colliding_slugs_apart() {
        let spec = spec(
            vec![
                ("/a.b", PathItem::new(HttpMethod::Get, tagged(Some("Misc")))),
                ("/a-b", PathItem::new(HttpMethod::Get, tagged(Some("Misc")))),
                ("/A-B", PathItem::new(HttpMethod::Get, tagged(Some("misc")))),
            ],
            vec![],
        );

        let result = SplitPathsByTag::default().split(spec);

        let files: Vec<_> = result
            .fragments
            .iter()
            .map(|fragment| fragment.path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            files,
            vec![
                "paths/misc/a-b.yaml",
                "paths/misc/a-b-2.yaml",
                "paths/misc/A-B-3.yaml",
            ]
        );
        assert!(result.is_lossless());
    }

    #[test]
    fn should_honor_custom_layout() {
        let spec = spec(
            vec![("/ping", PathItem::new(HttpMethod::Get, tagged(None)))],
            vec![],
        );

        let result = SplitPathsByTag::default()
            .with_paths_dir("endpoints")
            .with_extension("yml")
            .with_default_tag("Misc")
            .split(spec);

        assert_eq!(result.main.reference("/ping"), Some("./endpoints/misc/ping.yml"));
        assert_eq!(tag_names(&result), vec!["Misc"]);
    }

    #[test]
    fn should_resolve_back_to_original_paths() -> anyhow::Result<()> {
        let spec = spec(
            vec![
                ("/v2/ports", PathItem::new(HttpMethod::Get, tagged(Some("Ports")))),
                ("/", PathItem::new(HttpMethod::Get, tagged(None))),
            ],
            vec![],
        );
        let original = spec.paths.clone();

        let resolved = SplitPathsByTag::default().split(spec).resolve()?;

        assert_eq!(resolved.paths, original);
        Ok(())
    }
}
