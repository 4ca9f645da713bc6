//! Tag registry.

use indexmap::IndexMap;
use utoipa::openapi::tag::{Tag, TagBuilder};

use crate::collection::CollectionNode;
use crate::operation::clean_description;

/// Tags discovered from the collection folders.
///
/// Folders are registered depth-first, a parent before its children. When two
/// folders share a name, the first one registered keeps its description.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: IndexMap<String, String>,
}

impl TagRegistry {
    /// Collects the tags of every folder in the tree.
    pub fn from_nodes(nodes: &[CollectionNode]) -> Self {
        let mut registry = Self::default();
        registry.collect(nodes);
        registry
    }

    fn collect(&mut self, nodes: &[CollectionNode]) {
        for node in nodes {
            if let CollectionNode::Folder(folder) = node {
                if folder.name.trim().is_empty() {
                    self.collect(&folder.children);
                    continue;
                }
                let description = folder
                    .description
                    .as_deref()
                    .map(clean_description)
                    .unwrap_or_default();
                self.register(&folder.name, description);
                self.collect(&folder.children);
            }
        }
    }

    /// Registers a tag, returns `false` if the name was already registered.
    pub fn register(&mut self, name: &str, description: impl Into<String>) -> bool {
        if self.tags.contains_key(name) {
            return false;
        }
        self.tags.insert(name.to_string(), description.into());
        true
    }

    /// Returns `true` if the tag was registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Returns the number of registered tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if no tag was registered.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Looks a tag up.
    ///
    /// Tags never registered, like the implicit `default` tag of ungrouped requests,
    /// yield a stub holding only the name.
    pub fn get(&self, name: &str) -> Tag {
        let description = self
            .tags
            .get(name)
            .filter(|description| !description.is_empty())
            .cloned();
        TagBuilder::new().name(name).description(description).build()
    }

    /// All registered tags, in registration order.
    pub fn to_tags(&self) -> Vec<Tag> {
        self.tags.keys().map(|name| self.get(name)).collect()
    }
}
