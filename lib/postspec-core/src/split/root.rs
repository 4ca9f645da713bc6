//! The root document of a partitioned specification.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::openapi::info::Info;
use utoipa::openapi::security::SecurityRequirement;
use utoipa::openapi::server::Server;
use utoipa::openapi::tag::Tag;
use utoipa::openapi::{Components, OpenApi, OpenApiVersion, Ref};

/// An OpenAPI document whose path items are references to external files.
///
/// Everything but the paths is carried over from the split document; the tags are
/// narrowed to the ones used as a primary tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootDocument {
    /// OpenAPI version.
    pub openapi: OpenApiVersion,

    /// Document metadata.
    pub info: Info,

    /// Target servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,

    /// API paths, each one referencing the file holding its path item.
    pub paths: IndexMap<String, Ref>,

    /// Shared components: security schemes and schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    /// Global security requirements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    /// Tags used by the referenced files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl RootDocument {
    /// Creates a root document with the metadata of `spec`, without paths nor tags.
    pub fn from_metadata(spec: &OpenApi) -> Self {
        Self {
            openapi: spec.openapi.clone(),
            info: spec.info.clone(),
            servers: spec.servers.clone(),
            paths: IndexMap::new(),
            components: spec.components.clone(),
            security: spec.security.clone(),
            tags: Vec::new(),
        }
    }

    /// Returns the reference location of a path.
    pub fn reference(&self, path: &str) -> Option<&str> {
        self.paths
            .get(path)
            .map(|reference| reference.ref_location.as_str())
    }
}
