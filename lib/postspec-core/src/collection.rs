//! Postman collection model.
//!
//! A collection is a tree: folders (items holding an `item` list) group requests
//! (items holding a `request`). Only the fields the conversion needs are modelled,
//! everything else in the collection file is ignored.
//!
//! ```rust
//! use postspec_core::collection::{Collection, CollectionNode};
//!
//! let collection = Collection::from_json_str(r#"{
//!   "info": { "name": "Megaport API" },
//!   "item": [
//!     { "name": "Ports", "item": [
//!       { "name": "List Ports", "request": { "method": "GET", "url": "https://api.megaport.com/v2/ports" } }
//!     ] }
//!   ]
//! }"#)?;
//!
//! let [CollectionNode::Folder(folder)] = collection.items.as_slice() else {
//!     panic!("expected a single folder");
//! };
//! assert_eq!(folder.name, "Ports");
//! # Ok::<(), postspec_core::CollectionError>(())
//! ```

use std::io::Read;

use serde::Deserialize;

use crate::CollectionError;
use crate::url::RawUrl;

/// A Postman collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Collection {
    /// Collection metadata.
    #[serde(default)]
    pub info: CollectionInfo,
    /// Top-level nodes, in document order.
    #[serde(default, rename = "item")]
    pub items: Vec<CollectionNode>,
}

impl Collection {
    /// Parses a collection from a JSON string.
    ///
    /// Folders may be nested at any depth, only the stack size bounds it.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Parse`] with the JSON path of the invalid value.
    pub fn from_json_str(json: &str) -> Result<Self, CollectionError> {
        Self::parse(serde_json::Deserializer::from_str(json))
    }

    /// Parses a collection from a JSON reader.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Parse`] with the JSON path of the invalid value.
    pub fn from_reader(reader: impl Read) -> Result<Self, CollectionError> {
        Self::parse(serde_json::Deserializer::from_reader(reader))
    }

    fn parse<'de, R>(mut deserializer: serde_json::Deserializer<R>) -> Result<Self, CollectionError>
    where
        R: serde_json::de::Read<'de>,
    {
        deserializer.disable_recursion_limit();
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
            let location = err.path().to_string();
            CollectionError::Parse {
                location,
                error: err.into_inner(),
            }
        })
    }
}

/// Collection metadata (`info`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionInfo {
    /// Collection name, used as the document title.
    #[serde(default)]
    pub name: Option<String>,
    /// Free text, may contain markup.
    #[serde(default, deserialize_with = "description")]
    pub description: Option<String>,
}

/// A node of the collection tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawItem")]
pub enum CollectionNode {
    /// A folder grouping other nodes.
    Folder(FolderNode),
    /// A leaf describing one HTTP request.
    Request(RequestNode),
}

/// A folder: supplies its name as the tag of its descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    /// Folder name.
    pub name: String,
    /// Folder description.
    pub description: Option<String>,
    /// Child nodes, in document order.
    pub children: Vec<CollectionNode>,
}

/// A leaf of the collection tree.
///
/// The request is optional: collections exported by hand sometimes keep leaves
/// without any request, those contribute nothing to the conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestNode {
    /// Request name, used as the operation summary.
    pub name: String,
    /// Leaf description.
    pub description: Option<String>,
    /// The request itself.
    pub request: Option<Request>,
}

/// An HTTP request of the collection.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Request {
    /// HTTP method, `GET` when absent.
    #[serde(default)]
    pub method: Option<String>,
    /// Target URL.
    #[serde(default)]
    pub url: Option<RawUrl>,
    /// Request description, used when the leaf has none.
    #[serde(default, deserialize_with = "description")]
    pub description: Option<String>,
    /// Request body.
    #[serde(default)]
    pub body: Option<Body>,
    /// Request authentication.
    #[serde(default)]
    pub auth: Option<Auth>,
}

/// A request body.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Body {
    /// Body mode.
    #[serde(default)]
    pub mode: BodyMode,
    /// Raw content, for [`BodyMode::Raw`].
    #[serde(default)]
    pub raw: Option<String>,
    /// Form fields, for [`BodyMode::Urlencoded`].
    #[serde(default)]
    pub urlencoded: Vec<FormField>,
}

/// How a request body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyMode {
    /// Raw text, assumed to be JSON.
    #[default]
    Raw,
    /// `application/x-www-form-urlencoded` fields.
    Urlencoded,
    /// Any other mode (`formdata`, `file`, `graphql`, ...).
    #[serde(other)]
    Other,
}

/// One field of a url-encoded body.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FormField {
    /// Field name.
    #[serde(default)]
    pub key: String,
    /// Field description.
    #[serde(default, deserialize_with = "description")]
    pub description: Option<String>,
    /// Disabled fields are ignored.
    #[serde(default)]
    pub disabled: bool,
}

/// Request authentication.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Auth {
    /// Authentication kind.
    #[serde(rename = "type")]
    pub kind: AuthKind,
}

/// Supported authentication kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// HTTP bearer token.
    Bearer,
    /// HTTP basic authentication.
    Basic,
    /// Anything else (`noauth`, `apikey`, `oauth2`, ...).
    #[serde(other)]
    Other,
}

/// The item shape of the Postman format, before telling folders from requests.
#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "description")]
    description: Option<String>,
    #[serde(default)]
    item: Option<Vec<CollectionNode>>,
    #[serde(default)]
    request: Option<RawRequest>,
}

/// Postman allows a request to be a bare URL.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRequest {
    Url(String),
    Full(Request),
}

impl From<RawItem> for CollectionNode {
    fn from(value: RawItem) -> Self {
        let RawItem {
            name,
            description,
            item,
            request,
        } = value;

        if let Some(children) = item {
            return Self::Folder(FolderNode {
                name,
                description,
                children,
            });
        }

        let request = request.map(|request| match request {
            RawRequest::Url(url) => Request {
                url: Some(RawUrl::Raw(url)),
                ..Request::default()
            },
            RawRequest::Full(request) => request,
        });
        Self::Request(RequestNode {
            name,
            description,
            request,
        })
    }
}

/// Descriptions are either plain text or a `{ content, type }` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDescription {
    Text(String),
    Content {
        #[serde(default)]
        content: Option<String>,
    },
}

fn description<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<RawDescription>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match raw {
        RawDescription::Text(text) => Some(text),
        RawDescription::Content { content } => content,
    }))
}
