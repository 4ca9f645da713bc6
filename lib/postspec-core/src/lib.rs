//! # Postspec Core
//!
//! Convert Postman collections into OpenAPI specifications, then partition them
//! into one file per path.
//!
//! ## Conversion
//!
//! The collection tree is walked depth-first. Every folder supplies a tag to its
//! descendants, every request becomes one operation:
//!
//! - the URL is reduced to a canonical path (known hosts stripped, `:name`
//!   variables rewritten as `{name}`) and query parameters
//! - the operation identifier is the lowercase method followed by the path
//!   stripped of its variables and of every non-alphanumeric character
//! - requests whose name contains `login` or `token` are anonymous, the other
//!   ones require the `bearerAuth` scheme
//!
//! ```rust
//! use postspec_core::{Collection, Converter};
//!
//! let collection = Collection::from_json_str(r#"{
//!   "info": { "name": "Megaport API" },
//!   "item": [
//!     { "name": "List Ports", "request": { "method": "GET", "url": "https://api.megaport.com/v2/ports" } },
//!     { "name": "Ports", "item": [
//!       { "name": "Get Port", "request": { "method": "GET", "url": "https://api.megaport.com/v2/ports/:portId" } }
//!     ] }
//!   ]
//! }"#)?;
//!
//! let conversion = Converter::default().convert(&collection);
//!
//! // both operations are identified as `getv2ports`
//! assert_eq!(conversion.report.collisions.len(), 1);
//!
//! let paths = &conversion.document.paths.paths;
//! assert!(paths.contains_key("/v2/ports"));
//! assert!(paths.contains_key("/v2/ports/{portId}"));
//! # Ok::<(), postspec_core::CollectionError>(())
//! ```
//!
//! ## Partitioning
//!
//! See the [`split`] module: [`SplitPathsByTag`](split::SplitPathsByTag) writes a
//! root document referencing `paths/<tag>/<path>.yaml` files.

mod assemble;
pub mod collection;
mod config;
mod convert;
mod error;
pub mod load;
pub mod operation;
mod report;
pub mod split;
mod tags;
pub mod url;
mod yaml;

pub use self::collection::Collection;
pub use self::config::{ConverterBuilder, ConverterConfig, DEFAULT_TAG, DEFAULT_TITLE};
pub use self::convert::{Conversion, Converter, PathEntry, PathMap};
pub use self::error::{CollectionError, DocumentError};
pub use self::report::{ConversionReport, OperationIdCollision, Overwrite, SkipReason, SkippedLeaf};
pub use self::tags::TagRegistry;
pub use self::yaml::{ToYaml, YamlError};
