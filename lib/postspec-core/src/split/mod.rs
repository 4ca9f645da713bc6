//! OpenAPI specification partitioning.
//!
//! A converted document is split into a root document, whose paths are `$ref`
//! pointers, plus one file per path grouped in one directory per primary tag:
//!
//! ```text
//! openapi.yaml
//! paths/
//!   authentication/v2-login.yaml
//!   ports/v2-ports.yaml
//!   ports/v2-ports-portId.yaml
//! ```
//!
//! The partition is lossless: [`SplitResult::resolve`] inlines the fragments back.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use postspec_core::load::load_collection;
//! use postspec_core::split::{OpenApiSplitExt, SplitPathsByTag};
//! use postspec_core::Converter;
//!
//! let collection = load_collection(Path::new("megaport.postman_collection.json"))?;
//! let spec = Converter::default().convert(&collection).document;
//!
//! let result = spec.split_with(&SplitPathsByTag::default());
//! let files = result.write_to(Path::new("specs"), "openapi.yaml")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod batch;
mod fragment;
mod root;
mod splitter;
mod strategies;

pub use batch::{BatchOutcome, BatchReport, ROOT_FILE, split_files};
pub use fragment::{Fragment, SplitResult};
pub use root::RootDocument;
pub use splitter::{OpenApiSplitExt, OpenApiSplitter};
pub use strategies::{SplitPathsByTag, path_slug, tag_slug};
