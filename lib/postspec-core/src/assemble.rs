//! Document assembly.

use http::Method;
use indexmap::IndexMap;
use tracing::warn;
use utoipa::openapi::info::{ContactBuilder, Info, InfoBuilder};
use utoipa::openapi::path::{Operation, PathItem};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::openapi::{Components, OpenApi, OpenApiBuilder, Paths};

use crate::collection::CollectionInfo;
use crate::config::ConverterConfig;
use crate::convert::PathMap;
use crate::operation::{BASIC_AUTH, BEARER_AUTH, ERROR_SCHEMA, clean_description, error_schema};
use crate::report::{ConversionReport, OperationIdCollision};
use crate::tags::TagRegistry;

/// Wraps the converted paths into a complete document.
pub(crate) fn assemble(
    config: &ConverterConfig,
    info: &CollectionInfo,
    paths: PathMap,
    tags: &TagRegistry,
    report: &mut ConversionReport,
) -> OpenApi {
    report.collisions = detect_collisions(&paths);
    for collision in &report.collisions {
        let endpoints = collision
            .endpoints
            .iter()
            .map(|(method, path)| format!("{method} {path}"))
            .collect::<Vec<_>>()
            .join(", ");
        warn!(operation_id = %collision.operation_id, %endpoints, "duplicate operation id");
    }

    let document_tags = tags.to_tags();

    OpenApiBuilder::new()
        .info(build_info(config, info))
        .servers((!config.servers.is_empty()).then(|| config.servers.clone()))
        .paths(build_paths(paths))
        .components(Some(build_components()))
        .tags((!document_tags.is_empty()).then_some(document_tags))
        .build()
}

fn build_info(config: &ConverterConfig, info: &CollectionInfo) -> Info {
    let title = info
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(&config.default_title);
    let description = info
        .description
        .as_deref()
        .map(clean_description)
        .filter(|description| !description.is_empty());
    let contact = config
        .contact_email
        .as_ref()
        .map(|email| ContactBuilder::new().email(Some(email)).build());

    InfoBuilder::new()
        .title(title)
        .version(&config.version)
        .description(description)
        .contact(contact)
        .build()
}

fn build_paths(paths: PathMap) -> Paths {
    let mut result = Paths::new();
    for (path, entry) in paths {
        let mut item = PathItem::default();
        for (method, operation) in entry.methods {
            set_operation(&mut item, &method, operation);
        }
        result.paths.insert(path, item);
    }
    result
}

fn set_operation(item: &mut PathItem, method: &Method, operation: Operation) {
    let slot = match *method {
        Method::GET => &mut item.get,
        Method::PUT => &mut item.put,
        Method::POST => &mut item.post,
        Method::DELETE => &mut item.delete,
        Method::OPTIONS => &mut item.options,
        Method::HEAD => &mut item.head,
        Method::PATCH => &mut item.patch,
        Method::TRACE => &mut item.trace,
        _ => {
            warn!(%method, "unsupported method");
            return;
        }
    };
    *slot = Some(operation);
}

fn build_components() -> Components {
    let mut bearer = Http::new(HttpAuthScheme::Bearer);
    bearer.bearer_format = Some("JWT".to_string());
    bearer.description = Some("JWT access token obtained from /oauth2/token endpoint".to_string());

    let mut basic = Http::new(HttpAuthScheme::Basic);
    basic.description =
        Some("Basic authentication using API key client ID and secret".to_string());

    let mut components = Components::new();
    components
        .security_schemes
        .insert(BEARER_AUTH.to_string(), SecurityScheme::Http(bearer));
    components
        .security_schemes
        .insert(BASIC_AUTH.to_string(), SecurityScheme::Http(basic));
    components
        .schemas
        .insert(ERROR_SCHEMA.to_string(), error_schema());
    components
}

/// Groups operations by identifier, keeping the identifiers used more than once.
fn detect_collisions(paths: &PathMap) -> Vec<OperationIdCollision> {
    let mut by_id: IndexMap<String, Vec<(Method, String)>> = IndexMap::new();
    for (path, entry) in paths.iter() {
        for (method, operation) in &entry.methods {
            if let Some(operation_id) = &operation.operation_id {
                by_id
                    .entry(operation_id.clone())
                    .or_default()
                    .push((method.clone(), path.clone()));
            }
        }
    }

    by_id
        .into_iter()
        .filter(|(_, endpoints)| endpoints.len() > 1)
        .map(|(operation_id, endpoints)| OperationIdCollision {
            operation_id,
            endpoints,
        })
        .collect()
}
