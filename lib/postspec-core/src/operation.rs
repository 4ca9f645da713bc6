//! Operation building.
//!
//! Turns one collection leaf into an OpenAPI [`Operation`]: identifier, summary,
//! cleaned description, tag, parameters, request body, security and the fixed
//! set of generic responses.

use std::sync::LazyLock;

use http::Method;
use regex::Regex;
use utoipa::openapi::path::{Operation, Parameter, ParameterIn};
use utoipa::openapi::request_body::RequestBody;
use utoipa::openapi::response::{Response, Responses, ResponsesBuilder};
use utoipa::openapi::schema::{Object, ObjectBuilder, Schema, Type};
use utoipa::openapi::security::SecurityRequirement;
use utoipa::openapi::{Content, Ref, RefOr, Required};

use crate::collection::{Auth, AuthKind, Body, BodyMode};
use crate::url::{NormalizedUrl, path_variables, strip_path_variables};

/// Name of the bearer security scheme.
pub const BEARER_AUTH: &str = "bearerAuth";

/// Name of the basic security scheme.
pub const BASIC_AUTH: &str = "basicAuth";

/// Name of the shared error schema.
pub const ERROR_SCHEMA: &str = "ErrorResponse";

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("a valid regex"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("a valid regex"));

/// Parses an HTTP method, keeping only the verbs an OpenAPI path item supports.
///
/// ```rust
/// use postspec_core::operation::parse_method;
///
/// assert_eq!(parse_method("post"), Some(http::Method::POST));
/// assert_eq!(parse_method("CONNECT"), None);
/// ```
pub fn parse_method(method: &str) -> Option<Method> {
    let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes()).ok()?;
    match method {
        Method::GET
        | Method::PUT
        | Method::POST
        | Method::DELETE
        | Method::OPTIONS
        | Method::HEAD
        | Method::PATCH
        | Method::TRACE => Some(method),
        _ => None,
    }
}

/// Generates the operation identifier: lowercase method followed by the path
/// stripped of its variables and of every non-alphanumeric character.
///
/// Different paths may collapse to the same identifier (`/a.b` and `/a-b`,
/// `/ports` and `/ports/{id}`); the assembler reports such collisions.
///
/// ```rust
/// use http::Method;
/// use postspec_core::operation::operation_id;
///
/// assert_eq!(operation_id(&Method::POST, "/v2/login"), "postv2login");
/// assert_eq!(operation_id(&Method::GET, "/v2/ports/{portId}/vxc"), "getv2portsvxc");
/// ```
pub fn operation_id(method: &Method, path: &str) -> String {
    let sanitized: String = strip_path_variables(path)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    format!("{}{sanitized}", method.as_str().to_ascii_lowercase())
}

/// Strips markup tags and collapses runs of blank lines into a single blank line.
///
/// ```rust
/// use postspec_core::operation::clean_description;
///
/// assert_eq!(
///     clean_description("<p>Lists ports.</p>\n\n\n\n<b>Note</b>"),
///     "Lists ports.\n\nNote"
/// );
/// ```
pub fn clean_description(text: &str) -> String {
    let text = MARKUP_TAG.replace_all(text, "");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Outcome of the security rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityOutcome {
    /// No bearer requirement.
    Anonymous,
    /// Bearer requirement.
    Bearer,
}

/// A security rule: applies when the operation name contains the keyword,
/// compared case-insensitively.
#[derive(Debug, Clone, Copy)]
pub struct SecurityRule {
    /// Lowercase keyword searched in the operation name.
    pub keyword: &'static str,
    /// Outcome when the keyword is found.
    pub outcome: SecurityOutcome,
}

/// Security rules, evaluated in order, the first match wins.
///
/// Names matching none of them get [`SecurityOutcome::Bearer`]. The match is a plain
/// substring search: `Revoke Token` and `Loginless Ping` are both anonymous.
pub const SECURITY_RULES: [SecurityRule; 2] = [
    SecurityRule {
        keyword: "login",
        outcome: SecurityOutcome::Anonymous,
    },
    SecurityRule {
        keyword: "token",
        outcome: SecurityOutcome::Anonymous,
    },
];

/// Evaluates [`SECURITY_RULES`] against an operation name.
pub fn security_outcome(name: &str) -> SecurityOutcome {
    let name = name.to_lowercase();
    SECURITY_RULES
        .iter()
        .find(|rule| name.contains(rule.keyword))
        .map_or(SecurityOutcome::Bearer, |rule| rule.outcome)
}

/// The collection leaf an operation is built from.
#[derive(Debug, Clone, Copy)]
pub struct LeafRequest<'a> {
    /// Leaf name.
    pub name: &'a str,
    /// Leaf (or request) description.
    pub description: Option<&'a str>,
    /// HTTP method.
    pub method: &'a Method,
    /// Request body.
    pub body: Option<&'a Body>,
    /// Request authentication.
    pub auth: Option<&'a Auth>,
}

/// Builds the operation of a leaf, tagged with `tag`, for the normalized `url`.
pub fn build_operation(leaf: &LeafRequest<'_>, tag: &str, url: &NormalizedUrl) -> Operation {
    let description = clean_description(leaf.description.unwrap_or(leaf.name));
    let parameters = build_parameters(url);

    Operation::builder()
        .operation_id(Some(operation_id(leaf.method, &url.path)))
        .summary(Some(leaf.name))
        .description(Some(description))
        .tags(Some(vec![tag.to_string()]))
        .parameters((!parameters.is_empty()).then_some(parameters))
        .request_body(build_request_body(leaf.method, leaf.body))
        .securities(build_security(leaf.name, leaf.auth))
        .responses(build_responses())
        .build()
}

/// Path parameters first, then query parameters, each name only once.
fn build_parameters(url: &NormalizedUrl) -> Vec<Parameter> {
    let mut parameters: Vec<Parameter> = Vec::new();

    for name in path_variables(&url.path) {
        let description = url
            .variable_description(name)
            .map_or_else(|| format!("The {name} parameter"), ToString::to_string);
        parameters.push(
            Parameter::builder()
                .name(name)
                .parameter_in(ParameterIn::Path)
                .required(Required::True)
                .description(Some(description))
                .schema(Some(schema(string_schema(None))))
                .build(),
        );
    }

    for param in &url.query {
        if parameters.iter().any(|existing| existing.name == param.name) {
            continue;
        }
        parameters.push(
            Parameter::builder()
                .name(&param.name)
                .parameter_in(ParameterIn::Query)
                .required(Required::False)
                .description(Some(param.description.clone()))
                .schema(Some(schema(string_schema(None))))
                .build(),
        );
    }

    parameters
}

fn build_request_body(method: &Method, body: Option<&Body>) -> Option<RequestBody> {
    let (content_type, body_schema) = match body {
        Some(body) if body.mode == BodyMode::Urlencoded => {
            let object = body
                .urlencoded
                .iter()
                .filter(|field| !field.disabled && !field.key.is_empty())
                .fold(
                    ObjectBuilder::new().schema_type(Type::Object),
                    |object, field| {
                        object.property(
                            &field.key,
                            schema(string_schema(Some(
                                field.description.clone().unwrap_or_default(),
                            ))),
                        )
                    },
                )
                .build();
            (FORM_CONTENT_TYPE, object)
        }
        Some(_) => (JSON_CONTENT_TYPE, object_schema()),
        None if matches!(*method, Method::POST | Method::PUT | Method::PATCH) => {
            (JSON_CONTENT_TYPE, object_schema())
        }
        None => return None,
    };

    let content = Content::builder().schema(Some(schema(body_schema))).build();
    let request_body = RequestBody::builder()
        .content(content_type, content)
        .required(Some(Required::True))
        .build();
    Some(request_body)
}

/// Bearer unless the name rules say otherwise; a declared basic auth is offered as well.
fn build_security(name: &str, auth: Option<&Auth>) -> Option<Vec<SecurityRequirement>> {
    let mut requirements = Vec::new();
    if security_outcome(name) == SecurityOutcome::Bearer {
        requirements.push(SecurityRequirement::new(BEARER_AUTH, Vec::<String>::new()));
    }
    if auth.is_some_and(|auth| auth.kind == AuthKind::Basic) {
        requirements.push(SecurityRequirement::new(BASIC_AUTH, Vec::<String>::new()));
    }

    (!requirements.is_empty()).then_some(requirements)
}

/// The same responses for every operation: a generic success and two errors.
fn build_responses() -> Responses {
    let success_content = Content::builder()
        .schema(Some(schema(object_schema())))
        .build();
    let success = Response::builder()
        .description("Successful response")
        .content(JSON_CONTENT_TYPE, success_content)
        .build();

    ResponsesBuilder::new()
        .response("200", RefOr::T(success))
        .response("400", RefOr::T(error_response("Bad request")))
        .response("401", RefOr::T(error_response("Unauthorized")))
        .build()
}

fn error_response(description: &str) -> Response {
    let error_ref = RefOr::Ref(Ref::new(format!("#/components/schemas/{ERROR_SCHEMA}")));
    let content = Content::builder().schema(Some(error_ref)).build();
    Response::builder()
        .description(description)
        .content(JSON_CONTENT_TYPE, content)
        .build()
}

/// The shared error schema referenced by the error responses.
pub fn error_schema() -> RefOr<Schema> {
    let object = ObjectBuilder::new()
        .schema_type(Type::Object)
        .property(
            "message",
            schema(string_schema(Some("Error message".to_string()))),
        )
        .property(
            "data",
            schema(
                ObjectBuilder::new()
                    .schema_type(Type::Object)
                    .description(Some("Additional error details"))
                    .build(),
            ),
        )
        .build();
    schema(object)
}

fn object_schema() -> Object {
    ObjectBuilder::new().schema_type(Type::Object).build()
}

fn string_schema(description: Option<String>) -> Object {
    ObjectBuilder::new()
        .schema_type(Type::String)
        .description(description)
        .build()
}

fn schema(object: Object) -> RefOr<Schema> {
    RefOr::T(Schema::Object(object))
}
