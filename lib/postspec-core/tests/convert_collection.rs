#![allow(missing_docs)]

use insta::assert_snapshot;
use postspec_core::{Collection, Converter, SkipReason};
use rstest::rstest;
use serde_json::Value;
use utoipa::openapi::OpenApi;

mod common;
pub use self::common::*;

/// One line per operation: method, path, id, tags and security scheme names.
fn endpoints(spec: &OpenApi) -> anyhow::Result<String> {
    let mut lines = Vec::new();
    for (path, item) in &spec.paths.paths {
        let operations = [
            ("get", &item.get),
            ("put", &item.put),
            ("post", &item.post),
            ("delete", &item.delete),
            ("options", &item.options),
            ("head", &item.head),
            ("patch", &item.patch),
            ("trace", &item.trace),
        ];
        for (method, operation) in operations {
            let Some(operation) = operation else {
                continue;
            };
            let tags = operation.tags.clone().unwrap_or_default().join(",");
            let security = serde_json::to_value(&operation.security)?
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(Value::as_object)
                .flat_map(|requirement| requirement.keys().cloned())
                .collect::<Vec<_>>()
                .join(",");
            let id = operation.operation_id.as_deref().unwrap_or_default();
            lines.push(format!("{method} {path} {id} [{tags}] ({security})"));
        }
    }
    Ok(lines.join("\n"))
}

#[test]
fn should_convert_megaport_collection() -> anyhow::Result<()> {
    let conversion = convert_fixture()?;

    assert_snapshot!(endpoints(&conversion.document)?, @r"
    post /v2/login postv2login [Authentication] ()
    post /oauth2/token postoauth2token [Authentication] (basicAuth)
    get /v2/ports getv2ports [default] (bearerAuth)
    post /v2/ports postv2ports [Port Services] (bearerAuth)
    get /v2/ports/{portId} getv2ports [Ports] (bearerAuth)
    put /v2/ports/{portId} putv2ports [Ports] (bearerAuth)
    ");
    Ok(())
}

#[test]
fn should_report_skips_and_collisions() -> anyhow::Result<()> {
    let report = convert_fixture()?.report;

    assert_eq!(report.leaves, 7);
    assert_eq!(report.folders, 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        report.skipped.first().map(|skipped| (skipped.name.as_str(), &skipped.reason)),
        Some(("Draft", &SkipReason::MissingRequest))
    );
    assert!(report.overwrites.is_empty());

    let collisions: Vec<_> = report
        .collisions
        .iter()
        .map(|collision| (collision.operation_id.as_str(), collision.endpoints.len()))
        .collect();
    assert_eq!(collisions, vec![("getv2ports", 2)]);
    Ok(())
}

#[test]
fn should_assemble_document_metadata() -> anyhow::Result<()> {
    let document = convert_fixture()?.document;
    let json = serde_json::to_value(&document)?;

    assert_eq!(json["info"]["title"], "Megaport API");
    assert_eq!(json["info"]["version"], "1.0.0");
    assert_eq!(
        json["info"]["description"],
        "Megaport public API.\n\nUse the staging environment for tests."
    );
    assert_eq!(json["info"]["contact"]["email"], "techpubs@megaport.com");
    assert_eq!(json["servers"][0]["url"], "https://api.megaport.com");
    assert_eq!(json["servers"][1]["url"], "https://api-staging.megaport.com");

    let schemes = &json["components"]["securitySchemes"];
    assert_eq!(schemes["bearerAuth"]["scheme"], "bearer");
    assert_eq!(schemes["bearerAuth"]["bearerFormat"], "JWT");
    assert_eq!(schemes["basicAuth"]["scheme"], "basic");

    let error = &json["components"]["schemas"]["ErrorResponse"];
    assert_eq!(error["properties"]["message"]["type"], "string");
    assert_eq!(error["properties"]["data"]["type"], "object");

    let tags: Vec<_> = json["tags"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|tag| (tag["name"].clone(), tag["description"].clone()))
        .collect();
    assert_eq!(
        tags,
        vec![
            (Value::from("Authentication"), Value::from("Obtain access tokens.")),
            (Value::from("Ports"), Value::from("Port management.")),
            (Value::from("Port Services"), Value::Null),
            (Value::from("Locations"), Value::Null),
        ]
    );
    Ok(())
}

#[test]
fn should_describe_path_and_query_parameters() -> anyhow::Result<()> {
    let document = convert_fixture()?.document;
    let json = serde_json::to_value(&document.paths)?;

    let get_port = &json["/v2/ports/{portId}"]["get"]["parameters"][0];
    assert_eq!(get_port["name"], "portId");
    assert_eq!(get_port["in"], "path");
    assert_eq!(get_port["required"], true);
    assert_eq!(get_port["description"], "Port UID");

    let update_port = &json["/v2/ports/{portId}"]["put"]["parameters"][0];
    assert_eq!(update_port["description"], "The portId parameter");

    let list_ports = &json["/v2/ports"]["get"]["parameters"][0];
    assert_eq!(list_ports["name"], "locationId");
    assert_eq!(list_ports["in"], "query");
    assert_eq!(list_ports["required"], false);

    let token_body = &json["/oauth2/token"]["post"]["requestBody"]["content"];
    assert_eq!(
        token_body["application/x-www-form-urlencoded"]["schema"]["properties"]["grant_type"]["type"],
        "string"
    );
    Ok(())
}

#[rstest]
#[case::login("Login", "POST", "/v2/login", "Authentication")]
#[case::list_ports("List Ports", "GET", "/v2/ports", "default")]
fn should_convert_single_request(
    #[case] name: &str,
    #[case] method: &str,
    #[case] path: &str,
    #[case] expected_tag: &str,
) -> anyhow::Result<()> {
    init_tracing();
    let request = serde_json::json!({
        "name": name,
        "request": { "method": method, "url": format!("https://api.megaport.com{path}") }
    });
    let item = if expected_tag == "default" {
        request
    } else {
        serde_json::json!({ "name": expected_tag, "item": [request] })
    };
    let collection = Collection::from_json_str(&serde_json::json!({ "item": [item] }).to_string())?;

    let conversion = Converter::default().convert(&collection);

    let json = serde_json::to_value(&conversion.document.paths)?;
    let operation = &json[path][method.to_lowercase()];
    assert_eq!(operation["tags"], serde_json::json!([expected_tag]));
    assert_eq!(
        operation["security"].is_null(),
        name.to_lowercase().contains("login")
    );
    Ok(())
}

#[test]
fn should_let_later_duplicate_win() -> anyhow::Result<()> {
    init_tracing();
    let collection = Collection::from_json_str(
        r#"{
          "item": [
            { "name": "Ports", "item": [
              { "name": "List Ports", "request": { "method": "GET", "url": "/v2/ports" } }
            ] },
            { "name": "Legacy", "item": [
              { "name": "List Ports (legacy)", "request": { "method": "GET", "url": "/v2/ports" } }
            ] }
          ]
        }"#,
    )?;

    let conversion = Converter::default().convert(&collection);

    let item = conversion
        .document
        .paths
        .paths
        .get("/v2/ports")
        .and_then(|item| item.get.as_ref())
        .and_then(|operation| operation.summary.clone());
    assert_eq!(item.as_deref(), Some("List Ports (legacy)"));
    assert_eq!(conversion.report.overwrites.len(), 1);
    Ok(())
}

#[test]
fn should_honor_converter_configuration() -> anyhow::Result<()> {
    init_tracing();
    let collection = Collection::from_json_str(
        r#"{ "item": [ { "name": "Ping", "request": "http://localhost:8080/ping" } ] }"#,
    )?;

    let conversion = Converter::builder()
        .with_default_title("Local API")
        .with_version("2.0.0")
        .with_contact_email(None)
        .without_servers()
        .with_server("http://localhost:8080", "Local")
        .with_known_host("http://localhost:8080")
        .with_default_tag("misc")
        .build()
        .convert(&collection);

    let json = serde_json::to_value(&conversion.document)?;
    assert_eq!(json["info"]["title"], "Local API");
    assert_eq!(json["info"]["version"], "2.0.0");
    assert!(json["info"]["contact"].is_null());
    assert_eq!(json["servers"][0]["url"], "http://localhost:8080");
    assert_eq!(json["paths"]["/ping"]["get"]["tags"], serde_json::json!(["misc"]));
    assert!(json["tags"].is_null());
    Ok(())
}
