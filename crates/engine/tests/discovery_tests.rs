use apiscribe_engine::{ApiManifest, DiscoveryOptions, DiscoveryService, DocumentationIndex};
use apiscribe_types::{Document, SchemaKind, Tool};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

fn load_fixture() -> ApiManifest {
    let manifest = include_str!("data/shop_manifest.json");
    ApiManifest::from_json_str(manifest).expect("load manifest from fixture")
}

fn generate(options: DiscoveryOptions) -> Arc<Document> {
    DiscoveryService::from_manifest(load_fixture(), options)
        .generate_document()
        .expect("generate document")
}

fn tool<'d>(document: &'d Document, name: &str) -> &'d Tool {
    document
        .tool(name)
        .unwrap_or_else(|| panic!("expected tool {name}, got {:?}", document.tools.iter().map(|t| &t.name).collect::<Vec<_>>()))
}

#[test]
fn emits_one_tool_per_routable_endpoint() {
    let document = generate(DiscoveryOptions::default());
    let names: Vec<_> = document.tools.iter().map(|tool| tool.name.as_str()).collect();

    assert_eq!(names, vec!["Customer_Get", "Orders_Create", "Orders_Tag", "Categories_Tree"]);
}

#[test]
fn optional_route_parameter_is_required_and_stripped() {
    let document = generate(DiscoveryOptions::default());
    let customer = tool(&document, "Customer_Get");
    let input = &customer.input_schema;

    assert!(input.property("customerId").is_some());
    assert!(input.property("customerId?").is_none());
    assert!(input.is_required("customerId"));
    assert!(!input.is_required("includeOrders"));
    assert_eq!(customer.description, "GET api/Customer/{customerId?}");
    assert_eq!(customer.annotation_str("http_method"), Some("GET"));
    assert_eq!(
        customer.annotation_str("handler_type"),
        Some("Shop.Controllers.CustomerController")
    );
}

#[test]
fn output_schema_walks_the_inheritance_chain() {
    let document = generate(DiscoveryOptions::default());
    let output = &tool(&document, "Customer_Get").output_schema;

    let names: Vec<&str> = output
        .properties
        .as_ref()
        .map(|properties| properties.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Email", "Tier", "Id", "CreatedAt"]);

    let email = output.property("Email").expect("email property");
    assert_eq!(email.format.as_deref(), Some("email"));
    assert!(output.is_required("Email"));
    assert!(output.is_required("Id"));
    assert_eq!(
        output.property("CreatedAt").and_then(|created| created.format.as_deref()),
        Some("date-time")
    );

    let tier = output.property("Tier").expect("tier property");
    assert_eq!(tier.kind, SchemaKind::Integer);
    assert_eq!(tier.enum_values, Some(vec![json!(0), json!(10)]));
}

#[test]
fn post_binds_complex_body_and_explicit_query() {
    let document = generate(DiscoveryOptions::default());
    let create = tool(&document, "Orders_Create");
    let value = serde_json::to_value(create).expect("serialize tool");
    let properties = &value["inputSchema"]["properties"];

    assert_eq!(properties["order"]["x-source"], "body");
    assert_eq!(properties["order"]["x-detection-method"], "http_method_inference");
    assert_eq!(properties["notify"]["x-source"], "query");
    assert_eq!(properties["notify"]["x-detection-method"], "explicit");
    assert!(properties.get("cancellationToken").is_none());

    assert_eq!(
        properties["order"]["properties"]["Status"],
        json!({ "type": "string", "enum": ["Pending", "Shipped", "Delivered"] })
    );
    assert_eq!(properties["order"]["properties"]["Quantity"]["minimum"], json!(1.0));
    assert_eq!(properties["order"]["properties"]["Note"]["maxLength"], json!(200));
    assert_eq!(value["outputSchema"], json!({ "type": "object" }));
}

#[test]
fn dictionary_body_is_an_open_object() {
    let document = generate(DiscoveryOptions::default());
    let tag = tool(&document, "Orders_Tag");
    let tags = tag.input_schema.property("tags").expect("tags parameter");

    assert_eq!(tags.kind, SchemaKind::Object);
    assert_eq!(tags.additional_properties, Some(true));
    assert!(tags.properties.is_none());
    assert_eq!(tags.annotation("x-source"), Some(&Value::from("body")));
    assert_eq!(
        tag.input_schema.property("orderId").map(|order_id| order_id.kind),
        Some(SchemaKind::Integer)
    );
    assert_eq!(tag.output_schema.kind, SchemaKind::Null);
    assert_eq!(tag.description, "PUT api/orders/{orderId:int}/tags");
}

#[test]
fn self_referential_output_terminates() {
    let document = generate(DiscoveryOptions::default());
    let tree = tool(&document, "Categories_Tree");
    let value = serde_json::to_value(&tree.output_schema).expect("serialize output schema");

    assert_eq!(value["type"], "array");
    assert_eq!(
        value["items"]["properties"]["Parent"],
        json!({
            "type": "object",
            "description": "Circular reference to Category",
            "properties": {},
            "required": []
        })
    );
    assert_eq!(tree.annotation_str("route_template"), Some("/categories/tree"));
}

#[test]
fn documentation_index_supplies_descriptions() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/shop_docs.yaml");
    let documentation = DocumentationIndex::load(&path).expect("load documentation index");
    let service = DiscoveryService::from_manifest(load_fixture(), DiscoveryOptions::default())
        .with_documentation(Arc::new(documentation));

    let document = service.generate_document().expect("generate document");
    let customer = tool(&document, "Customer_Get");

    assert_eq!(customer.description, "Returns a customer profile.");
    assert_eq!(
        customer
            .input_schema
            .property("customerId")
            .and_then(|node| node.description.as_deref()),
        Some("Customer identifier; omit for the current customer.")
    );
    assert_eq!(
        customer
            .output_schema
            .property("Email")
            .and_then(|node| node.description.as_deref()),
        Some("Primary contact address.")
    );
}

#[test]
fn descriptions_can_be_disabled() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/shop_docs.yaml");
    let documentation = DocumentationIndex::load(&path).expect("load documentation index");
    let options = DiscoveryOptions {
        include_descriptions: false,
        ..Default::default()
    };
    let service = DiscoveryService::from_manifest(load_fixture(), options).with_documentation(Arc::new(documentation));

    let document = service.generate_document().expect("generate document");

    assert_eq!(tool(&document, "Customer_Get").description, "GET api/Customer/{customerId?}");
}

#[test]
fn document_is_cached_until_invalidated() {
    let service = DiscoveryService::from_manifest(load_fixture(), DiscoveryOptions::default());

    let first = service.generate_document().expect("first pass");
    let second = service.generate_document().expect("second pass");
    assert!(Arc::ptr_eq(&first, &second));

    service.invalidate_cache();
    let third = service.generate_document().expect("third pass");
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(
        serde_json::to_value(&*first).expect("serialize first"),
        serde_json::to_value(&*third).expect("serialize third")
    );
}

#[test]
fn serialized_document_has_the_wire_shape() {
    let document = generate(DiscoveryOptions::default());
    let value = serde_json::to_value(&*document).expect("serialize document");

    assert_eq!(value["info"], json!({ "schema_version": "1.0" }));
    assert!(value["metadata"].as_object().is_some_and(|metadata| metadata.is_empty()));
    let first = &value["tools"][0];
    for key in ["name", "description", "inputSchema", "outputSchema", "annotations"] {
        assert!(first.get(key).is_some(), "missing key {key} in {first}");
    }
    assert_eq!(first["inputSchema"]["required"], json!(["customerId"]));
}
