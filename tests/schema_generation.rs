//! Schema loading, mapping generation and consumer schema generation over
//! the fixture schemas

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde_json::json;

use schemasearch::consumer::ConsumerSchemaGenerator;
use schemasearch::mapping::{index_body, MappingGenerator};
use schemasearch::path::FieldPath;
use schemasearch::schema::{parse_document, ProtoSchema, SchemaLoader};

fn load_schema() -> ProtoSchema {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    SchemaLoader::new(&fixtures, "v1").load().unwrap()
}

#[test]
fn document_types_and_id_paths() {
    let schema = load_schema();
    let types: Vec<&str> = schema.document_types().iter().map(String::as_str).collect();
    assert_eq!(types, vec!["Agent", "Listing"]);

    assert_eq!(schema.id_field("Agent").unwrap(), "id");
    let id_path = schema.id_path("Listing").unwrap();
    assert_eq!(id_path.dotted(), "identity.key.urn");

    let document = json!({"identity": {"key": {"urn": "urn:listing:1"}}, "bedrooms": 2});
    assert_eq!(id_path.resolve(&document), Some(&json!("urn:listing:1")));
    assert_eq!(FieldPath::parse("identity.key.urn"), *id_path);
}

#[test]
fn geo_point_field_maps_to_geo_point() {
    let schema = load_schema();
    let mapping = MappingGenerator::new(&schema).generate_for("Listing").unwrap();

    assert_eq!(mapping["properties"]["location"], json!({"type": "geo_point"}));
    assert_eq!(mapping["properties"]["bedrooms"], json!({"type": "integer"}));
    assert_eq!(mapping["properties"]["bathrooms"], json!({"type": "double"}));
    assert_eq!(mapping["properties"]["price"], json!({"type": "long"}));
    assert_eq!(
        mapping["properties"]["identity"]["properties"]["key"]["properties"]["urn"],
        json!({"type": "keyword"})
    );
    assert_eq!(
        mapping["properties"]["address"]["properties"]["city"],
        json!({"type": "keyword"})
    );
    assert!(mapping["properties"]["address"]["properties"].get("postalCode").is_none());
}

#[test]
fn mapping_through_extension_and_cycle() {
    let schema = load_schema();
    let mappings = MappingGenerator::new(&schema).generate().unwrap();
    assert_eq!(mappings.keys().collect::<Vec<_>>(), vec!["Agent", "Listing"]);

    let agent = &mappings["Listing"]["properties"]["agent"]["properties"];
    assert_eq!(agent["name"], json!({"type": "keyword", "ignore_above": 256}));
    assert!(agent.get("listings").is_none());
}

#[test]
fn index_body_carries_settings_and_timestamp() {
    let schema = load_schema();
    let mapping = MappingGenerator::new(&schema).generate_for("Agent").unwrap();
    let body = index_body(&mapping, &json!({"number_of_replicas": 0}));

    assert_eq!(body["settings"], json!({"number_of_replicas": 0}));
    assert_eq!(body["mappings"]["dynamic"], json!(false));
    assert_eq!(body["mappings"]["properties"]["@timestamp"], json!({"type": "date"}));
}

#[test]
fn consumer_schema_is_idempotent() {
    let schema = load_schema();
    let first = ConsumerSchemaGenerator::new(&schema).generate();
    let second = ConsumerSchemaGenerator::new(&schema).generate();

    let membership = |consumer: &schemasearch::consumer::ConsumerSchema| {
        consumer
            .input_types
            .iter()
            .map(|shape| (shape.name.clone(), shape.field_names().join(",")))
            .collect::<BTreeSet<_>>()
    };
    assert_eq!(membership(&first), membership(&second));
    assert_eq!(first, second);
}

#[test]
fn consumer_schema_shapes() {
    let schema = load_schema();
    let consumer = ConsumerSchemaGenerator::new(&schema).generate();

    let filter = consumer.input_type("ListingFilterInput").unwrap();
    for field in ["and", "or", "not", "bedrooms", "location", "identity", "address", "status"] {
        assert!(filter.field(field).is_some(), "missing filter field {}", field);
    }
    assert_eq!(filter.field("bedrooms").unwrap().ty.to_string(), "OperatorWithIntInput");
    assert_eq!(
        filter.field("location").unwrap().ty.to_string(),
        "OperatorWithGeoPointInput"
    );

    let group_by = consumer.input_type("ListingGroupByInput").unwrap();
    assert!(group_by.field("bedrooms").is_some());
    assert!(group_by.field("location").is_none());

    let put = consumer.input_type("ListingInput").unwrap();
    assert_eq!(put.field("identity").unwrap().ty.to_string(), "ListingIdentityInput!");

    let query = consumer.query().unwrap();
    assert!(query.field("listingConnection").is_some());
    assert!(query.field("agentAggregation").is_some());
    let mutation = consumer.mutation().unwrap();
    assert!(mutation.field("putListing").is_some());
    assert!(mutation.field("deleteAgent").is_some());
}

#[test]
fn consumer_schema_sdl_parses() {
    let schema = load_schema();
    let sdl = ConsumerSchemaGenerator::new(&schema).generate().to_sdl();
    let document = parse_document(&sdl).unwrap();
    assert!(!document.definitions.is_empty());
}

#[test]
fn missing_version_directory_is_fatal() {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let err = SchemaLoader::new(&fixtures, "v9").load().unwrap_err();
    assert!(err.is_fatal());
}
