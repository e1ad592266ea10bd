//! End-to-end scenarios through the document service and the in-memory engine

use std::path::PathBuf;

use serde_json::{json, Value};

use schemasearch::config::SearchConfig;
use schemasearch::engine::InMemorySearchEngine;
use schemasearch::pagination::{Connection, PageRequest};
use schemasearch::schema::{ProtoSchema, SchemaLoader};
use schemasearch::service::{DocumentService, ErrorKind};

const LISTING: &str = "Listing";

fn load_schema() -> ProtoSchema {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    SchemaLoader::new(&fixtures, "v1").load().unwrap()
}

fn listing(urn: &str, bedrooms: i64) -> Value {
    json!({
        "identity": {"key": {"urn": urn}},
        "bedrooms": bedrooms,
        "bathrooms": 1.5,
        "status": "ACTIVE",
    })
}

fn service_with(documents: Vec<Value>) -> DocumentService<InMemorySearchEngine> {
    let service = DocumentService::new(load_schema(), InMemorySearchEngine::new(), SearchConfig::default());
    service.create_index(LISTING, "listing_v1", "listing").unwrap();
    service.put(LISTING, "listing", documents).unwrap();
    service
}

fn urns(connection: &Connection) -> Vec<String> {
    connection
        .nodes()
        .map(|node| node["identity"]["key"]["urn"].as_str().unwrap().to_string())
        .collect()
}

fn search(service: &DocumentService<InMemorySearchEngine>, request: Value) -> Connection {
    service
        .search(LISTING, "listing", &PageRequest::parse(&request).unwrap())
        .unwrap()
}

#[test]
fn filter_by_bedrooms_returns_matching_documents() {
    let service = service_with(vec![listing("urn:1", 1), listing("urn:2", 2), listing("urn:3", 2)]);

    let connection = search(&service, json!({"filter": {"bedrooms": {"gte": 2}}}));
    assert_eq!(urns(&connection), vec!["urn:2", "urn:3"]);
}

#[test]
fn group_by_bedrooms_counts_buckets() {
    let service = service_with(vec![listing("urn:1", 1), listing("urn:2", 2), listing("urn:3", 2)]);

    let aggregations = service
        .aggregate(LISTING, "listing", &Value::Null, &json!({"bedrooms": {"terms": {"first": 10}}}))
        .unwrap();
    assert_eq!(aggregations.len(), 1);
    assert_eq!(aggregations[0].group_by, "bedrooms");
    assert_eq!(aggregations[0].buckets.len(), 2);
    assert_eq!(aggregations[0].count_of("1"), Some(1));
    assert_eq!(aggregations[0].count_of("2"), Some(2));
}

#[test]
fn group_by_in_search_covers_full_filtered_set() {
    let service = service_with(vec![listing("urn:1", 1), listing("urn:2", 2), listing("urn:3", 2)]);

    let connection = search(
        &service,
        json!({
            "first": 1,
            "groupBy": {"bedrooms": {"terms": {}}, "status": {"terms": {}}},
        }),
    );
    assert_eq!(connection.len(), 1);
    assert_eq!(connection.group_by.len(), 2);
    assert_eq!(connection.group_by[0].count_of("2"), Some(2));
    assert_eq!(connection.group_by[1].count_of("ACTIVE"), Some(3));
}

#[test]
fn page_boundary_sets_has_next_page() {
    let service = service_with(vec![listing("urn:1", 1), listing("urn:2", 2), listing("urn:3", 3)]);

    let connection = search(&service, json!({"first": 2}));
    assert_eq!(connection.len(), 2);
    assert!(connection.page_info.has_next_page);

    let connection = search(&service, json!({"first": 3}));
    assert_eq!(connection.len(), 3);
    assert!(!connection.page_info.has_next_page);
}

#[test]
fn cursors_resume_without_duplicates_or_gaps() {
    let service = service_with(vec![
        listing("urn:1", 3),
        listing("urn:2", 1),
        listing("urn:3", 2),
        listing("urn:4", 2),
        listing("urn:5", 3),
    ]);

    let mut seen = Vec::new();
    let mut after: Option<String> = None;
    let mut pages = 0;
    loop {
        let connection = search(
            &service,
            json!({
                "sort": [{"field": "bedrooms", "direction": "DESC"}],
                "after": after.clone(),
                "first": 2,
            }),
        );
        pages += 1;
        assert_eq!(connection.page_info.has_previous_page, after.is_some());
        seen.extend(urns(&connection));

        if !connection.page_info.has_next_page {
            break;
        }
        after = connection.page_info.end_cursor.clone();
    }

    assert_eq!(pages, 3);
    assert_eq!(seen, vec!["urn:1", "urn:5", "urn:3", "urn:4", "urn:2"]);
}

#[test]
fn cursor_from_any_edge_resumes_after_it() {
    let service = service_with((1..=4).map(|i| listing(&format!("urn:{}", i), 2)).collect());

    let all = search(&service, json!({"sort": [{"field": "bedrooms"}]}));
    assert_eq!(urns(&all), vec!["urn:1", "urn:2", "urn:3", "urn:4"]);

    let rest = search(
        &service,
        json!({"sort": [{"field": "bedrooms"}], "after": all.edges[1].cursor.clone()}),
    );
    assert_eq!(urns(&rest), vec!["urn:3", "urn:4"]);
}

#[test]
fn empty_filter_matches_everything() {
    let service = service_with(vec![listing("urn:1", 1), listing("urn:2", 2)]);

    for filter in [json!({}), Value::Null, json!({"and": [], "or": [], "not": []})] {
        let connection = search(&service, json!({"filter": filter.clone()}));
        assert_eq!(connection.len(), 2, "{}", filter);
    }
}

#[test]
fn structural_operators() {
    let service = service_with(vec![listing("urn:1", 1), listing("urn:2", 2), listing("urn:3", 3)]);

    let connection = search(
        &service,
        json!({"filter": {"or": [{"bedrooms": {"eq": 1}}, {"bedrooms": {"eq": 3}}]}}),
    );
    assert_eq!(urns(&connection), vec!["urn:1", "urn:3"]);

    let connection = search(
        &service,
        json!({"filter": {"not": [{"bedrooms": {"eq": 1}}, {"bedrooms": {"eq": 3}}]}}),
    );
    assert_eq!(urns(&connection), vec!["urn:2"]);

    let connection = search(
        &service,
        json!({"filter": {"bedrooms": {"gt": 1, "lte": 3}, "not": [{"bedrooms": {"in": [3]}}]}}),
    );
    assert_eq!(urns(&connection), vec!["urn:2"]);
}

#[test]
fn geo_distance_filter_and_sort() {
    let mut oslo = listing("urn:oslo", 2);
    oslo["location"] = json!({"lat": 59.9139, "lon": 10.7522});
    let mut bergen = listing("urn:bergen", 2);
    bergen["location"] = json!({"lat": 60.3913, "lon": 5.3221});
    let service = service_with(vec![oslo, bergen, listing("urn:nowhere", 2)]);

    let connection = search(
        &service,
        json!({"filter": {"location": {"geoDistance": {
            "center": {"lat": 59.95, "lon": 10.75},
            "lte": 20,
            "unit": "KILOMETERS",
        }}}}),
    );
    assert_eq!(urns(&connection), vec!["urn:oslo"]);

    let connection = search(
        &service,
        json!({"sort": [{"field": "location", "geoDistance": {"center": {"lat": 60.39, "lon": 5.32}}}]}),
    );
    assert_eq!(urns(&connection), vec!["urn:bergen", "urn:oslo", "urn:nowhere"]);
}

#[test]
fn nested_id_path_keys_documents() {
    let service = service_with(vec![listing("urn:1", 1)]);

    let documents = service
        .get(LISTING, "listing", &["urn:1".to_string(), "urn:9".to_string()])
        .unwrap();
    assert_eq!(documents[0].as_ref().unwrap()["bedrooms"], json!(1));
    assert!(documents[1].is_none());

    let err = service
        .put(LISTING, "listing", vec![json!({"identity": {}, "bedrooms": 1})])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "Missing document ID field [identity.key.urn]");
}

#[test]
fn client_errors_are_validation_errors() {
    let service = service_with(vec![listing("urn:1", 1)]);

    let too_big = PageRequest::parse(&json!({"first": 2001})).unwrap();
    let err = service.search(LISTING, "listing", &too_big).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let bad_cursor = PageRequest::parse(&json!({"after": "not-a-cursor"})).unwrap();
    let err = service.search(LISTING, "listing", &bad_cursor).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let bad_sort = PageRequest::parse(&json!({"sort": [{"direction": "ASC"}]})).unwrap();
    let err = service.search(LISTING, "listing", &bad_sort).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "Must specify one of: field, geoDistance, script");
}
