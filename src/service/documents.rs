//! Document service
//!
//! Inbound operations per document type: fetch by id, aggregate, search a
//! page, put, delete, and index lifecycle (create with mapping, alias
//! assignment). One engine round trip per engine call; no retries.

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::config::SearchConfig;
use crate::engine::{AliasAction, BulkRequest, CreateIndexRequest, SearchClient};
use crate::mapping::{index_body, stamp, MappingGenerator};
use crate::pagination::{decode_aggregations, Aggregation, Connection, PageRequest, PaginationEngine};
use crate::path::FieldPath;
use crate::schema::{scalars, ProtoSchema, SchemaError};

use super::errors::{BulkFailure, ServiceError, ServiceResult};

/// Executes inbound operations against a search engine for one proto schema
pub struct DocumentService<C> {
    schema: ProtoSchema,
    client: C,
    config: SearchConfig,
}

impl<C: SearchClient> DocumentService<C> {
    pub fn new(schema: ProtoSchema, client: C, config: SearchConfig) -> Self {
        Self {
            schema,
            client,
            config,
        }
    }

    pub fn schema(&self) -> &ProtoSchema {
        &self.schema
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn pagination(&self) -> PaginationEngine<'_> {
        PaginationEngine::new(
            &self.schema,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    fn require_document_type(&self, document_type: &str) -> ServiceResult<()> {
        if self.schema.is_document_type(document_type) {
            Ok(())
        } else {
            Err(SchemaError::unknown_document_type(document_type).into())
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fetch documents by id, in request order. Missing or failed items are
    /// `None`.
    pub fn get(&self, document_type: &str, index: &str, ids: &[String]) -> ServiceResult<Vec<Option<Value>>> {
        self.require_document_type(document_type)?;

        let results = self.client.multi_get(index, ids)?;
        Ok(results
            .into_iter()
            .map(|result| {
                if let Some(reason) = &result.error {
                    error!(index = %result.index, id = %result.id, reason = %reason, "Failed to get document");
                    return None;
                }
                result.source
            })
            .collect())
    }

    /// Aggregate over every document matching a filter
    pub fn aggregate(
        &self,
        document_type: &str,
        index: &str,
        filter: &Value,
        group_by: &Value,
    ) -> ServiceResult<Vec<Aggregation>> {
        self.require_document_type(document_type)?;

        let request = self.pagination().plan_aggregation(index, filter, group_by)?;
        let response = self.client.search(&request)?;
        Ok(decode_aggregations(&response.aggregations)?)
    }

    /// Search one page of documents
    pub fn search(&self, document_type: &str, index: &str, page: &PageRequest) -> ServiceResult<Connection> {
        self.require_document_type(document_type)?;

        let pagination = self.pagination();
        let plan = pagination.plan(document_type, index, page)?;
        let response = self.client.search(&plan.request)?;
        Ok(pagination.page(&plan, response)?)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Put documents in an index.
    ///
    /// Each document is coerced through its declared scalar types, keyed by
    /// the value at the document type's id path and stamped. Items the
    /// engine rejects are reported together; written items stay written.
    pub fn put(&self, document_type: &str, index: &str, documents: Vec<Value>) -> ServiceResult<bool> {
        let id_path = self.schema.id_path(document_type)?;

        let mut bulk = BulkRequest::new();
        for document in documents {
            let Value::Object(document) = document else {
                return Err(ServiceError::Validation("Document must be an object".into()));
            };

            let mut document = coerce_object(&self.schema, document_type, &document)?;
            let id = extract_id(&document, id_path)?;
            stamp(&mut document);
            bulk = bulk.index(index, id, Value::Object(document));
        }

        if bulk.is_empty() {
            return Ok(true);
        }

        let response = self.client.bulk(&bulk)?;
        if response.has_failures() {
            let failures: Vec<BulkFailure> = response
                .failures()
                .map(|item| {
                    let reason = item.error.clone().unwrap_or_default();
                    error!(index = %item.index, id = %item.id, status = item.status, reason = %reason, "Failed to put document");
                    BulkFailure {
                        id: item.id.clone(),
                        index: item.index.clone(),
                        reason,
                    }
                })
                .collect();
            return Err(ServiceError::BulkFailure(failures));
        }

        Ok(true)
    }

    /// Delete one document. Returns false if it did not exist.
    pub fn delete(&self, document_type: &str, index: &str, id: &str) -> ServiceResult<bool> {
        self.require_document_type(document_type)?;
        Ok(self.client.delete(index, id)?)
    }

    // =========================================================================
    // Index lifecycle
    // =========================================================================

    /// Create an index holding a document type, then point an alias at it
    pub fn create_index(&self, document_type: &str, index: &str, alias: &str) -> ServiceResult<bool> {
        let mapping = MappingGenerator::new(&self.schema).generate_for(document_type)?;
        let request = CreateIndexRequest {
            index: index.to_string(),
            body: index_body(&mapping, &self.config.index_settings),
        };

        let response = self.client.create_index(&request)?;
        if response.acknowledged {
            info!(document_type, index, "Created index");
        } else {
            warn!(document_type, index, "Created index, but some nodes did not respond");
        }

        self.assign_alias(index, alias)
    }

    /// Point an alias at an index, removing it from whichever index had it,
    /// in one atomic alias update
    pub fn assign_alias(&self, index: &str, alias: &str) -> ServiceResult<bool> {
        let previous = self.find_index_for_alias(alias)?;

        let mut actions = Vec::new();
        match &previous {
            Some(previous) if previous == index => return Ok(true),
            Some(previous) => actions.push(AliasAction::Remove {
                index: previous.clone(),
                alias: alias.to_string(),
            }),
            None => {}
        }
        actions.push(AliasAction::Add {
            index: index.to_string(),
            alias: alias.to_string(),
        });

        let acknowledged = self.client.update_aliases(&actions)?;
        info!(alias, index, previous = ?previous, acknowledged, "Assigned alias");
        Ok(acknowledged)
    }

    /// First index carrying an alias
    pub fn find_index_for_alias(&self, alias: &str) -> ServiceResult<Option<String>> {
        Ok(self.client.get_aliases(alias)?.into_keys().next())
    }
}

/// Document id at the id path, as a string
fn extract_id(document: &Map<String, Value>, id_path: &FieldPath) -> ServiceResult<String> {
    let root = Value::Object(document.clone());
    match id_path.resolve(&root) {
        None | Some(Value::Null) => Err(ServiceError::Validation(format!(
            "Missing document ID field [{}]",
            id_path
        ))),
        Some(Value::String(id)) => Ok(id.clone()),
        Some(id) => Ok(id.to_string()),
    }
}

/// Coerce the fields of an object value through its declared types
fn coerce_object(schema: &ProtoSchema, type_name: &str, node: &Map<String, Value>) -> ServiceResult<Map<String, Value>> {
    let Some(object) = schema.registry().object(type_name) else {
        return Ok(node.clone());
    };

    let mut coerced = Map::new();
    for (name, value) in node {
        let value = match object.field(name) {
            Some(field) => coerce_value(schema, field.ty.base_name(), value)?,
            None => value.clone(),
        };
        coerced.insert(name.clone(), value);
    }
    Ok(coerced)
}

fn coerce_value(schema: &ProtoSchema, type_name: &str, value: &Value) -> ServiceResult<Value> {
    let registry = schema.registry();
    match value {
        Value::Null => Ok(Value::Null),
        Value::Array(items) => items
            .iter()
            .map(|item| coerce_value(schema, type_name, item))
            .collect::<ServiceResult<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) if registry.is_object_type(type_name) => {
            Ok(Value::Object(coerce_object(schema, type_name, map)?))
        }
        _ if registry.is_object_type(type_name) => Err(ServiceError::Validation(format!(
            "Expected an object of type {}, got {}",
            type_name, value
        ))),
        _ if registry.is_scalar(type_name) => Ok(scalars::coerce(type_name, value)?),
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::InMemorySearchEngine;
    use crate::mapping::TIMESTAMP_FIELD;
    use crate::service::ErrorKind;
    use serde_json::json;

    const SCHEMA: &str = r#"
        type Listing @document {
          key: ListingKey!
          bedrooms: Int @searchable
          price: Long @searchable
          rating: String @searchable(type: "integer")
        }

        type ListingKey {
          urn: ID! @id
        }
    "#;

    fn service() -> DocumentService<InMemorySearchEngine> {
        let schema = ProtoSchema::from_sources([SCHEMA]).unwrap();
        let service = DocumentService::new(schema, InMemorySearchEngine::new(), SearchConfig::default());
        service.create_index("Listing", "listing_v1", "listing").unwrap();
        service
    }

    #[test]
    fn test_create_index_assigns_alias() {
        let service = service();
        assert_eq!(
            service.find_index_for_alias("listing").unwrap(),
            Some("listing_v1".to_string())
        );

        let mappings = service.client().mappings("listing_v1").unwrap();
        assert_eq!(mappings["dynamic"], json!(false));
        assert_eq!(mappings["properties"]["bedrooms"], json!({"type": "integer"}));
        assert_eq!(mappings["properties"][TIMESTAMP_FIELD], json!({"type": "date"}));
    }

    #[test]
    fn test_reassign_alias_moves_it() {
        let service = service();
        service.create_index("Listing", "listing_v2", "listing").unwrap();

        assert_eq!(
            service.find_index_for_alias("listing").unwrap(),
            Some("listing_v2".to_string())
        );
        assert_eq!(service.client().get_aliases("listing").unwrap().len(), 1);
        assert!(service.assign_alias("listing_v2", "listing").unwrap());
    }

    #[test]
    fn test_put_coerces_and_stamps() {
        let service = service();
        service
            .put(
                "Listing",
                "listing",
                vec![json!({"key": {"urn": "urn:1"}, "bedrooms": 2, "price": "125000"})],
            )
            .unwrap();

        let documents = service.get("Listing", "listing", &["urn:1".to_string()]).unwrap();
        let document = documents[0].as_ref().unwrap();
        assert_eq!(document["price"], json!(125000));
        assert!(document[TIMESTAMP_FIELD].is_string());
    }

    #[test]
    fn test_put_without_id_is_rejected() {
        let service = service();
        let err = service
            .put("Listing", "listing", vec![json!({"key": {}, "bedrooms": 2})])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Missing document ID field [key.urn]");
    }

    #[test]
    fn test_put_reports_failed_items() {
        let service = service();
        let err = service
            .put(
                "Listing",
                "listing",
                vec![
                    json!({"key": {"urn": "urn:1"}, "bedrooms": 2}),
                    json!({"key": {"urn": "urn:2"}, "rating": "high"}),
                ],
            )
            .unwrap_err();

        let ServiceError::BulkFailure(failures) = &err else {
            panic!("expected bulk failure, got {:?}", err);
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id, "urn:2");
        assert_eq!(failures[0].index, "listing_v1");
        assert!(failures[0].reason.contains("[rating]"));

        let documents = service
            .get("Listing", "listing", &["urn:1".to_string(), "urn:2".to_string()])
            .unwrap();
        assert!(documents[0].is_some());
        assert!(documents[1].is_none());
    }

    #[test]
    fn test_put_rejects_uncoercible_scalar() {
        let service = service();
        let err = service
            .put("Listing", "listing", vec![json!({"key": {"urn": "urn:1"}, "price": "lots"})])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_get_from_missing_index_yields_none() {
        let service = service();
        let documents = service.get("Listing", "nope", &["urn:1".to_string()]).unwrap();
        assert_eq!(documents, vec![None]);
    }

    #[test]
    fn test_unknown_document_type() {
        let service = service();
        let err = service.search("Nope", "listing", &PageRequest::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[test]
    fn test_delete() {
        let service = service();
        service
            .put("Listing", "listing", vec![json!({"key": {"urn": "urn:1"}})])
            .unwrap();
        assert!(service.delete("Listing", "listing", "urn:1").unwrap());
        assert!(!service.delete("Listing", "listing", "urn:1").unwrap());
    }
}
