//! CLI command implementations
//!
//! Each command loads the configuration and the proto schema of the
//! configured version, computes its result and prints it as one JSON
//! envelope on stdout.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::SearchConfig;
use crate::consumer::ConsumerSchemaGenerator;
use crate::mapping::{index_body, MappingGenerator};
use crate::pagination::{PageRequest, PaginationEngine};
use crate::schema::{ProtoSchema, SchemaLoader};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run a command and print its result envelope
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::Mapping {
            config,
            document_type,
        } => mapping(&config, &document_type),
        Command::Schema { config } => schema(&config),
        Command::Plan {
            config,
            document_type,
        } => read_request().and_then(|request| plan(&config, &document_type, &request)),
    };

    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Load configuration and the proto schema it names
fn boot(config_path: &Path) -> CliResult<(SearchConfig, ProtoSchema)> {
    let config = SearchConfig::load(config_path)?;
    let schema = SchemaLoader::new(&config.schema_dir, config.api_version.as_str()).load()?;
    Ok((config, schema))
}

/// Index creation body of one document type
pub fn mapping(config_path: &Path, document_type: &str) -> CliResult<Value> {
    let (config, schema) = boot(config_path)?;
    let mapping = MappingGenerator::new(&schema).generate_for(document_type)?;
    Ok(index_body(&mapping, &config.index_settings))
}

/// Consumer schema SDL
pub fn schema(config_path: &Path) -> CliResult<Value> {
    let (_, schema) = boot(config_path)?;
    let consumer = ConsumerSchemaGenerator::new(&schema).generate();
    Ok(Value::String(consumer.to_sdl()))
}

/// Engine request planned for `{index, filter, sort, after, first, groupBy}`
pub fn plan(config_path: &Path, document_type: &str, request: &Value) -> CliResult<Value> {
    let (config, schema) = boot(config_path)?;

    let index = request
        .get("index")
        .and_then(Value::as_str)
        .ok_or_else(|| CliError::request_error("index is required"))?;
    let page = PageRequest::parse(request)?;

    let engine = PaginationEngine::new(&schema, config.default_page_size, config.max_page_size);
    let plan = engine.plan(document_type, index, &page)?;

    Ok(json!({
        "index": plan.request.index,
        "body": plan.request.to_json(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use std::fs;
    use tempfile::TempDir;

    const SCHEMA: &str = r#"
        type Listing @document {
          id: ID! @id
          bedrooms: Int @searchable
        }
    "#;

    fn create_config(temp_dir: &TempDir) -> std::path::PathBuf {
        let schema_dir = temp_dir.path().join("search");
        fs::create_dir_all(schema_dir.join("v1")).unwrap();
        fs::write(schema_dir.join("v1").join("listing.graphqls"), SCHEMA).unwrap();

        let config_path = temp_dir.path().join("search.json");
        let config = json!({
            "schema_dir": schema_dir.to_string_lossy(),
            "max_page_size": 50,
            "index_settings": {"number_of_shards": 1},
        });
        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    #[test]
    fn test_mapping_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        let body = mapping(&config_path, "Listing").unwrap();
        assert_eq!(body["settings"], json!({"number_of_shards": 1}));
        assert_eq!(body["mappings"]["properties"]["bedrooms"], json!({"type": "integer"}));

        let err = mapping(&config_path, "Nope").unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::SchemaError);
    }

    #[test]
    fn test_schema_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        let sdl = schema(&config_path).unwrap();
        let sdl = sdl.as_str().unwrap();
        assert!(sdl.contains("input ListingFilterInput"));
        assert!(sdl.contains("type Query"));
    }

    #[test]
    fn test_plan_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        let planned = plan(
            &config_path,
            "Listing",
            &json!({"index": "listing", "filter": {"bedrooms": {"eq": 2}}, "first": 5}),
        )
        .unwrap();
        assert_eq!(planned["index"], json!("listing"));
        assert_eq!(planned["body"]["size"], json!(6));
        assert_eq!(planned["body"]["query"], json!({"term": {"bedrooms": {"value": 2}}}));

        let err = plan(&config_path, "Listing", &json!({"index": "listing", "first": 51})).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::RequestError);

        let err = plan(&config_path, "Listing", &json!({"first": 1})).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::RequestError);
    }

    #[test]
    fn test_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let err = schema(&temp_dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }
}
