//! Schema loader for loading schema sources from disk at startup
//!
//! - Sources live at `<schema_dir>/<api_version>/**/*.graphqls`
//! - Files are merged in sorted path order after the prelude
//! - A missing version directory or a bad source is a FATAL configuration error

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::errors::{SchemaError, SchemaResult};
use super::parser::parse_document;
use super::proto::{prelude_registry, ProtoSchema};

/// File extension of schema sources
pub const SCHEMA_EXTENSION: &str = "graphqls";

/// Loads the schema sources of one API version.
pub struct SchemaLoader {
    /// Directory holding the sources of one version
    version_dir: PathBuf,
    api_version: String,
}

impl SchemaLoader {
    /// Creates a loader for `<schema_dir>/<api_version>`.
    pub fn new(schema_dir: &Path, api_version: impl Into<String>) -> Self {
        let api_version = api_version.into();
        Self {
            version_dir: schema_dir.join(&api_version),
            api_version,
        }
    }

    /// Returns the version directory path.
    pub fn version_dir(&self) -> &Path {
        &self.version_dir
    }

    /// Lists every schema source under the version directory, sorted.
    pub fn source_files(&self) -> SchemaResult<Vec<PathBuf>> {
        if !self.version_dir.is_dir() {
            return Err(SchemaError::io(
                self.version_dir.display().to_string(),
                "schema version directory does not exist",
            ));
        }

        let mut files = Vec::new();
        collect_sources(&self.version_dir, &mut files)?;
        files.sort();
        Ok(files)
    }

    /// Loads and resolves the proto schema.
    pub fn load(&self) -> SchemaResult<ProtoSchema> {
        let files = self.source_files()?;
        let mut registry = prelude_registry()?;

        for path in &files {
            let label = path.display().to_string();
            let content = fs::read_to_string(path).map_err(|e| SchemaError::io(&label, e))?;
            let document = parse_document(&content).map_err(|e| e.in_file(&label))?;
            registry
                .add_document(document)
                .map_err(|e| e.in_file(&label))?;
        }
        registry.resolve_extensions()?;

        info!(
            api_version = %self.api_version,
            files = files.len(),
            "Loaded schema sources"
        );

        ProtoSchema::build(registry)
    }
}

fn collect_sources(dir: &Path, files: &mut Vec<PathBuf>) -> SchemaResult<()> {
    let entries =
        fs::read_dir(dir).map_err(|e| SchemaError::io(dir.display().to_string(), e))?;

    for entry in entries {
        let entry = entry.map_err(|e| SchemaError::io(dir.display().to_string(), e))?;
        let path = entry.path();

        if path.is_dir() {
            collect_sources(&path, files)?;
        } else if path.extension().map_or(false, |ext| ext == SCHEMA_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_recursive_sorted() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "v1/b/extension.graphqls", "extend type Listing { status: String }");
        write(temp_dir.path(), "v1/a/listing.graphqls", "type Listing @document { id: ID! @id }");
        write(temp_dir.path(), "v1/readme.txt", "not a schema");

        let loader = SchemaLoader::new(temp_dir.path(), "v1");
        let files = loader.source_files().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a/listing.graphqls"));

        let schema = loader.load().unwrap();
        assert!(schema.is_document_type("Listing"));
        assert!(schema.registry().object("Listing").unwrap().field("status").is_some());
    }

    #[test]
    fn test_missing_version_directory() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path(), "v9");
        let err = loader.load().unwrap_err();
        assert_eq!(err.code().code(), "SEARCH_SCHEMA_IO");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "v1/broken.graphqls", "type Listing {");

        let err = SchemaLoader::new(temp_dir.path(), "v1").load().unwrap_err();
        assert_eq!(err.code().code(), "SEARCH_SCHEMA_SYNTAX");
        assert!(err.source_file().unwrap().ends_with("broken.graphqls"));
    }

    #[test]
    fn test_duplicate_across_files_names_second_file() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "v1/a.graphqls", "type Listing @document { id: ID @id }");
        write(temp_dir.path(), "v1/b.graphqls", "type Listing { id: ID }");

        let err = SchemaLoader::new(temp_dir.path(), "v1").load().unwrap_err();
        assert_eq!(err.code().code(), "SEARCH_SCHEMA_DUPLICATE_TYPE");
        assert!(err.source_file().unwrap().ends_with("b.graphqls"));
    }
}
