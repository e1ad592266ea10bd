//! schemasearch - schema-driven search over a document search engine
//!
//! Derives index mappings and a consumer query schema from annotated type
//! definitions, and compiles client filter, group-by and sort input into
//! search engine queries with keyset cursor pagination.

pub mod cli;
pub mod config;
pub mod consumer;
pub mod engine;
pub mod mapping;
pub mod pagination;
pub mod path;
pub mod query;
pub mod schema;
pub mod service;
