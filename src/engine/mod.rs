//! Search engine boundary
//!
//! The [`SearchClient`] trait is the only way the service talks to a search
//! engine. [`InMemorySearchEngine`] executes the same requests in process.

mod client;
mod errors;
mod memory;

pub use client::{
    AliasAction, BulkItem, BulkOperation, BulkRequest, BulkResponse, CreateIndexRequest,
    CreateIndexResponse, GetResult, SearchClient, SearchHit, SearchRequest, SearchResponse,
};
pub use errors::{EngineError, EngineResult};
pub use memory::InMemorySearchEngine;
