//! Inbound query-execution boundary
//!
//! [`DocumentService`] runs the per-document-type operations against any
//! [`SearchClient`](crate::engine::SearchClient) and reports failures in the
//! [`ServiceError`] taxonomy.

mod documents;
mod errors;

pub use documents::DocumentService;
pub use errors::{BulkFailure, ErrorEntry, ErrorKind, ServiceError, ServiceResult};
