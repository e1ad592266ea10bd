//! Index mapping subsystem
//!
//! Derives the search engine's index mapping for every document type of a
//! proto schema, and the index creation body carrying it.

mod generator;
mod index;

pub use generator::MappingGenerator;
pub use index::{index_body, stamp, timestamp_now, TIMESTAMP_FIELD};
