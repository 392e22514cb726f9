//! DDL text to schema model extraction.

mod extract;
mod scanner;

pub use extract::{Extraction, SchemaExtractor};
