//! Generation domain - turns fetched schema documents into wrapper methods
//!
//! The pipeline here is synchronous: documents are parsed into a
//! [`SchemaDocument`], each (path, verb) pair is compiled into a
//! [`GeneratedMethod`], and the results are collected into an [`ApiTree`]
//! that the emitter renders into source files.

pub mod compiler;
pub mod errors;
pub mod sanitizers;
pub mod schema;
pub mod tree;
pub mod types;
pub mod utils;

pub use compiler::{OperationContext, compile_document, compile_operation};
pub use errors::*;
pub use schema::{Definitions, HttpMethod, SchemaDocument, SchemaNode};
pub use tree::{ApiEntry, ApiMetadata, ApiTree};
pub use types::*;
