//! Swagger endpoint discovery and document loading

pub mod discovery;
pub mod documents;
pub mod metadata;

pub use discovery::{EndpointSource, ExtractionRule, discover, merge_candidates, normalize_base_url};
pub use documents::build_tree;
pub use metadata::{MetadataDocument, MetadataReport, derive_identifier, fetch_all};
