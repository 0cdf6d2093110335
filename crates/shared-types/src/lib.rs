//! Value types shared across the termo workspace

pub mod audit;
pub mod types;

pub use audit::{hash_document, ExportRecord};
pub use types::{ResolvedDocument, Template, VersionEntry, VersionSummary, STARTER_TITLE};
