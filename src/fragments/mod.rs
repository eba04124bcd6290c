//! Fragment cropping, similarity and run-scoped cataloguing

/// Run catalog that commits novel fragments and buffers records
pub mod catalog;
/// First-match similarity deduplication
pub mod dedup;
/// Mask-composited crops and their kinds
pub mod fragment;
/// Canonical renditions and structural similarity
pub mod similarity;

pub use catalog::{FragmentCatalog, Placement};
pub use dedup::{CatalogEntry, DedupDecision, FragmentDeduper};
pub use fragment::{Fragment, FragmentKind};
