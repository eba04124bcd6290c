//! Pipeline surface: extraction, reconstruction and catalog summaries

/// Overlap and non-overlap extraction with deduplication
pub mod extract;
/// Rebuilding source images from persisted records
pub mod reconstruct;
/// Per-image record statistics
pub mod summary;

pub use extract::{ExtractionReport, extract_and_save, extract_with_progress};
pub use reconstruct::{reconstruct, reconstruct_to_file};
pub use summary::{CatalogSummary, ImageSummary, summarize};
