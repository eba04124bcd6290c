//! Decomposition of near-duplicate images into reusable visual fragments
//!
//! Regions shared by every image of a batch become overlap fragments, regions
//! that differ become per-image non-overlap fragments. Each fragment is
//! deduplicated by structural similarity, stored once, and referenced by
//! persisted records from which any source image can be rebuilt.

#![forbid(unsafe_code)]

/// Difference accumulation, binary masks and connected-component regions
pub mod analysis;
/// Fragment cropping, similarity deduplication and the run catalog
pub mod fragments;
/// Input/output operations, configuration and error handling
pub mod io;
/// Extraction, reconstruction and summary operations
pub mod pipeline;
/// Fragment pixel storage and record persistence
pub mod storage;

pub use io::configuration::PipelineConfig;
pub use io::error::{PipelineError, Result};
pub use pipeline::{extract_and_save, reconstruct};
