//! Pipeline constants and runtime configuration defaults

use crate::analysis::regions::Connectivity;
use crate::io::error::{Result, invalid_parameter};

// Difference signal thresholds
/// Accumulated luma difference above which a pixel counts as differing
pub const DEFAULT_DIFF_THRESHOLD: u8 = 30;

/// Regions must exceed this many pixels to be kept
pub const DEFAULT_MIN_REGION_AREA: usize = 4;

// Deduplication settings
/// Similarity score a catalog entry must exceed to count as a duplicate
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.95;

/// Side length of the square grayscale rendition used for similarity
pub const CANONICAL_FRAGMENT_SIZE: u32 = 256;

// Smaller renditions leave too few SSIM windows to be meaningful
/// Smallest accepted canonical side length
pub const MIN_CANONICAL_FRAGMENT_SIZE: u32 = 8;

// Output layout
/// Record database file name inside the output directory
pub const DATABASE_FILE_NAME: &str = "database.db";
/// Extension used for stored fragments and reconstructions
pub const FRAGMENT_EXTENSION: &str = "png";
/// File name prefix for reconstructed images
pub const RECONSTRUCTION_PREFIX: &str = "reconstructed_image";

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Scope in which region ids are unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionNumbering {
    /// Each labeling pass numbers its kept regions from 1
    ///
    /// Overlap and non-overlap ids may therefore collide; the record kind
    /// disambiguates them.
    #[default]
    PerPass,
    /// Non-overlap ids continue after the last overlap id of the run
    RunWide,
}

/// Tunable parameters for one extraction run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Luma threshold for the "differs" mask (strictly greater differs)
    pub diff_threshold: u8,
    /// Minimum region area, exclusive
    pub min_region_area: usize,
    /// Pixel adjacency used for region labeling
    pub connectivity: Connectivity,
    /// Similarity score above which fragments are considered duplicates
    pub similarity_threshold: f64,
    /// Side of the canonical grayscale rendition compared by similarity
    pub canonical_size: u32,
    /// Uniqueness scope of region ids
    pub region_numbering: RegionNumbering,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
            min_region_area: DEFAULT_MIN_REGION_AREA,
            connectivity: Connectivity::Eight,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            canonical_size: CANONICAL_FRAGMENT_SIZE,
            region_numbering: RegionNumbering::PerPass,
        }
    }
}

impl PipelineConfig {
    /// Check parameter ranges before a run starts
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The similarity threshold is outside `[-1, 1]` or not finite
    /// - The canonical size is below [`MIN_CANONICAL_FRAGMENT_SIZE`]
    pub fn validate(&self) -> Result<()> {
        if !self.similarity_threshold.is_finite()
            || !(-1.0..=1.0).contains(&self.similarity_threshold)
        {
            return Err(invalid_parameter(
                "similarity_threshold",
                &self.similarity_threshold,
                &"must lie within [-1, 1]",
            ));
        }

        if self.canonical_size < MIN_CANONICAL_FRAGMENT_SIZE {
            return Err(invalid_parameter(
                "canonical_size",
                &self.canonical_size,
                &format!("must be at least {MIN_CANONICAL_FRAGMENT_SIZE}"),
            ));
        }

        Ok(())
    }
}
