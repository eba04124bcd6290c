//! First-match perceptual deduplication against the run catalog

use image::GrayImage;
use tracing::debug;

use crate::fragments::fragment::{Fragment, FragmentKind};
use crate::fragments::similarity::{canonical_rendition, structural_similarity};
use crate::io::configuration::{CANONICAL_FRAGMENT_SIZE, DEFAULT_SIMILARITY_THRESHOLD};
use crate::io::error::{PipelineError, Result};
use crate::storage::fragments::StorageReference;

/// A fragment already committed during the current run
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Where the fragment's pixels live
    pub reference: StorageReference,
    /// Region id the fragment was first committed under
    pub region_id: u32,
    /// Signal the fragment was first extracted from
    pub kind: FragmentKind,
    /// Cached canonical grayscale rendition used for comparisons
    pub canonical: GrayImage,
}

/// Outcome of comparing a candidate against the catalog
#[derive(Debug, Clone)]
pub enum DedupDecision {
    /// An earlier fragment is similar enough to stand in for the candidate
    Duplicate {
        /// Reference of the first matching catalog entry
        reference: StorageReference,
        /// Similarity score of that entry
        score: f64,
    },
    /// No entry matched; the candidate must be committed
    Novel {
        /// Canonical rendition of the candidate, reusable as its catalog entry
        canonical: GrayImage,
    },
}

/// Decides whether a candidate fragment duplicates a catalog entry
///
/// Entries are scanned oldest first and the first one scoring above the
/// threshold wins, so the result depends on catalog order rather than on
/// which entry is most similar.
#[derive(Debug, Clone, Copy)]
pub struct FragmentDeduper {
    threshold: f64,
    canonical_size: u32,
}

impl Default for FragmentDeduper {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD, CANONICAL_FRAGMENT_SIZE)
    }
}

impl FragmentDeduper {
    /// Create a deduper matching scores strictly above `threshold`
    pub const fn new(threshold: f64, canonical_size: u32) -> Self {
        Self {
            threshold,
            canonical_size,
        }
    }

    /// Canonical grayscale rendition of a fragment
    pub fn rendition(&self, fragment: &Fragment) -> GrayImage {
        canonical_rendition(&fragment.grayscale(), self.canonical_size)
    }

    /// Compare `candidate` against `catalog` in insertion order
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Similarity`] naming the catalog entry whose
    /// comparison could not be computed.
    pub fn decide(&self, candidate: &Fragment, catalog: &[CatalogEntry]) -> Result<DedupDecision> {
        let canonical = self.rendition(candidate);

        for entry in catalog {
            let score = structural_similarity(&canonical, &entry.canonical).map_err(|reason| {
                PipelineError::Similarity {
                    reference: entry.reference.to_string(),
                    reason,
                }
            })?;

            if score > self.threshold {
                debug!(reference = %entry.reference, score, "fragment matched catalog entry");
                return Ok(DedupDecision::Duplicate {
                    reference: entry.reference.clone(),
                    score,
                });
            }
        }

        Ok(DedupDecision::Novel { canonical })
    }
}
