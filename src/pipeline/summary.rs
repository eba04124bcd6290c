//! Catalog statistics for an output directory

use std::collections::BTreeSet;

use crate::fragments::fragment::FragmentKind;
use crate::io::error::Result;
use crate::storage::fragments::{FragmentStorage, StorageReference};
use crate::storage::store::RecordStore;

/// Record counts for one image index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    /// 1-based image index
    pub image_index: usize,
    /// Overlap records describing this image
    pub overlap_records: usize,
    /// Non-overlap records describing this image
    pub non_overlap_records: usize,
}

/// Aggregate view of a populated catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    /// Per-image record counts, ascending by index
    pub images: Vec<ImageSummary>,
    /// Distinct stored fragments referenced by any record
    pub fragment_count: usize,
    /// Total bytes of those fragments in storage
    pub fragment_bytes: u64,
}

impl CatalogSummary {
    /// Total records across all images
    pub fn record_count(&self) -> usize {
        self.images
            .iter()
            .map(|image| image.overlap_records + image.non_overlap_records)
            .sum()
    }
}

/// Summarise every image index in `store`
///
/// # Errors
///
/// Returns an error if the store cannot be queried or a referenced fragment's
/// size cannot be read
pub fn summarize(store: &dyn RecordStore, storage: &FragmentStorage) -> Result<CatalogSummary> {
    let mut images = Vec::new();
    let mut references = BTreeSet::<StorageReference>::new();

    for image_index in store.image_indexes()? {
        let records = store.records_for(image_index)?;
        let overlap_records = records
            .iter()
            .filter(|record| record.kind == FragmentKind::Overlap)
            .count();

        images.push(ImageSummary {
            image_index,
            overlap_records,
            non_overlap_records: records.len() - overlap_records,
        });
        references.extend(records.into_iter().map(|record| record.reference));
    }

    let mut fragment_bytes = 0;
    for reference in &references {
        fragment_bytes += storage.size_of(reference)?;
    }

    Ok(CatalogSummary {
        images,
        fragment_count: references.len(),
        fragment_bytes,
    })
}
