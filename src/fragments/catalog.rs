//! Run-scoped fragment catalog with deferred record persistence
//!
//! Novel fragments are written to storage as soon as they are committed, but
//! their records are only buffered. [`FragmentCatalog::finish`] flushes every
//! buffered record in a single store transaction; dropping the catalog through
//! [`FragmentCatalog::abort`] instead removes the fragment files it wrote.

use image::GrayImage;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::analysis::regions::BoundingBox;
use crate::fragments::dedup::CatalogEntry;
use crate::fragments::fragment::{Fragment, FragmentKind};
use crate::io::error::{Result, invalid_data};
use crate::storage::fragments::{FragmentStorage, StorageReference};
use crate::storage::record::NewRecord;
use crate::storage::store::RecordStore;

/// Where a fragment sits: which image, which region, which box, which signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// 1-based source image index
    pub image_index: usize,
    /// Region id within its numbering scope
    pub region_id: u32,
    /// Bounding box within the source image
    pub bbox: BoundingBox,
    /// Overlap or non-overlap
    pub kind: FragmentKind,
}

impl Placement {
    fn record(&self, reference: StorageReference) -> NewRecord {
        NewRecord {
            image_index: self.image_index,
            region_id: self.region_id,
            bbox: self.bbox,
            reference,
            kind: self.kind,
        }
    }
}

/// Fragments saved during one extraction run plus their pending records
#[derive(Debug)]
pub struct FragmentCatalog<'s> {
    storage: &'s FragmentStorage,
    entries: Vec<CatalogEntry>,
    written: HashSet<StorageReference>,
    pending: Vec<NewRecord>,
}

impl<'s> FragmentCatalog<'s> {
    /// Start an empty catalog writing into `storage`
    pub fn new(storage: &'s FragmentStorage) -> Self {
        Self {
            storage,
            entries: Vec::new(),
            written: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Saved fragments, oldest first
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Records buffered for the final commit, in creation order
    pub fn pending_records(&self) -> &[NewRecord] {
        &self.pending
    }

    /// Write a novel fragment and buffer its record
    ///
    /// `canonical` is the fragment's similarity rendition, kept so later
    /// candidates compare against it without reloading pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the derived reference was already written during
    /// this run or the pixels cannot be saved. A partially written file is
    /// removed before the error is returned.
    pub fn commit(
        &mut self,
        fragment: &Fragment,
        canonical: GrayImage,
        placement: Placement,
    ) -> Result<StorageReference> {
        let reference = StorageReference::for_fragment(
            placement.kind,
            placement.image_index,
            placement.region_id,
        );

        if self.written.contains(&reference) {
            return Err(invalid_data(&format!(
                "fragment '{reference}' was already written in this run"
            )));
        }

        if let Err(error) = self.storage.save(&reference, fragment) {
            // A failed encode can leave a truncated file behind
            self.discard(&reference);
            return Err(error);
        }
        self.written.insert(reference.clone());
        debug!(
            %reference,
            image_index = placement.image_index,
            region_id = placement.region_id,
            "committed novel fragment"
        );

        self.entries.push(CatalogEntry {
            reference: reference.clone(),
            region_id: placement.region_id,
            kind: placement.kind,
            canonical,
        });
        self.pending.push(placement.record(reference.clone()));

        Ok(reference)
    }

    /// Buffer a record that reuses an already committed fragment
    pub fn record_existing(&mut self, existing: StorageReference, placement: Placement) {
        self.pending.push(placement.record(existing));
    }

    /// Number of fragment files written so far
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    /// Persist every buffered record in one transaction
    ///
    /// On failure the fragments written during this run are removed again.
    ///
    /// # Errors
    ///
    /// Returns the store error if the transaction fails
    pub fn finish(self, store: &mut dyn RecordStore) -> Result<usize> {
        match store.insert_records(&self.pending) {
            Ok(()) => Ok(self.pending.len()),
            Err(error) => {
                self.abort();
                Err(error)
            }
        }
    }

    /// Discard the run, removing fragment files it wrote
    pub fn abort(self) {
        for reference in &self.written {
            self.discard(reference);
        }
    }

    fn discard(&self, reference: &StorageReference) {
        if let Err(error) = self.storage.remove(reference) {
            warn!(%reference, %error, "failed to remove orphaned fragment");
        }
    }
}
