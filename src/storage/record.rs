//! Persisted fragment occupancy records

use crate::analysis::regions::BoundingBox;
use crate::fragments::fragment::FragmentKind;
use crate::storage::fragments::StorageReference;

/// A record awaiting insertion; the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// 1-based index of the described source image
    pub image_index: usize,
    /// Region id within its numbering scope
    pub region_id: u32,
    /// Where the fragment sits in the source image
    pub bbox: BoundingBox,
    /// Fragment pixels occupying `bbox`
    pub reference: StorageReference,
    /// Overlap or non-overlap
    pub kind: FragmentKind,
}

/// One image's occupancy of one bounding box by one stored fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRecord {
    /// Row id assigned by the store, increasing in insertion order
    pub id: i64,
    /// 1-based index of the described source image
    pub image_index: usize,
    /// Region id within its numbering scope
    pub region_id: u32,
    /// Where the fragment sits in the source image
    pub bbox: BoundingBox,
    /// Fragment pixels occupying `bbox`
    pub reference: StorageReference,
    /// Overlap or non-overlap
    pub kind: FragmentKind,
}

impl FragmentRecord {
    /// Drop the store-assigned id, e.g. to compare records across runs
    pub fn without_id(&self) -> NewRecord {
        NewRecord {
            image_index: self.image_index,
            region_id: self.region_id,
            bbox: self.bbox,
            reference: self.reference.clone(),
            kind: self.kind,
        }
    }
}
