//! Overlap and non-overlap fragment extraction with deduplication
//!
//! The overlap pass crops every overlap region from every image in order;
//! the non-overlap pass crops every differing region from each image in turn.
//! Both passes share one catalog, so a non-overlap candidate may reuse an
//! overlap fragment and vice versa.

use image::RgbImage;
use tracing::info;

use crate::analysis::difference::DiffAccumulator;
use crate::analysis::regions::{Region, RegionExtractor};
use crate::fragments::catalog::{FragmentCatalog, Placement};
use crate::fragments::dedup::{DedupDecision, FragmentDeduper};
use crate::fragments::fragment::{Fragment, FragmentKind};
use crate::io::configuration::{PipelineConfig, RegionNumbering};
use crate::io::error::{PipelineError, Result, invalid_data};
use crate::io::progress::ProgressManager;
use crate::storage::fragments::FragmentStorage;
use crate::storage::store::RecordStore;

/// Counts describing one completed extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Number of source images
    pub image_count: usize,
    /// Kept regions of the overlap mask
    pub overlap_regions: usize,
    /// Kept regions of the differs mask
    pub non_overlap_regions: usize,
    /// Fragments written to storage
    pub fragments_saved: usize,
    /// Candidates that reused an earlier fragment
    pub duplicates_reused: usize,
    /// Records persisted by the final commit
    pub records_written: usize,
}

/// Run the full extraction pipeline and persist its records atomically
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - The store already holds records
/// - Fewer than two images are given or their sizes differ
/// - A fragment cannot be written or compared
/// - The final record commit fails
///
/// No record is visible in `store` unless the whole run succeeds.
pub fn extract_and_save(
    images: &[RgbImage],
    store: &mut dyn RecordStore,
    storage: &FragmentStorage,
    config: &PipelineConfig,
) -> Result<ExtractionReport> {
    extract_with_progress(images, store, storage, config, None)
}

/// [`extract_and_save`] reporting per-candidate progress
///
/// # Errors
///
/// Same conditions as [`extract_and_save`]
pub fn extract_with_progress(
    images: &[RgbImage],
    store: &mut dyn RecordStore,
    storage: &FragmentStorage,
    config: &PipelineConfig,
    mut progress: Option<&mut ProgressManager>,
) -> Result<ExtractionReport> {
    config.validate()?;

    let existing_records = store.record_count()?;
    if existing_records > 0 {
        return Err(PipelineError::CatalogNotEmpty { existing_records });
    }

    let accumulator = DiffAccumulator::from_images(images)?;
    let differs = accumulator.differs_mask(config.diff_threshold);
    let overlap = accumulator.overlap_mask(config.diff_threshold);

    let extractor = RegionExtractor::new(config.connectivity, config.min_region_area);
    let overlap_regions = extractor.extract(&overlap);
    let non_overlap_regions = extractor.extract(&differs);

    let (width, height) = accumulator.dimensions();
    info!(
        images = images.len(),
        width,
        height,
        differing_pixels = differs.count_ones(),
        overlap_regions = overlap_regions.len(),
        non_overlap_regions = non_overlap_regions.len(),
        "regions extracted"
    );

    let deduper = FragmentDeduper::new(config.similarity_threshold, config.canonical_size);
    let mut catalog = FragmentCatalog::new(storage);
    let passes = Passes {
        images,
        deduper: &deduper,
        numbering: config.region_numbering,
    };

    let reused = match passes.run(
        &overlap_regions,
        &non_overlap_regions,
        &mut catalog,
        progress.as_deref_mut(),
    ) {
        Ok(reused) => reused,
        Err(error) => {
            catalog.abort();
            return Err(error);
        }
    };

    let fragments_saved = catalog.written_count();
    let records_written = catalog.finish(store)?;

    if let Some(progress) = progress {
        progress.finish();
    }

    info!(fragments_saved, reused, records_written, "extraction committed");

    Ok(ExtractionReport {
        image_count: images.len(),
        overlap_regions: overlap_regions.len(),
        non_overlap_regions: non_overlap_regions.len(),
        fragments_saved,
        duplicates_reused: reused,
        records_written,
    })
}

// Shared inputs of both passes
struct Passes<'a> {
    images: &'a [RgbImage],
    deduper: &'a FragmentDeduper,
    numbering: RegionNumbering,
}

impl Passes<'_> {
    // Returns the number of candidates that reused an existing fragment
    fn run(
        &self,
        overlap_regions: &[Region],
        non_overlap_regions: &[Region],
        catalog: &mut FragmentCatalog<'_>,
        mut progress: Option<&mut ProgressManager>,
    ) -> Result<usize> {
        let mut reused = 0;

        if let Some(progress) = progress.as_deref_mut() {
            progress.start_pass(
                FragmentKind::Overlap,
                overlap_regions.len() * self.images.len(),
            );
        }
        for (position, region) in overlap_regions.iter().enumerate() {
            let region_id = region_id(position, 0)?;
            for (offset, image) in self.images.iter().enumerate() {
                let placement = Placement {
                    image_index: offset + 1,
                    region_id,
                    bbox: region.bbox,
                    kind: FragmentKind::Overlap,
                };
                let duplicate = self.place(image, region, placement, catalog)?;
                reused += usize::from(duplicate);
                if let Some(progress) = progress.as_deref() {
                    progress.advance(duplicate);
                }
            }
        }

        let first_id = match self.numbering {
            RegionNumbering::PerPass => 0,
            RegionNumbering::RunWide => overlap_regions.len(),
        };

        if let Some(progress) = progress.as_deref_mut() {
            progress.start_pass(
                FragmentKind::NonOverlap,
                non_overlap_regions.len() * self.images.len(),
            );
        }
        for (offset, image) in self.images.iter().enumerate() {
            for (position, region) in non_overlap_regions.iter().enumerate() {
                let placement = Placement {
                    image_index: offset + 1,
                    region_id: region_id(position, first_id)?,
                    bbox: region.bbox,
                    kind: FragmentKind::NonOverlap,
                };
                let duplicate = self.place(image, region, placement, catalog)?;
                reused += usize::from(duplicate);
                if let Some(progress) = progress.as_deref() {
                    progress.advance(duplicate);
                }
            }
        }

        Ok(reused)
    }

    // Returns true when the candidate reused an existing fragment
    fn place(
        &self,
        image: &RgbImage,
        region: &Region,
        placement: Placement,
        catalog: &mut FragmentCatalog<'_>,
    ) -> Result<bool> {
        let fragment = Fragment::crop(image, region);

        match self.deduper.decide(&fragment, catalog.entries())? {
            DedupDecision::Duplicate { reference, .. } => {
                catalog.record_existing(reference, placement);
                Ok(true)
            }
            DedupDecision::Novel { canonical } => {
                catalog.commit(&fragment, canonical, placement)?;
                Ok(false)
            }
        }
    }
}

fn region_id(position: usize, first_id: usize) -> Result<u32> {
    u32::try_from(first_id + position + 1)
        .map_err(|e| invalid_data(&format!("region id out of range: {e}")))
}
