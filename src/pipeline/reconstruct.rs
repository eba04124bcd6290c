//! Positional reconstruction of one source image from its records
//!
//! The canvas is inferred from recorded geometry: it spans the furthest
//! bounding-box corner of any record for the image. Where the source image
//! extends past every extracted region the reconstruction is smaller, and
//! uncovered pixels stay black.

use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::regions::BoundingBox;
use crate::fragments::fragment::{Fragment, FragmentKind};
use crate::io::error::{PipelineError, Result, invalid_data};
use crate::io::image::export_image;
use crate::storage::fragments::FragmentStorage;
use crate::storage::record::FragmentRecord;
use crate::storage::store::RecordStore;
use crate::storage::workspace::Workspace;

/// Composite every record of `image_index` onto an inferred canvas
///
/// Overlap fragments are pasted first and non-overlap fragments on top, each
/// in record order at its bounding-box origin. Only member pixels of a
/// fragment are written, clipped to the record's bounding box. A reused
/// fragment may be larger than the region it stands in for.
///
/// # Errors
///
/// Returns an error if:
/// - No records exist for `image_index`
/// - The store cannot be queried
/// - A record has an empty bounding box
/// - A referenced fragment cannot be opened
pub fn reconstruct(
    image_index: usize,
    store: &dyn RecordStore,
    storage: &FragmentStorage,
) -> Result<RgbImage> {
    let records = store.records_for(image_index)?;
    if records.is_empty() {
        return Err(PipelineError::UnknownImageIndex { image_index });
    }

    let (width, height) = canvas_size(&records)?;
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));

    let (overlap, non_overlap): (Vec<&FragmentRecord>, Vec<&FragmentRecord>) = records
        .iter()
        .partition(|record| record.kind == FragmentKind::Overlap);

    for record in overlap.into_iter().chain(non_overlap) {
        if !record.bbox.fits_within(width as usize, height as usize) {
            let id = record.id;
            return Err(invalid_data(&format!("record {id} has an empty bounding box")));
        }
        let fragment = storage.open(&record.reference)?;
        paste(&mut canvas, &fragment, record.bbox);
    }

    info!(
        image_index,
        records = records.len(),
        width,
        height,
        "image reconstructed"
    );

    Ok(canvas)
}

/// Reconstruct `image_index` and save it, by default inside the workspace
///
/// Returns the path written.
///
/// # Errors
///
/// Returns any error of [`reconstruct`], or an export error if the image
/// cannot be saved
pub fn reconstruct_to_file(
    image_index: usize,
    workspace: &Workspace,
    destination: Option<&Path>,
) -> Result<PathBuf> {
    let image = reconstruct(image_index, workspace.store(), workspace.storage())?;
    let path = destination.map_or_else(
        || workspace.reconstruction_path(image_index),
        Path::to_path_buf,
    );
    export_image(&image, &path)?;
    Ok(path)
}

/// Smallest (width, height) covering every record's max corner
///
/// # Errors
///
/// Returns an error if the extent does not fit an image dimension
pub fn canvas_size(records: &[FragmentRecord]) -> Result<(u32, u32)> {
    let max_col = records.iter().map(|r| r.bbox.max_col).max().unwrap_or(0);
    let max_row = records.iter().map(|r| r.bbox.max_row).max().unwrap_or(0);

    let to_dimension = |value: usize| {
        u32::try_from(value)
            .map_err(|e| invalid_data(&format!("canvas extent {value} is too large: {e}")))
    };
    Ok((to_dimension(max_col)?, to_dimension(max_row)?))
}

fn paste(canvas: &mut RgbImage, fragment: &Fragment, bbox: BoundingBox) {
    for (row, col) in fragment.mask().iter_ones() {
        if row >= bbox.height() || col >= bbox.width() {
            continue;
        }
        let Some(&pixel) = fragment.pixels().get_pixel_checked(col as u32, row as u32) else {
            continue;
        };
        let (x, y) = ((bbox.min_col + col) as u32, (bbox.min_row + row) as u32);
        if let Some(target) = canvas.get_pixel_mut_checked(x, y) {
            *target = pixel;
        }
    }
}
