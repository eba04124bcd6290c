//! Structural similarity on a common canonical footing
//!
//! Fragments of different bounding-box sizes are compared by resampling their
//! grayscale renditions to one fixed square size first. This trades some
//! precision for comparability: the score measures structural resemblance,
//! not pixel equality.

use image::GrayImage;
use image::imageops::{self, FilterType};
use image_compare::Algorithm;

/// Grayscale rendition resampled to `size` x `size`
pub fn canonical_rendition(gray: &GrayImage, size: u32) -> GrayImage {
    if gray.dimensions() == (size, size) {
        return gray.clone();
    }
    imageops::resize(gray, size, size, FilterType::Triangle)
}

/// Mean structural similarity of two equally sized grayscale images
///
/// Scores lie in `[-1, 1]`; identical inputs score 1.
///
/// # Errors
///
/// Returns a description of the failure if the images differ in size or the
/// underlying computation fails.
pub fn structural_similarity(
    first: &GrayImage,
    second: &GrayImage,
) -> std::result::Result<f64, String> {
    if first.dimensions() != second.dimensions() {
        return Err(format!(
            "renditions differ in size: {:?} vs {:?}",
            first.dimensions(),
            second.dimensions()
        ));
    }

    image_compare::gray_similarity_structure(&Algorithm::MSSIMSimple, first, second)
        .map(|similarity| similarity.score)
        .map_err(|e| format!("{e:?}"))
}
