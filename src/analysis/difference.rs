//! Pairwise difference accumulation across a batch of same-sized images
//!
//! The accumulated signal is near zero only where every image agrees and
//! grows wherever any pair disagrees, so thresholding it yields a conservative
//! "differs somewhere" mask. Its inverse marks pixels shared by all images.

use image::RgbImage;
use ndarray::{Array2, Array3};

use crate::analysis::mask::BinaryMask;
use crate::io::error::{PipelineError, Result};

/// Per-channel saturating sum of all pairwise absolute differences
#[derive(Debug, Clone)]
pub struct DiffAccumulator {
    /// Accumulated RGB differences indexed by (row, col, channel)
    accumulated: Array3<u8>,
}

impl DiffAccumulator {
    /// Accumulate differences over every unordered image pair `(i, j)`, `i < j`
    ///
    /// Channel sums saturate at 255 rather than wrapping.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Fewer than two images are supplied
    /// - Any image differs in size from the first one
    pub fn from_images(images: &[RgbImage]) -> Result<Self> {
        let (width, height) = check_batch(images)?;
        let mut accumulated = Array3::<u8>::zeros((height as usize, width as usize, 3));

        for (i, first) in images.iter().enumerate() {
            for second in images.iter().skip(i + 1) {
                for ((x, y, a), b) in first.enumerate_pixels().zip(second.pixels()) {
                    for (channel, (ca, cb)) in a.0.iter().zip(b.0.iter()).enumerate() {
                        let delta = ca.abs_diff(*cb);
                        if let Some(total) =
                            accumulated.get_mut((y as usize, x as usize, channel))
                        {
                            *total = total.saturating_add(delta);
                        }
                    }
                }
            }
        }

        Ok(Self { accumulated })
    }

    /// Accumulated difference collapsed to ITU-R 601 luma
    pub fn luma(&self) -> Array2<u8> {
        let (height, width, _) = self.accumulated.dim();
        Array2::from_shape_fn((height, width), |(row, col)| {
            let channel = |c: usize| {
                u32::from(self.accumulated.get((row, col, c)).copied().unwrap_or(0))
            };
            luma_601(channel(0), channel(1), channel(2))
        })
    }

    /// Mask of pixels whose accumulated luma exceeds `threshold`
    pub fn differs_mask(&self, threshold: u8) -> BinaryMask {
        let luma = self.luma();
        let (height, width) = luma.dim();
        BinaryMask::from_fn(width, height, |row, col| {
            luma.get((row, col)).is_some_and(|&value| value > threshold)
        })
    }

    /// Mask of pixels where every image agrees within `threshold`
    pub fn overlap_mask(&self, threshold: u8) -> BinaryMask {
        self.differs_mask(threshold).inverted()
    }

    /// Batch dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        let (height, width, _) = self.accumulated.dim();
        (width as u32, height as u32)
    }
}

/// ITU-R 601 luma of an RGB triple
///
/// Fixed-point weights 0.299/0.587/0.114 scaled by 2^16, rounded.
pub const fn luma_601(r: u32, g: u32, b: u32) -> u8 {
    ((r * 19_595 + g * 38_470 + b * 7_471 + 0x8000) >> 16) as u8
}

/// Validate that a batch has at least two images of identical size
///
/// Returns the common (width, height).
///
/// # Errors
///
/// Returns [`PipelineError::InsufficientInput`] for fewer than two images and
/// [`PipelineError::DimensionMismatch`] naming the first image whose size
/// differs from the first image's.
pub fn check_batch(images: &[RgbImage]) -> Result<(u32, u32)> {
    let Some(first) = images.first().filter(|_| images.len() >= 2) else {
        return Err(PipelineError::InsufficientInput {
            provided: images.len(),
        });
    };

    let expected = first.dimensions();
    for (index, image) in images.iter().enumerate() {
        if image.dimensions() != expected {
            return Err(PipelineError::DimensionMismatch {
                image_index: index + 1,
                expected,
                found: image.dimensions(),
            });
        }
    }

    Ok(expected)
}
