//! Mask-composited crops of source images

use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

use crate::analysis::difference::luma_601;
use crate::analysis::mask::BinaryMask;
use crate::analysis::regions::Region;

/// Which signal a fragment was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// Shared by every image in the batch
    Overlap,
    /// Specific to one image
    NonOverlap,
}

impl FragmentKind {
    /// Stable lowercase name used in storage references and the record table
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overlap => "overlap",
            Self::NonOverlap => "non_overlap",
        }
    }

    /// Parse the name produced by [`Self::as_str`]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "overlap" => Some(Self::Overlap),
            "non_overlap" => Some(Self::NonOverlap),
            _ => None,
        }
    }
}

/// Pixels of one region cropped from one image
///
/// Pixels outside the region mask are zero. The mask travels with the
/// pixels so that the zero background stays distinguishable from genuinely
/// black content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pixels: RgbImage,
    mask: BinaryMask,
}

impl Fragment {
    /// Crop `image` to the region bounding box and clear non-member pixels
    ///
    /// The region is assumed to lie within `image`; pixels falling outside
    /// it read as background.
    pub fn crop(image: &RgbImage, region: &Region) -> Self {
        let bbox = region.bbox;
        let pixels = RgbImage::from_fn(bbox.width() as u32, bbox.height() as u32, |x, y| {
            let (row, col) = (y as usize, x as usize);
            if !region.mask.get(row, col) {
                return Rgb([0, 0, 0]);
            }
            image
                .get_pixel_checked((bbox.min_col + col) as u32, (bbox.min_row + row) as u32)
                .copied()
                .unwrap_or(Rgb([0, 0, 0]))
        });

        Self {
            pixels,
            mask: region.mask.clone(),
        }
    }

    /// Rebuild a fragment from its stored RGBA form (alpha carries the mask)
    pub fn from_rgba(stored: &RgbaImage) -> Self {
        let (width, height) = stored.dimensions();
        let mask = BinaryMask::from_fn(width as usize, height as usize, |row, col| {
            stored
                .get_pixel_checked(col as u32, row as u32)
                .is_some_and(|pixel| pixel.0[3] > 0)
        });
        let pixels = RgbImage::from_fn(width, height, |x, y| {
            let Rgba([r, g, b, a]) = *stored.get_pixel(x, y);
            if a > 0 { Rgb([r, g, b]) } else { Rgb([0, 0, 0]) }
        });
        Self { pixels, mask }
    }

    /// Encode as RGBA with alpha 255 inside the mask and 0 outside
    pub fn to_rgba(&self) -> RgbaImage {
        RgbaImage::from_fn(self.pixels.width(), self.pixels.height(), |x, y| {
            let Rgb([r, g, b]) = *self.pixels.get_pixel(x, y);
            let alpha = if self.mask.get(y as usize, x as usize) {
                u8::MAX
            } else {
                0
            };
            Rgba([r, g, b, alpha])
        })
    }

    /// ITU-R 601 grayscale rendition of the composited pixels
    pub fn grayscale(&self) -> GrayImage {
        GrayImage::from_fn(self.pixels.width(), self.pixels.height(), |x, y| {
            let Rgb([r, g, b]) = *self.pixels.get_pixel(x, y);
            Luma([luma_601(u32::from(r), u32::from(g), u32::from(b))])
        })
    }

    /// Composited pixels, zero outside the mask
    pub const fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Membership mask local to the fragment
    pub const fn mask(&self) -> &BinaryMask {
        &self.mask
    }
}
