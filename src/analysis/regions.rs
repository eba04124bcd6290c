//! Connected-component discovery over binary masks
//!
//! Components are labeled by flood fill in raster order of each component's
//! first pixel, so label assignment is reproducible for identical input.

use ndarray::Array2;

use crate::analysis::mask::BinaryMask;

/// Pixel adjacency used when growing components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Edge neighbours only
    Four,
    /// Edge and diagonal neighbours
    #[default]
    Eight,
}

impl Connectivity {
    const FOUR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
    const EIGHT_OFFSETS: [(isize, isize); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];

    /// Neighbour offsets as (row, col) deltas
    pub const fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Self::Four => &Self::FOUR_OFFSETS,
            Self::Eight => &Self::EIGHT_OFFSETS,
        }
    }
}

/// Axis-aligned pixel rectangle, half-open on the max corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// First row (inclusive)
    pub min_row: usize,
    /// First column (inclusive)
    pub min_col: usize,
    /// Last row (exclusive)
    pub max_row: usize,
    /// Last column (exclusive)
    pub max_col: usize,
}

impl BoundingBox {
    /// Box spanning a single pixel
    pub const fn from_pixel(row: usize, col: usize) -> Self {
        Self {
            min_row: row,
            min_col: col,
            max_row: row + 1,
            max_col: col + 1,
        }
    }

    /// Grow the box to include a pixel
    pub fn include(&mut self, row: usize, col: usize) {
        self.min_row = self.min_row.min(row);
        self.min_col = self.min_col.min(col);
        self.max_row = self.max_row.max(row + 1);
        self.max_col = self.max_col.max(col + 1);
    }

    /// Number of columns covered
    pub const fn width(&self) -> usize {
        self.max_col - self.min_col
    }

    /// Number of rows covered
    pub const fn height(&self) -> usize {
        self.max_row - self.min_row
    }

    /// Check the box is non-empty and lies within a `width` x `height` image
    pub const fn fits_within(&self, width: usize, height: usize) -> bool {
        self.min_row < self.max_row
            && self.min_col < self.max_col
            && self.max_row <= height
            && self.max_col <= width
    }
}

/// One connected component of a binary mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Label within its labeling pass (1-based, raster order)
    pub label: u32,
    /// Tight bounding box of the component
    pub bbox: BoundingBox,
    /// Number of member pixels
    pub area: usize,
    /// Membership mask local to `bbox`
    pub mask: BinaryMask,
}

/// Finds connected components and filters out noise-sized ones
#[derive(Debug, Clone, Copy)]
pub struct RegionExtractor {
    connectivity: Connectivity,
    min_area: usize,
}

impl RegionExtractor {
    /// Create an extractor; regions must have `area > min_area` to be kept
    pub const fn new(connectivity: Connectivity, min_area: usize) -> Self {
        Self {
            connectivity,
            min_area,
        }
    }

    /// Label all components of `mask` and return those above the area threshold
    ///
    /// Output is ordered by label. Labels count every component, including
    /// the ones filtered out, so kept labels need not be contiguous.
    pub fn extract(&self, mask: &BinaryMask) -> Vec<Region> {
        if mask.is_empty() {
            return Vec::new();
        }

        let (width, height) = (mask.width(), mask.height());
        let mut labels = Array2::<u32>::zeros((height, width));
        let mut regions = Vec::new();
        let mut next_label = 0u32;
        let mut stack = Vec::new();
        let mut members = Vec::new();

        for (row, col) in mask.iter_ones() {
            if labels.get((row, col)).copied().unwrap_or(0) != 0 {
                continue;
            }

            next_label += 1;
            members.clear();
            let mut bbox = BoundingBox::from_pixel(row, col);
            if let Some(label) = labels.get_mut((row, col)) {
                *label = next_label;
            }
            stack.push((row, col));

            while let Some((r, c)) = stack.pop() {
                members.push((r, c));
                bbox.include(r, c);

                for &(dr, dc) in self.connectivity.offsets() {
                    let (Some(nr), Some(nc)) =
                        (r.checked_add_signed(dr), c.checked_add_signed(dc))
                    else {
                        continue;
                    };
                    if !mask.get(nr, nc) {
                        continue;
                    }
                    if let Some(label) = labels.get_mut((nr, nc)) {
                        if *label == 0 {
                            *label = next_label;
                            stack.push((nr, nc));
                        }
                    }
                }
            }

            if members.len() <= self.min_area {
                continue;
            }

            let mut local = BinaryMask::new(bbox.width(), bbox.height());
            for &(r, c) in &members {
                local.set(r - bbox.min_row, c - bbox.min_col, true);
            }

            regions.push(Region {
                label: next_label,
                bbox,
                area: members.len(),
                mask: local,
            });
        }

        regions
    }
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self::new(
            Connectivity::Eight,
            crate::io::configuration::DEFAULT_MIN_REGION_AREA,
        )
    }
}
