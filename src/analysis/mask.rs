//! Bit-per-pixel masks for differences and region membership

use bitvec::prelude::*;
use std::fmt;

/// Row-major binary grid with one bit per pixel
///
/// Used both for whole-image difference masks and for the membership mask of
/// a single region, local to that region's bounding box.
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryMask {
    bits: BitVec,
    width: usize,
    height: usize,
}

impl BinaryMask {
    /// Create a mask with every bit cleared
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            bits: bitvec![0; width * height],
            width,
            height,
        }
    }

    /// Create a mask with every bit set
    pub fn filled(width: usize, height: usize) -> Self {
        Self {
            bits: bitvec![1; width * height],
            width,
            height,
        }
    }

    /// Build a mask by evaluating `predicate(row, col)` for every pixel
    pub fn from_fn(
        width: usize,
        height: usize,
        mut predicate: impl FnMut(usize, usize) -> bool,
    ) -> Self {
        let mut mask = Self::new(width, height);
        for row in 0..height {
            for col in 0..width {
                if predicate(row, col) {
                    mask.bits.set(row * width + col, true);
                }
            }
        }
        mask
    }

    /// Mask width in pixels
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Mask height in pixels
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Test a pixel; out-of-range coordinates read as unset
    pub fn get(&self, row: usize, col: usize) -> bool {
        if row >= self.height || col >= self.width {
            return false;
        }
        self.bits.get(row * self.width + col).as_deref() == Some(&true)
    }

    /// Set or clear a pixel; out-of-range coordinates are ignored
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        if row < self.height && col < self.width {
            self.bits.set(row * self.width + col, value);
        }
    }

    /// Logical inverse of this mask
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            bits: !self.bits.clone(),
            width: self.width,
            height: self.height,
        }
    }

    /// Number of set pixels
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Test if no pixel is set
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Iterate over `(row, col)` of every set pixel in row-major order
    pub fn iter_ones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.bits
            .iter_ones()
            .map(move |index| (index / width, index % width))
    }
}

impl fmt::Debug for BinaryMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BinaryMask({}x{})", self.width, self.height)?;
        for row in 0..self.height {
            for col in 0..self.width {
                f.write_str(if self.get(row, col) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
