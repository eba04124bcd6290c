//! Tests for bit-packed binary masks

#[cfg(test)]
mod tests {
    use fragdedup::analysis::mask::BinaryMask;

    // Tests a new mask starts empty and a filled mask is fully set
    // Verified by swapping the initial bit values
    #[test]
    fn test_new_and_filled() {
        let empty = BinaryMask::new(3, 2);
        let full = BinaryMask::filled(3, 2);

        assert!(empty.is_empty());
        assert_eq!(empty.count_ones(), 0);
        assert_eq!(full.count_ones(), 6);
        assert_eq!((full.width(), full.height()), (3, 2));
    }

    // Tests pixels are addressed row-major by (row, col)
    // Verified by transposing the index calculation
    #[test]
    fn test_set_and_get_row_major() {
        let mut mask = BinaryMask::new(4, 2);
        mask.set(1, 3, true);

        assert!(mask.get(1, 3));
        assert!(!mask.get(3, 1));
        assert_eq!(mask.iter_ones().collect::<Vec<_>>(), vec![(1, 3)]);
    }

    // Tests out-of-range access reads unset and writes are ignored
    // Verified by removing the bounds checks
    #[test]
    fn test_out_of_range_access() {
        let mut mask = BinaryMask::new(2, 2);
        mask.set(5, 0, true);
        mask.set(0, 2, true);

        assert!(mask.is_empty());
        assert!(!mask.get(2, 0));
        assert!(!mask.get(0, 2));
    }

    // Tests inversion flips every pixel and nothing beyond the grid
    // Verified by inverting only the first word
    #[test]
    fn test_inverted() {
        let mask = BinaryMask::from_fn(5, 3, |row, col| row == col);
        let inverted = mask.inverted();

        assert_eq!(mask.count_ones(), 3);
        assert_eq!(inverted.count_ones(), 12);
        assert!(!inverted.get(1, 1));
        assert!(inverted.get(0, 1));
        assert_eq!(inverted.inverted(), mask);
    }

    // Tests set pixels are iterated in raster order
    // Verified by iterating column-major
    #[test]
    fn test_iter_ones_raster_order() {
        let mask = BinaryMask::from_fn(3, 3, |row, col| (row + col) % 2 == 0);

        assert_eq!(
            mask.iter_ones().collect::<Vec<_>>(),
            vec![(0, 0), (0, 2), (1, 1), (2, 0), (2, 2)]
        );
    }

    // Tests debug output renders the grid
    // Verified by omitting row separators
    #[test]
    fn test_debug_rendering() {
        let mask = BinaryMask::from_fn(2, 2, |row, _| row == 0);
        let rendered = format!("{mask:?}");

        assert!(rendered.contains("BinaryMask(2x2)"));
        assert!(rendered.contains("##\n..\n"));
    }
}
