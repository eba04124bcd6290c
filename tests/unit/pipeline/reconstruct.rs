//! Tests for positional reconstruction from stored records

#[cfg(test)]
mod tests {
    use crate::support::{gradient, solid, with_inverted_corner};
    use fragdedup::analysis::mask::BinaryMask;
    use fragdedup::analysis::regions::{BoundingBox, RegionExtractor};
    use fragdedup::fragments::fragment::{Fragment, FragmentKind};
    use fragdedup::io::configuration::PipelineConfig;
    use fragdedup::io::error::PipelineError;
    use fragdedup::pipeline::reconstruct::canvas_size;
    use fragdedup::pipeline::{extract_and_save, reconstruct, reconstruct_to_file};
    use fragdedup::storage::fragments::{FragmentStorage, StorageReference};
    use fragdedup::storage::record::NewRecord;
    use fragdedup::storage::store::{RecordStore, SqliteStore};
    use fragdedup::storage::workspace::Workspace;
    use image::{Rgb, RgbImage};

    fn full_fragment(width: u32, height: u32, color: [u8; 3]) -> Fragment {
        let mask = BinaryMask::filled(width as usize, height as usize);
        let regions = RegionExtractor::new(Default::default(), 0).extract(&mask);
        Fragment::crop(&solid(width, height, color), &regions[0])
    }

    fn bbox(min_row: usize, min_col: usize, max_row: usize, max_col: usize) -> BoundingBox {
        BoundingBox {
            min_row,
            min_col,
            max_row,
            max_col,
        }
    }

    fn record(reference: &str, bbox: BoundingBox, kind: FragmentKind) -> NewRecord {
        NewRecord {
            image_index: 1,
            region_id: 1,
            bbox,
            reference: StorageReference::new(reference),
            kind,
        }
    }

    // Tests every extracted image is rebuilt pixel for pixel
    // Verified by pasting non-overlap fragments before overlap ones
    #[test]
    fn test_round_trip_after_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();
        let base = gradient(10, 10);
        let images = vec![base.clone(), with_inverted_corner(&base, 5)];
        extract_and_save(&images, &mut store, &storage, &PipelineConfig::default()).unwrap();

        for (offset, image) in images.iter().enumerate() {
            assert_eq!(&reconstruct(offset + 1, &store, &storage).unwrap(), image);
        }
    }

    // Tests unknown indexes are reported rather than rebuilt as empty images
    // Verified by returning a 0x0 canvas
    #[test]
    fn test_unknown_index() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path());
        let store = SqliteStore::open_in_memory().unwrap();

        assert!(matches!(
            reconstruct(3, &store, &storage),
            Err(PipelineError::UnknownImageIndex { image_index: 3 })
        ));
    }

    // Tests non-overlap fragments win over overlap ones regardless of record order
    // Verified by pasting strictly in record order
    #[test]
    fn test_non_overlap_pasted_last() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();
        storage
            .save(
                &StorageReference::new("red.png"),
                &full_fragment(2, 2, [255, 0, 0]),
            )
            .unwrap();
        storage
            .save(
                &StorageReference::new("blue.png"),
                &full_fragment(4, 3, [0, 0, 255]),
            )
            .unwrap();
        store
            .insert_records(&[
                record("red.png", bbox(1, 1, 3, 3), FragmentKind::NonOverlap),
                record("blue.png", bbox(0, 0, 3, 4), FragmentKind::Overlap),
            ])
            .unwrap();

        let image = reconstruct(1, &store, &storage).unwrap();

        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 255]));
        assert_eq!(*image.get_pixel(1, 1), Rgb([255, 0, 0]));
        assert_eq!(*image.get_pixel(2, 2), Rgb([255, 0, 0]));
        assert_eq!(*image.get_pixel(3, 2), Rgb([0, 0, 255]));
    }

    // Tests uncovered pixels stay black and oversized fragments are clipped to the record box
    // Verified by clipping only to the canvas
    #[test]
    fn test_clipping_and_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();
        storage
            .save(
                &StorageReference::new("wide.png"),
                &full_fragment(6, 2, [9, 9, 9]),
            )
            .unwrap();
        storage
            .save(
                &StorageReference::new("dot.png"),
                &full_fragment(1, 1, [200, 0, 0]),
            )
            .unwrap();
        store
            .insert_records(&[
                record("wide.png", bbox(0, 1, 2, 3), FragmentKind::Overlap),
                record("dot.png", bbox(3, 4, 4, 5), FragmentKind::NonOverlap),
            ])
            .unwrap();

        let image = reconstruct(1, &store, &storage).unwrap();

        assert_eq!(image.dimensions(), (5, 4));
        assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(1, 0), Rgb([9, 9, 9]));
        assert_eq!(*image.get_pixel(2, 1), Rgb([9, 9, 9]));
        assert_eq!(*image.get_pixel(3, 1), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(4, 0), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(4, 3), Rgb([200, 0, 0]));
        assert_eq!(*image.get_pixel(0, 3), Rgb([0, 0, 0]));
    }

    // Tests a small region reusing a larger stored fragment does not spill onto its neighbours
    // Verified by pasting the whole reused fragment
    #[test]
    fn test_reused_larger_fragment_stays_in_box() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();
        let base = solid(20, 20, [100, 100, 100]);
        let patched = RgbImage::from_fn(20, 20, |x, y| {
            let large = x < 10 && y < 10;
            let small = (13..19).contains(&x) && (2..8).contains(&y);
            if large || small {
                Rgb([200, 200, 200])
            } else {
                Rgb([100, 100, 100])
            }
        });
        let images = vec![base, patched];
        extract_and_save(&images, &mut store, &storage, &PipelineConfig::default()).unwrap();

        let records = store.records_for(2).unwrap();
        let small = records
            .iter()
            .find(|r| r.kind == FragmentKind::NonOverlap && r.bbox.min_col == 13)
            .unwrap();
        assert_eq!(small.reference.as_str(), "non_overlap_image2_1.png");

        for (offset, image) in images.iter().enumerate() {
            assert_eq!(&reconstruct(offset + 1, &store, &storage).unwrap(), image);
        }
    }

    // Tests a record with an empty box is rejected
    // Verified by computing the clip width of an inverted box
    #[test]
    fn test_empty_bbox_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();
        storage
            .save(
                &StorageReference::new("dot.png"),
                &full_fragment(1, 1, [1, 1, 1]),
            )
            .unwrap();
        store
            .insert_records(&[
                record("dot.png", bbox(0, 0, 2, 2), FragmentKind::Overlap),
                record("dot.png", bbox(1, 1, 1, 1), FragmentKind::NonOverlap),
            ])
            .unwrap();

        assert!(matches!(
            reconstruct(1, &store, &storage),
            Err(PipelineError::InvalidSourceData { .. })
        ));
    }

    // Tests a record pointing at a missing fragment fails the reconstruction
    // Verified by skipping unreadable fragments
    #[test]
    fn test_missing_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_records(&[record("lost.png", bbox(0, 0, 2, 2), FragmentKind::Overlap)])
            .unwrap();

        assert!(matches!(
            reconstruct(1, &store, &storage),
            Err(PipelineError::FragmentLoad { .. })
        ));
    }

    // Tests the canvas spans the furthest max corner of any record
    // Verified by sizing from the first record only
    #[test]
    fn test_canvas_size() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_records(&[
                record("a.png", bbox(0, 0, 3, 8), FragmentKind::Overlap),
                record("b.png", bbox(4, 1, 6, 2), FragmentKind::NonOverlap),
            ])
            .unwrap();

        assert_eq!(canvas_size(&store.records_for(1).unwrap()).unwrap(), (8, 6));
    }

    // Tests the file variant writes to the workspace default or the given path
    // Verified by ignoring the destination argument
    #[test]
    fn test_reconstruct_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = Workspace::open(dir.path()).unwrap();
        let images = vec![solid(5, 5, [1, 2, 3]), solid(5, 5, [1, 2, 3])];
        {
            let (store, storage) = workspace.parts_mut();
            extract_and_save(&images, store, storage, &PipelineConfig::default()).unwrap();
        }

        let default_path = reconstruct_to_file(2, &workspace, None).unwrap();
        assert_eq!(default_path, dir.path().join("reconstructed_image2.png"));
        assert_eq!(image::open(&default_path).unwrap().to_rgb8(), images[1]);

        let custom = dir.path().join("elsewhere").join("two.png");
        assert_eq!(reconstruct_to_file(2, &workspace, Some(&custom)).unwrap(), custom);
        assert!(custom.exists());
    }
}
