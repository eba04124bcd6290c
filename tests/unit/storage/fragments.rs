//! Tests for directory-backed fragment storage

#[cfg(test)]
mod tests {
    use crate::support::gradient;
    use fragdedup::analysis::mask::BinaryMask;
    use fragdedup::analysis::regions::RegionExtractor;
    use fragdedup::fragments::fragment::{Fragment, FragmentKind};
    use fragdedup::io::error::PipelineError;
    use fragdedup::storage::fragments::{FragmentStorage, StorageReference};

    fn ring_fragment() -> Fragment {
        let mask = BinaryMask::from_fn(8, 8, |row, col| {
            (1..7).contains(&row)
                && (1..7).contains(&col)
                && !((3..5).contains(&row) && (3..5).contains(&col))
        });
        let regions = RegionExtractor::default().extract(&mask);
        Fragment::crop(&gradient(8, 8), &regions[0])
    }

    // Tests references follow the kind, image and region naming scheme
    // Verified by dropping the kind prefix
    #[test]
    fn test_reference_naming() {
        assert_eq!(
            StorageReference::for_fragment(FragmentKind::Overlap, 1, 3).as_str(),
            "overlap_image1_3.png"
        );
        assert_eq!(
            StorageReference::for_fragment(FragmentKind::NonOverlap, 12, 1).to_string(),
            "non_overlap_image12_1.png"
        );
    }

    // Tests saved fragments reopen with identical pixels and mask
    // Verified by saving RGB without the alpha mask
    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path());
        let reference = StorageReference::for_fragment(FragmentKind::Overlap, 1, 1);
        let fragment = ring_fragment();

        storage.save(&reference, &fragment).unwrap();

        assert_eq!(storage.path_of(&reference), dir.path().join("overlap_image1_1.png"));
        assert_eq!(storage.open(&reference).unwrap(), fragment);
        assert!(storage.size_of(&reference).unwrap() > 0);
    }

    // Tests writing into a missing directory fails as a storage write
    // Verified by creating the directory on save
    #[test]
    fn test_save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path().join("absent"));
        let reference = StorageReference::new("x.png");

        let result = storage.save(&reference, &ring_fragment());
        assert!(matches!(
            result,
            Err(PipelineError::StorageWrite { ref reference, .. }) if reference == "x.png"
        ));
    }

    // Tests opening a missing fragment names the reference
    // Verified by returning an empty fragment
    #[test]
    fn test_open_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path());

        let result = storage.open(&StorageReference::new("gone.png"));
        assert!(matches!(
            result,
            Err(PipelineError::FragmentLoad { ref reference, .. }) if reference == "gone.png"
        ));
        assert!(storage.size_of(&StorageReference::new("gone.png")).is_err());
    }

    // Tests removal deletes the file and is idempotent
    // Verified by propagating NotFound
    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FragmentStorage::new(dir.path());
        let reference = StorageReference::new("r.png");
        storage.save(&reference, &ring_fragment()).unwrap();

        storage.remove(&reference).unwrap();
        assert!(!storage.path_of(&reference).exists());
        storage.remove(&reference).unwrap();
    }
}
