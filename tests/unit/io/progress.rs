//! Tests for per-pass progress tracking

#[cfg(test)]
mod tests {
    use fragdedup::fragments::fragment::FragmentKind;
    use fragdedup::io::progress::ProgressManager;

    // Tests advancing without an active pass is a no-op
    // Verified by creating a bar lazily on advance
    #[test]
    fn test_advance_without_pass() {
        let progress = ProgressManager::hidden();
        progress.advance(false);

        assert_eq!(progress.position(), None);
        assert_eq!(progress.passes_started(), 0);
    }

    // Tests each pass gets a fresh bar counting its candidates
    // Verified by reusing the previous bar
    #[test]
    fn test_passes_track_positions() {
        let mut progress = ProgressManager::hidden();

        progress.start_pass(FragmentKind::Overlap, 4);
        progress.advance(false);
        progress.advance(true);
        assert_eq!(progress.position(), Some(2));

        progress.start_pass(FragmentKind::NonOverlap, 2);
        assert_eq!(progress.position(), Some(0));
        assert_eq!(progress.passes_started(), 2);

        progress.finish();
        assert_eq!(progress.position(), None);
    }
}
